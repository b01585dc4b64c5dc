//! Maps a scalar link utilization in [0,1] to a polyline style.

/// Color and width for one rendered hop.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkStyle {
    /// Six-hex-digit `rrggbb` color, no leading `#`.
    pub color: String,
    pub width: f64,
}

/// Encodes utilization as a width in [1,6] and a two-segment green→red ramp
/// with its inflection at 0.5.
///
/// | utilization | color    | width |
/// |-------------|----------|-------|
/// | 0.0         | `00ff00` | 1.0   |
/// | 0.5         | `ffff00` | 3.5   |
/// | 1.0         | `ff0000` | 6.0   |
///
/// Both ramp segments agree at 0.5 (amber), so the encoding is continuous.
/// Channels stay within [0,255] by construction for inputs in [0,1].
pub fn encode(utilization: f64) -> LinkStyle {
    let width = 1.0 + 5.0 * utilization;

    let (red, green) = if utilization >= 0.5 {
        let green = (255.0 * (1.0 - utilization) / 0.5).round() as u32;
        (255, green)
    } else {
        let red = 255 - (255.0 * (0.5 - utilization) / 0.5).round() as u32;
        (red, 255)
    };

    LinkStyle {
        color: format!("{:02x}{:02x}{:02x}", red, green, 0),
        width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_idle_link_is_green_and_thin() {
        let style = encode(0.0);
        assert_eq!(style.color, "00ff00");
        assert_eq!(style.width, 1.0);
    }

    #[test]
    fn test_encode_saturated_link_is_red_and_wide() {
        let style = encode(1.0);
        assert_eq!(style.color, "ff0000");
        assert_eq!(style.width, 6.0);
    }

    #[test]
    fn test_encode_midpoint_is_amber() {
        let style = encode(0.5);
        assert_eq!(style.color, "ffff00");
        assert_eq!(style.width, 3.5);
    }

    #[test]
    fn test_ramp_is_continuous_at_inflection() {
        // Just below and just above 0.5 should straddle amber, not jump.
        let below = encode(0.499);
        let above = encode(0.501);
        assert_eq!(below.color, "feff00");
        assert_eq!(above.color, "fffe00");
    }

    #[test]
    fn test_encode_high_utilization_sample() {
        // 0.8 → red-dominant: green = round(255 * 0.2 / 0.5) = 102 = 0x66.
        let style = encode(0.8);
        assert_eq!(style.color, "ff6600");
        assert_eq!(style.width, 5.0);
    }

    #[test]
    fn test_encode_low_utilization_sample() {
        // 0.2 → green-dominant: red = 255 - round(255 * 0.3 / 0.5) = 102.
        let style = encode(0.2);
        assert_eq!(style.color, "66ff00");
        assert_eq!(style.width, 2.0);
    }
}
