//! Constellation geometry and circular-orbit propagation.
//!
//! Stands in for the external orbit-propagation service: given shell
//! parameters and an offset from the scenario epoch, produces one
//! sub-longitude/sub-latitude/altitude record per satellite.

use std::f64::consts::PI;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Scenario epoch shared by all shells.
pub const EPOCH: &str = "2000-01-01T00:00:00Z";

/// Sidereal Earth rotation rate in radians per second.
const EARTH_ROTATION_RAD_PER_S: f64 = 2.0 * PI / 86_164.0905;

/// One shell of a Walker-style constellation.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub name: &'static str,
    pub num_orbs: usize,
    pub num_sats_per_orb: usize,
    pub inclination_deg: f64,
    pub altitude_m: f64,
    pub mean_motion_rev_per_day: f64,
    /// Nominally circular shells use the lowest representable value rather
    /// than an exact zero.
    pub eccentricity: f64,
    pub arg_of_perigee_deg: f64,
    /// Offset the in-plane phase between adjacent orbits.
    pub phase_diff: bool,
}

/// Sub-satellite point position at one instant.
#[derive(Debug, Clone, Copy)]
pub struct SatPosition {
    pub sub_lon_deg: f64,
    pub sub_lat_deg: f64,
    pub alt_m: f64,
}

impl ShellConfig {
    /// Starlink first shell, FCC filing SAT-MOD-20190830-00087.
    pub fn starlink_550() -> Self {
        Self {
            name: "starlink_550",
            num_orbs: 72,
            num_sats_per_orb: 22,
            inclination_deg: 53.0,
            altitude_m: 550_000.0,
            mean_motion_rev_per_day: 15.19,
            eccentricity: 0.0000001,
            arg_of_perigee_deg: 0.0,
            phase_diff: true,
        }
    }

    /// Kuiper first shell, ITU filing.
    pub fn kuiper_630() -> Self {
        Self {
            name: "kuiper_630",
            num_orbs: 34,
            num_sats_per_orb: 34,
            inclination_deg: 51.9,
            altitude_m: 630_000.0,
            mean_motion_rev_per_day: 14.80,
            eccentricity: 0.0000001,
            arg_of_perigee_deg: 0.0,
            phase_diff: true,
        }
    }

    /// Telesat polar shell (~1015 km).
    pub fn telesat_1015() -> Self {
        Self {
            name: "telesat_1015",
            num_orbs: 27,
            num_sats_per_orb: 13,
            inclination_deg: 98.98,
            altitude_m: 1_015_000.0,
            mean_motion_rev_per_day: 13.66,
            eccentricity: 0.0000001,
            arg_of_perigee_deg: 0.0,
            phase_diff: true,
        }
    }

    /// Looks a preset up by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "starlink_550" => Some(Self::starlink_550()),
            "kuiper_630" => Some(Self::kuiper_630()),
            "telesat_1015" => Some(Self::telesat_1015()),
            _ => None,
        }
    }

    /// Total satellites in the shell. Node ids at or above this count are
    /// ground stations.
    pub fn satellite_count(&self) -> usize {
        self.num_orbs * self.num_sats_per_orb
    }

    /// Scenario epoch shifted by the query offset.
    pub fn shifted_epoch(&self, epoch_offset_ms: u64) -> DateTime<Utc> {
        let epoch: DateTime<Utc> = EPOCH.parse().expect("static epoch literal");
        epoch + Duration::milliseconds(epoch_offset_ms as i64)
    }

    /// Propagates every satellite to `epoch_offset_ms` past the epoch.
    ///
    /// Circular-orbit Kepler propagation: satellites advance at the shell's
    /// mean motion, planes are spread evenly in RAAN over a full turn, and
    /// the sub-longitude is corrected for Earth's sidereal rotation.
    pub fn satellite_positions(&self, epoch_offset_ms: u64) -> Vec<SatPosition> {
        let t = epoch_offset_ms as f64 / 1000.0;
        let mean_motion = self.mean_motion_rev_per_day * 2.0 * PI / 86_400.0;
        let ecc = self.eccentricity;
        let omega = self.arg_of_perigee_deg.to_radians();
        let inc = self.inclination_deg.to_radians();
        let raan_step = 2.0 * PI / self.num_orbs as f64;
        let sat_step = 2.0 * PI / self.num_sats_per_orb as f64;
        let phase_step = if self.phase_diff {
            2.0 * PI / self.satellite_count() as f64
        } else {
            0.0
        };
        let earth_angle = EARTH_ROTATION_RAD_PER_S * t;

        let mut positions = Vec::with_capacity(self.satellite_count());
        for orb in 0..self.num_orbs {
            let raan = raan_step * orb as f64;
            let phase_offset = phase_step * orb as f64;

            for sat in 0..self.num_sats_per_orb {
                let mean_anomaly = sat_step * sat as f64 + mean_motion * t + phase_offset;

                let true_anomaly = if ecc < 1e-8 {
                    mean_anomaly
                } else {
                    // Newton iteration on Kepler's equation.
                    let mut ea = mean_anomaly;
                    for _ in 0..10 {
                        ea = ea - (ea - ecc * ea.sin() - mean_anomaly) / (1.0 - ecc * ea.cos());
                    }
                    2.0 * ((1.0 + ecc).sqrt() * (ea / 2.0).sin())
                        .atan2((1.0 - ecc).sqrt() * (ea / 2.0).cos())
                };

                // Argument of latitude.
                let u = true_anomaly + omega;

                let sub_lat = (inc.sin() * u.sin()).asin();
                let lon_inertial = raan + (inc.cos() * u.sin()).atan2(u.cos());
                let sub_lon = wrap_longitude(lon_inertial - earth_angle);

                positions.push(SatPosition {
                    sub_lon_deg: sub_lon.to_degrees(),
                    sub_lat_deg: sub_lat.to_degrees(),
                    alt_m: self.altitude_m,
                });
            }
        }

        debug!(
            shell = self.name,
            satellites = positions.len(),
            epoch_offset_ms,
            "Shell propagated"
        );

        positions
    }

    /// Structural intra-orbit topology: every satellite linked to its
    /// in-plane successor, wrapping around the orbit.
    pub fn orbit_links(&self) -> Vec<(usize, usize)> {
        let mut links = Vec::with_capacity(self.satellite_count());
        for orb in 0..self.num_orbs {
            let base = orb * self.num_sats_per_orb;
            for sat in 0..self.num_sats_per_orb {
                let next = (sat + 1) % self.num_sats_per_orb;
                links.push((base + sat, base + next));
            }
        }
        links
    }
}

fn wrap_longitude(mut lon: f64) -> f64 {
    while lon > PI {
        lon -= 2.0 * PI;
    }
    while lon < -PI {
        lon += 2.0 * PI;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satellite_count() {
        assert_eq!(ShellConfig::telesat_1015().satellite_count(), 351);
        assert_eq!(ShellConfig::starlink_550().satellite_count(), 1584);
    }

    #[test]
    fn test_by_name_known_and_unknown() {
        assert!(ShellConfig::by_name("kuiper_630").is_some());
        assert!(ShellConfig::by_name("iridium").is_none());
    }

    #[test]
    fn test_positions_cover_every_satellite() {
        let shell = ShellConfig::telesat_1015();
        let positions = shell.satellite_positions(10_000);

        assert_eq!(positions.len(), shell.satellite_count());
        for p in &positions {
            assert!(p.sub_lat_deg.abs() <= 90.0 + 1e-9);
            assert!(p.sub_lon_deg.abs() <= 180.0 + 1e-9);
            assert_eq!(p.alt_m, 1_015_000.0);
        }
    }

    #[test]
    fn test_latitude_bounded_by_inclination_for_prograde_shell() {
        let shell = ShellConfig::starlink_550();
        for p in shell.satellite_positions(0) {
            assert!(p.sub_lat_deg.abs() <= shell.inclination_deg + 1e-9);
        }
    }

    #[test]
    fn test_orbit_links_wrap_within_each_plane() {
        let shell = ShellConfig::telesat_1015();
        let links = shell.orbit_links();

        assert_eq!(links.len(), shell.satellite_count());
        // Last satellite of the first plane links back to its first.
        assert!(links.contains(&(12, 0)));
        // No link crosses a plane boundary.
        for (a, b) in &links {
            assert_eq!(a / shell.num_sats_per_orb, b / shell.num_sats_per_orb);
        }
    }

    #[test]
    fn test_shifted_epoch() {
        let shell = ShellConfig::telesat_1015();
        let shifted = shell.shifted_epoch(10_000);
        assert_eq!(shifted.to_rfc3339(), "2000-01-01T00:00:10+00:00");
    }
}
