//! Persistence of the rendered scene as a viewable HTML document.
//!
//! The document is a header template, the serialized entity statements, and
//! a footer template concatenated in order. The templates carry all the
//! Cesium framing; this module never inspects them.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Writes `<top><entities_js><bottom>` to `out_path`, creating parent
/// directories as needed.
pub fn write_viz_file(
    entities_js: &str,
    top_path: &Path,
    bottom_path: &Path,
    out_path: &Path,
) -> Result<()> {
    let top = fs::read_to_string(top_path)
        .with_context(|| format!("reading header template {}", top_path.display()))?;
    let bottom = fs::read_to_string(bottom_path)
        .with_context(|| format!("reading footer template {}", bottom_path.display()))?;

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let mut document = String::with_capacity(top.len() + entities_js.len() + bottom.len());
    document.push_str(&top);
    document.push_str(entities_js);
    document.push_str(&bottom);

    fs::write(out_path, &document)
        .with_context(|| format!("writing visualization {}", out_path.display()))?;

    info!(
        out = %out_path.display(),
        bytes = document.len(),
        "Visualization written"
    );
    Ok(())
}
