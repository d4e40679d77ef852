use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::model::Quad;

/// `plates/car.jpg` -> `plates/car.txt`
pub fn annotation_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("txt")
}

pub fn render_records(quads: &[Quad], separator: &str) -> String {
    quads
        .iter()
        .map(Quad::serialize)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Writes every quad next to the image, overwriting any previous file.
/// Returns the written path, or `None` when there was nothing to write.
pub fn save_annotations(
    image_path: &Path,
    quads: &[Quad],
    separator: &str,
) -> Result<Option<PathBuf>> {
    if quads.is_empty() {
        log::error!("no plate to annotate!");
        return Ok(None);
    }
    for quad in quads {
        log::info!("output: {}", quad.serialize());
    }
    let path = annotation_path(image_path);
    std::fs::write(&path, render_records(quads, separator))
        .with_context(|| format!("failed to write annotations to {}", path.display()))?;
    Ok(Some(path))
}
