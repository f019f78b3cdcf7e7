use anyhow::{Context, Result};
use geojson::FeatureCollection;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use transit_consolidate::codec::{parse_collection, to_pretty_json, DecodedCollection};

/// Read a GeoJSON FeatureCollection, skipping features that fail to decode
pub fn read_collection(path: &Path) -> Result<DecodedCollection> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read GeoJSON file: {}", path.display()))?;

    let decoded = parse_collection(&text)
        .with_context(|| format!("Failed to parse GeoJSON in {}", path.display()))?;

    if !decoded.skipped.is_empty() {
        log::warn!(
            "  {} unreadable features skipped in {}",
            decoded.skipped.len(),
            path.display()
        );
    }

    Ok(decoded)
}

/// Write a FeatureCollection as indented GeoJSON, creating parent directories
pub fn write_collection(collection: FeatureCollection, path: &Path) -> Result<()> {
    log::info!(
        "Writing {} features to {}",
        collection.features.len(),
        path.display()
    );

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json_string = to_pretty_json(collection).context("Failed to serialize GeoJSON")?;

    std::fs::write(path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))?;

    Ok(())
}

/// Progress bar over a known number of files
pub fn file_progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{bar:40.green} {pos}/{len} {msg}") {
        pb.set_style(style);
    }
    pb
}
