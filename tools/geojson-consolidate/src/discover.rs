//! Locating input files on disk.
//!
//! Line data is laid out as `<root>/<category dir>/<line>/*.geojson`, for
//! example `geojson/Metro lines/2/metro_line_2.geojson`.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use transit_consolidate::models::Category;
use walkdir::WalkDir;

/// File name prefixes of files this tool writes itself.
const GENERATED_PREFIXES: &[&str] = &["combined_", "final_all_lines"];

/// One GeoJSON file belonging to a line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineFile {
    pub category: Category,
    pub line: String,
    pub path: PathBuf,
}

/// `--source <category>:<line>=<path>`
impl FromStr for LineFile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (key, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected <category>:<line>=<path>, got '{}'", s))?;
        let (category, line) = key
            .split_once(':')
            .ok_or_else(|| format!("expected <category>:<line> before '=', got '{}'", key))?;

        if category.trim().is_empty() || line.trim().is_empty() || path.is_empty() {
            return Err(format!("empty component in '{}'", s));
        }

        Ok(Self {
            category: Category::parse(category),
            line: line.trim().to_string(),
            path: PathBuf::from(path),
        })
    }
}

fn is_geojson(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "geojson")
}

fn is_generated(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| GENERATED_PREFIXES.iter().any(|p| name.starts_with(p)))
}

/// Every line file under `root`, sorted by category directory, line and
/// file name.
pub fn line_files(root: &Path) -> Result<Vec<LineFile>> {
    if !root.is_dir() {
        bail!("Line data directory does not exist: {}", root.display());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(3)
        .max_depth(3)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_geojson(path) || is_generated(path) {
            continue;
        }

        let line_dir = path.parent();
        let category_dir = line_dir.and_then(Path::parent);
        let (Some(line), Some(category)) = (
            line_dir.and_then(|d| d.file_name()).and_then(|n| n.to_str()),
            category_dir.and_then(|d| d.file_name()).and_then(|n| n.to_str()),
        ) else {
            log::warn!("Skipping {}: non UTF-8 directory name", path.display());
            continue;
        };

        files.push(LineFile {
            category: Category::parse(category),
            line: line.to_string(),
            path: path.to_path_buf(),
        });
    }

    log::info!("Found {} line files under {}", files.len(), root.display());
    Ok(files)
}

/// `input` itself when it is a file, otherwise every GeoJSON file below it
/// that this tool did not generate.
pub fn geojson_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("Input does not exist: {}", input.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && is_geojson(path) && !is_generated(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
