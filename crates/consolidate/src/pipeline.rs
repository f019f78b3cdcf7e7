//! Consolidation orchestrator.
//!
//! [`Consolidator`] owns a validated [`ConsolidationConfig`] and runs the
//! decode, consolidate and encode steps over in-memory collections. Reading
//! and writing files is left to the caller.

use geojson::{Feature, FeatureCollection, Value};
use serde_json::json;

use crate::codec::{decode_line, decode_stops, encode_line, SkippedFeature};
use crate::config::ConsolidationConfig;
use crate::identifiers::LineIdentifier;
use crate::merge::{consolidate_points, is_route_path, merge_lines, MergeOutcome};
use crate::models::{Category, CombinedStation, Properties, Result};
use crate::palette::line_color;

/// The features published for one line of one category.
#[derive(Clone, Debug)]
pub struct LineSource {
    pub line: LineIdentifier,
    pub category: Category,
    pub collection: FeatureCollection,
}

impl LineSource {
    pub fn new(line: impl Into<LineIdentifier>, category: Category, collection: FeatureCollection) -> Self {
        Self {
            line: line.into(),
            category,
            collection,
        }
    }
}

/// A feature skipped while decoding one line's stops.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceSkip {
    pub line: LineIdentifier,
    pub category: Category,
    pub feature: SkippedFeature,
}

#[derive(Clone, Debug, Default)]
pub struct StationReport {
    pub stations: Vec<CombinedStation>,
    /// Stops decoded across all sources.
    pub stop_count: usize,
    pub skipped: Vec<SourceSkip>,
    /// Level crossings left out.
    pub filtered: usize,
}

impl StationReport {
    pub fn interchanges(&self) -> impl Iterator<Item = &CombinedStation> {
        self.stations.iter().filter(|s| s.is_interchange())
    }
}

#[derive(Clone, Debug)]
pub struct SegmentReport {
    pub collection: FeatureCollection,
    /// Route paths before merging.
    pub route_count: usize,
    /// Route paths after merging.
    pub output_route_count: usize,
    /// Features written back untouched.
    pub passthrough_count: usize,
    pub skipped: Vec<SkippedFeature>,
}

pub struct Consolidator {
    config: ConsolidationConfig,
}

impl Consolidator {
    /// Validates `config` up front; nothing runs with a bad configuration.
    pub fn new(config: ConsolidationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Decode the stops of every source and merge them into stations.
    pub fn consolidate_stations(&self, sources: &[LineSource]) -> StationReport {
        let mut report = StationReport::default();
        let mut stops = Vec::new();

        for source in sources {
            let batch = decode_stops(&source.collection.features, &source.line, &source.category);
            log::debug!(
                "{} line {}: {} stops",
                source.category,
                source.line,
                batch.stops.len()
            );

            report.filtered += batch.filtered;
            report.skipped.extend(batch.skipped.into_iter().map(|feature| SourceSkip {
                line: source.line.clone(),
                category: source.category.clone(),
                feature,
            }));
            stops.extend(batch.stops);
        }

        if !report.skipped.is_empty() {
            log::warn!("Skipped {} malformed stop features", report.skipped.len());
        }
        if report.filtered > 0 {
            log::info!("Filtered out {} level crossings", report.filtered);
        }

        report.stop_count = stops.len();
        report.stations = consolidate_points(&stops, &self.config.stations);

        for station in report.interchanges() {
            log::info!("  {}: {}", station.name, station.lines_display());
        }

        report
    }

    /// Merge the close route segments of one collection.
    ///
    /// The output holds merged and kept route paths in group discovery
    /// order, then every other feature in its original order. Route paths
    /// that cannot be decoded are passed through and reported.
    pub fn merge_collection(&self, collection: FeatureCollection) -> SegmentReport {
        let FeatureCollection {
            bbox,
            features,
            foreign_members,
        } = collection;

        let mut lines = Vec::new();
        let mut originals: Vec<Option<Feature>> = Vec::new();
        let mut passthrough = Vec::new();
        let mut skipped = Vec::new();

        for (index, feature) in features.into_iter().enumerate() {
            if !is_route_path(&feature) {
                passthrough.push(feature);
                continue;
            }

            match decode_line(&feature, index) {
                Ok(Some(line)) => {
                    lines.push(line);
                    originals.push(Some(feature));
                }
                // Not a LineString, nothing to join it with
                Ok(None) => passthrough.push(feature),
                Err(e) => {
                    skipped.push(SkippedFeature::from_error(index, e));
                    passthrough.push(feature);
                }
            }
        }

        let route_count = lines.len();
        let passthrough_count = passthrough.len();

        if route_count == 0 {
            log::warn!("No route segments found");
        }

        let mut output: Vec<Feature> = Vec::with_capacity(route_count + passthrough_count);
        for outcome in merge_lines(&lines, &self.config.segments) {
            match outcome {
                MergeOutcome::Kept(index) => output.extend(originals[index].take()),
                MergeOutcome::Merged(line) => output.push(encode_line(&line.path, line.properties)),
            }
        }
        let output_route_count = output.len();

        if route_count > 0 {
            log::info!(
                "Merged {} → {} route segments",
                route_count,
                output_route_count
            );
        }

        output.extend(passthrough);

        SegmentReport {
            collection: FeatureCollection {
                bbox,
                features: output,
                foreign_members,
            },
            route_count,
            output_route_count,
            passthrough_count,
            skipped,
        }
    }

    /// Collect the LineString features of every source into one collection,
    /// tagged with their line, category and display colour.
    pub fn combine_lines(&self, sources: &[LineSource]) -> FeatureCollection {
        let mut features = Vec::new();

        for source in sources {
            let before = features.len();
            features.extend(
                source
                    .collection
                    .features
                    .iter()
                    .filter(|f| matches!(f.geometry.as_ref().map(|g| &g.value), Some(Value::LineString(_))))
                    .map(|f| annotate_line(f.clone(), &source.line, &source.category)),
            );
            log::debug!(
                "{} line {}: {} line segments",
                source.category,
                source.line,
                features.len() - before
            );
        }

        log::info!("Combined {} line segments from {} sources", features.len(), sources.len());

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

fn annotate_line(mut feature: Feature, line: &LineIdentifier, category: &Category) -> Feature {
    let properties = feature.properties.get_or_insert_with(Properties::new);

    properties.insert("lineNumber".to_string(), json!(line.as_str()));
    properties.insert("category".to_string(), json!(category.as_str()));
    properties.insert(
        "lineColor".to_string(),
        json!(line_color(line.as_str(), category)),
    );

    if !properties.contains_key("colour") {
        if let Some(colour) = relation_colour(properties) {
            properties.insert("colour".to_string(), json!(colour));
        }
    }

    feature
}

/// `colour` tag of the first OSM relation a way belongs to.
fn relation_colour(properties: &Properties) -> Option<String> {
    properties
        .get("@relations")?
        .as_array()?
        .first()?
        .get("reltags")?
        .get("colour")?
        .as_str()
        .map(str::to_string)
}
