use anyhow::{Context, Result};
use std::path::Path;
use transit_consolidate::config::ConsolidationConfig;

/// Threshold overrides given on the command line.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct Overrides {
    /// Stops this close are one station (meters)
    #[arg(long, global = true)]
    pub station_radius: Option<f64>,

    /// Stops with matching names are one station up to this distance (meters)
    #[arg(long, global = true)]
    pub name_radius: Option<f64>,

    /// Only merge stops by distance, never by name
    #[arg(long, global = true)]
    pub no_name_match: bool,

    /// Route segments this close are merged (meters)
    #[arg(long, global = true)]
    pub segment_radius: Option<f64>,

    /// Segment ends this close are the same junction (meters)
    #[arg(long, global = true)]
    pub junction_radius: Option<f64>,

    /// Compare every Nth vertex of each segment
    #[arg(long, global = true)]
    pub sample_stride: Option<usize>,

    /// Stop measuring two segments once they come this close (meters)
    #[arg(long, global = true)]
    pub short_circuit: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, mut config: ConsolidationConfig) -> ConsolidationConfig {
        if let Some(r) = self.station_radius {
            config = config.with_station_radius(r);
        }
        if let Some(r) = self.name_radius {
            config = config.with_name_match_radius(Some(r));
        }
        if self.no_name_match {
            config = config.with_name_match_radius(None);
        }
        if let Some(r) = self.segment_radius {
            config = config.with_segment_radius(r);
        }
        if let Some(r) = self.junction_radius {
            config = config.with_junction_radius(r);
        }
        if let Some(stride) = self.sample_stride {
            config = config.with_sample_stride(stride);
        }
        if let Some(r) = self.short_circuit {
            config = config.with_short_circuit(r);
        }
        config
    }
}

/// Load the JSON config file if one is given, then apply overrides.
/// Missing keys keep their defaults.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<ConsolidationConfig> {
    let config: ConsolidationConfig = match path {
        Some(path) => {
            log::info!("Config: {}", path.display());
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => ConsolidationConfig::default(),
    };

    Ok(overrides.apply(config))
}
