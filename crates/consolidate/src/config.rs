//! Consolidation thresholds.
//!
//! Every radius is in meters. Values are checked once, by
//! [`ConsolidationConfig::validate`], before any feature is looked at.

use crate::models::{ConsolidateError, Result};

/// Configuration for station consolidation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationConfig {
    /// Stops at most this far apart are the same station.
    /// Default: 200m
    pub combination_radius_meters: f64,

    /// Stops whose names match case-insensitively are also the same station
    /// up to this distance. `None` turns name matching off.
    /// Default: 500m
    pub name_match_radius_meters: Option<f64>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            combination_radius_meters: 200.0,
            name_match_radius_meters: Some(500.0),
        }
    }
}

impl StationConfig {
    /// Largest distance at which two stops can still be merged.
    pub fn search_radius_meters(&self) -> f64 {
        match self.name_match_radius_meters {
            Some(r2) => self.combination_radius_meters.max(r2),
            None => self.combination_radius_meters,
        }
    }
}

/// Configuration for route segment merging.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    /// Segments whose sampled vertices come this close are merged.
    /// Default: 50m
    pub combination_radius_meters: f64,

    /// A segment starting this close to the previous end continues it, and
    /// its first vertex is dropped.
    /// Default: 100m
    pub junction_dedup_radius_meters: f64,

    /// Compare every n-th vertex when measuring segment distance.
    /// Default: 5
    pub sample_stride: usize,

    /// Stop measuring once any sampled pair is closer than this.
    /// Default: 10m
    pub near_zero_short_circuit_meters: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            combination_radius_meters: 50.0,
            junction_dedup_radius_meters: 100.0,
            sample_stride: 5,
            near_zero_short_circuit_meters: 10.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConsolidationConfig {
    pub stations: StationConfig,
    pub segments: SegmentConfig,
}

impl ConsolidationConfig {
    pub fn with_station_radius(mut self, meters: f64) -> Self {
        self.stations.combination_radius_meters = meters;
        self
    }

    pub fn with_name_match_radius(mut self, meters: Option<f64>) -> Self {
        self.stations.name_match_radius_meters = meters;
        self
    }

    pub fn with_segment_radius(mut self, meters: f64) -> Self {
        self.segments.combination_radius_meters = meters;
        self
    }

    pub fn with_junction_radius(mut self, meters: f64) -> Self {
        self.segments.junction_dedup_radius_meters = meters;
        self
    }

    pub fn with_sample_stride(mut self, stride: usize) -> Self {
        self.segments.sample_stride = stride;
        self
    }

    pub fn with_short_circuit(mut self, meters: f64) -> Self {
        self.segments.near_zero_short_circuit_meters = meters;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_radius(
            "stations.combination_radius_meters",
            self.stations.combination_radius_meters,
        )?;
        if let Some(r2) = self.stations.name_match_radius_meters {
            check_radius("stations.name_match_radius_meters", r2)?;
            if r2 < self.stations.combination_radius_meters {
                log::warn!(
                    "Name match radius {}m is below the combination radius {}m and has no effect",
                    r2,
                    self.stations.combination_radius_meters
                );
            }
        }
        check_radius(
            "segments.combination_radius_meters",
            self.segments.combination_radius_meters,
        )?;
        check_radius(
            "segments.junction_dedup_radius_meters",
            self.segments.junction_dedup_radius_meters,
        )?;
        check_radius(
            "segments.near_zero_short_circuit_meters",
            self.segments.near_zero_short_circuit_meters,
        )?;
        if self.segments.sample_stride == 0 {
            return Err(ConsolidateError::InvalidConfig {
                field: "segments.sample_stride",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn check_radius(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(ConsolidateError::InvalidConfig {
            field,
            reason: format!("{} is not a finite distance", value),
        });
    }
    if value < 0.0 {
        return Err(ConsolidateError::InvalidConfig {
            field,
            reason: format!("{}m is negative", value),
        });
    }
    Ok(())
}
