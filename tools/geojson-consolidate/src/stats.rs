use transit_consolidate::pipeline::{SegmentReport, StationReport};

#[derive(Debug, Default)]
pub struct SegmentStats {
    pub files: usize,
    pub unchanged_files: usize,
    pub failed_files: usize,
    /// Files with unreadable features that were not rewritten in place.
    pub untouched_files: usize,
    pub routes_in: usize,
    pub routes_out: usize,
    pub passthrough: usize,
    pub features_skipped: usize,
}

impl SegmentStats {
    pub fn record(&mut self, report: &SegmentReport) {
        self.files += 1;
        self.routes_in += report.route_count;
        self.routes_out += report.output_route_count;
        self.passthrough += report.passthrough_count;
        self.features_skipped += report.skipped.len();
        if report.route_count == report.output_route_count {
            self.unchanged_files += 1;
        }
    }

    pub fn log_summary(&self) {
        log::info!("=== Segment Statistics ===");
        log::info!("Files processed: {}", self.files);
        log::info!("Files without merges: {}", self.unchanged_files);
        log::info!("Route segments: {} -> {}", self.routes_in, self.routes_out);
        log::info!("Other features kept: {}", self.passthrough);
        if self.features_skipped > 0 {
            log::warn!("Malformed features skipped: {}", self.features_skipped);
        }
        if self.untouched_files > 0 {
            log::warn!("Files left untouched: {}", self.untouched_files);
        }
        if self.failed_files > 0 {
            log::warn!("Files failed: {}", self.failed_files);
        }
    }
}

pub fn log_station_summary(report: &StationReport) {
    log::info!("=== Station Statistics ===");
    log::info!("Stops read: {}", report.stop_count);
    log::info!("Combined stations: {}", report.stations.len());
    log::info!("Interchanges: {}", report.interchanges().count());
    if report.filtered > 0 {
        log::info!("Level crossings filtered: {}", report.filtered);
    }
    if !report.skipped.is_empty() {
        log::warn!("Malformed features skipped: {}", report.skipped.len());
    }
}
