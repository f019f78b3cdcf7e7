//! Consolidators: stations from stops, merged lines from route segments.

pub mod segments;
pub mod stations;

pub use segments::{concatenate, is_route_path, merge_lines, MergeOutcome, MergedLine};
pub use stations::{consolidate_points, same_station};
