//! Combined station records.

use std::collections::BTreeSet;

use crate::identifiers::*;
use crate::models::traits::Located;
use crate::models::types::*;

/// One physical station, merged from every stop close enough to it.
///
/// Holds facts only: there is no link back to the stops it was built from.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedStation {
    pub name: String,
    pub name_en: String,
    pub location: GeoPoint,
    pub stop_codes: BTreeSet<StopCode>,
    pub lines: BTreeSet<LineIdentifier>,
    pub categories: BTreeSet<Category>,
    pub member_count: usize,
}

impl CombinedStation {
    /// More than one line calls here.
    pub fn is_interchange(&self) -> bool {
        self.lines.len() > 1
    }

    /// Lines formatted for display: numeric metro lines get an `M` prefix
    /// ("M1, M3"), everything else is shown as is.
    pub fn lines_display(&self) -> String {
        let is_metro = self.categories.contains(&Category::Metro);

        self.lines
            .iter()
            .map(|line| {
                let id = line.as_str();
                if is_metro && !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
                    format!("M{}", id)
                } else {
                    id.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn serves(&self, line: &LineIdentifier) -> bool {
        self.lines.contains(line)
    }
}

impl Located for CombinedStation {
    fn location(&self) -> GeoPoint {
        self.location
    }
}
