//! Lookup over a finished set of combined stations.

use crate::identifiers::LineIdentifier;
use crate::models::{CombinedStation, GeoPoint};
use crate::spatial::{haversine_distance, PointIndex};

/// Default search radius for [`StationDirectory::find_near`].
pub const DEFAULT_LOOKUP_RADIUS_M: f64 = 50.0;

/// Combined stations with an R-tree over their positions.
pub struct StationDirectory {
    stations: Vec<CombinedStation>,
    index: PointIndex,
}

impl StationDirectory {
    pub fn new(stations: Vec<CombinedStation>) -> Self {
        let index = PointIndex::new(&stations);
        Self { stations, index }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// First station, in directory order, within `radius_m` of `point`.
    pub fn find_near(&self, point: GeoPoint, radius_m: f64) -> Option<&CombinedStation> {
        self.index
            .candidates_within(point, radius_m)
            .into_iter()
            .map(|i| &self.stations[i])
            .find(|station| haversine_distance(point, station.location) <= radius_m)
    }

    pub fn serving<'a>(
        &'a self,
        line: &'a LineIdentifier,
    ) -> impl Iterator<Item = &'a CombinedStation> + 'a {
        self.stations.iter().filter(move |s| s.serves(line))
    }

    pub fn interchanges(&self) -> impl Iterator<Item = &CombinedStation> {
        self.stations.iter().filter(|s| s.is_interchange())
    }
}
