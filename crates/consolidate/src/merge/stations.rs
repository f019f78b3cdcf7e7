//! Station consolidation.
//!
//! Stops of different lines that stand at the same physical station are
//! merged into one [`CombinedStation`]. Two stops are the same station when
//!
//! ```text
//! distance <= combination_radius
//!   OR (names equal ignoring case AND distance <= name_match_radius)
//! ```
//!
//! and stations are the connected components of that relation. Name matching
//! can be switched off with `name_match_radius_meters: None`; it never applies
//! to route segments.

use std::collections::BTreeSet;

use geo::Centroid;

use crate::config::StationConfig;
use crate::models::{CombinedStation, GeoPoint, PointFeature};
use crate::spatial::{group_with_candidates, haversine_distance, PointIndex, ProximityGroup};

/// Display name used when no member stop has one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Whether two stops belong to the same station.
pub fn same_station(a: &PointFeature, b: &PointFeature, config: &StationConfig) -> bool {
    let distance = haversine_distance(a.location, b.location);

    if distance <= config.combination_radius_meters {
        return true;
    }

    match config.name_match_radius_meters {
        Some(radius) => distance <= radius && names_match(&a.name, &b.name),
        None => false,
    }
}

fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim();
    !a.is_empty() && a.to_lowercase() == b.trim().to_lowercase()
}

/// Merge nearby stops into combined stations, in group discovery order.
pub fn consolidate_points(features: &[PointFeature], config: &StationConfig) -> Vec<CombinedStation> {
    if features.is_empty() {
        log::warn!("No stops to consolidate");
        return Vec::new();
    }

    let index = PointIndex::new(features);
    let search_radius = config.search_radius_meters();

    let groups = group_with_candidates(
        features.len(),
        |i| index.candidates_within(features[i].location, search_radius),
        |i, j| same_station(&features[i], &features[j], config),
    );

    let stations: Vec<CombinedStation> = groups
        .iter()
        .map(|group| combine_group(features, group))
        .collect();

    log::info!(
        "Combined {} stops into {} stations",
        features.len(),
        stations.len()
    );

    stations
}

fn combine_group(features: &[PointFeature], group: &ProximityGroup) -> CombinedStation {
    let members: Vec<&PointFeature> = group.members().iter().map(|&i| &features[i]).collect();
    let first = members[0];

    // Longest name wins, the earliest stop keeps ties
    let mut named = first;
    for &stop in &members[1..] {
        if stop.name.chars().count() > named.name.chars().count() {
            named = stop;
        }
    }
    let name = if named.name.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        named.name.clone()
    };

    let centroid = members
        .iter()
        .map(|stop| geo::Point::from(stop.location))
        .collect::<geo::MultiPoint>()
        .centroid()
        .map(|c| GeoPoint::from_mean(c.y(), c.x()))
        .unwrap_or(first.location);

    CombinedStation {
        name,
        name_en: named.name_en.clone(),
        location: centroid,
        stop_codes: members.iter().filter_map(|s| s.stop_code.clone()).collect(),
        lines: members.iter().map(|s| s.line.clone()).collect(),
        categories: members.iter().map(|s| s.category.clone()).collect::<BTreeSet<_>>(),
        member_count: members.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::*;
    use crate::models::Category;
    use approx::assert_abs_diff_eq;

    fn stop(lat: f64, lon: f64, name: &str, line: &str, category: Category) -> PointFeature {
        PointFeature::new(GeoPoint::new(lat, lon).unwrap(), name, line, category)
    }

    /// Point `meters` north of `lat`.
    fn north_of(lat: f64, meters: f64) -> f64 {
        lat + crate::spatial::queries::meters_to_degrees_approx(meters)
    }

    fn line_ids(station: &CombinedStation) -> Vec<&str> {
        station.lines.iter().map(|l| l.as_str()).collect()
    }

    #[test]
    fn test_end_to_end_three_stops() {
        let features = vec![
            stop(37.9838, 23.7275, "A", "1", Category::Metro),
            stop(37.9839, 23.7276, "B", "2", Category::Metro),
            stop(38.5, 24.0, "C", "3", Category::Metro),
        ];

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations.len(), 2);

        assert_eq!(line_ids(&stations[0]), vec!["1", "2"]);
        assert_abs_diff_eq!(stations[0].location.lat(), 37.98385, epsilon = 1e-9);
        assert_abs_diff_eq!(stations[0].location.lon(), 23.72755, epsilon = 1e-9);

        assert_eq!(line_ids(&stations[1]), vec!["3"]);
        assert_abs_diff_eq!(stations[1].location.lat(), 38.5, epsilon = 1e-12);
        assert_abs_diff_eq!(stations[1].location.lon(), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singleton_is_identity() {
        let features = vec![stop(37.9755, 23.7348, "Syntagma", "2", Category::Metro)
            .with_stop_code("400075")
            .with_name_en("Syntagma Square")];

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations.len(), 1);

        let station = &stations[0];
        assert_abs_diff_eq!(station.location.lat(), 37.9755, epsilon = 1e-12);
        assert_abs_diff_eq!(station.location.lon(), 23.7348, epsilon = 1e-12);
        assert_eq!(line_ids(station), vec!["2"]);
        assert_eq!(
            station.stop_codes.iter().collect::<Vec<_>>(),
            vec![&StopCode::new("400075")]
        );
        assert_eq!(station.name_en, "Syntagma Square");
        assert_eq!(station.member_count, 1);
    }

    #[test]
    fn test_singleton_without_code_has_no_codes() {
        let features = vec![stop(37.9755, 23.7348, "Syntagma", "2", Category::Metro)];
        let stations = consolidate_points(&features, &StationConfig::default());
        assert!(stations[0].stop_codes.is_empty());
    }

    #[test]
    fn test_name_match_within_secondary_radius() {
        let a = stop(37.9755, 23.7348, "Syntagma", "2", Category::Metro);
        let b = stop(north_of(37.9755, 350.0), 23.7348, "SYNTAGMA", "T6", Category::Tram);
        let c = stop(north_of(37.9755, 350.0), 23.7348, "Monastiraki", "1", Category::Metro);

        let config = StationConfig::default();
        assert!(same_station(&a, &b, &config));
        assert!(!same_station(&a, &c, &config));

        let merged = consolidate_points(&[a.clone(), b.clone()], &config);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].categories.iter().cloned().collect::<Vec<_>>(),
            vec![Category::Metro, Category::Tram]
        );

        let apart = consolidate_points(&[a.clone(), c], &config);
        assert_eq!(apart.len(), 2);

        // Disabled name matching keeps same-named stops apart
        let strict = StationConfig {
            name_match_radius_meters: None,
            ..StationConfig::default()
        };
        assert_eq!(consolidate_points(&[a, b], &strict).len(), 2);
    }

    #[test]
    fn test_name_match_stops_at_secondary_radius() {
        let a = stop(37.9755, 23.7348, "Syntagma", "2", Category::Metro);
        let far = stop(north_of(37.9755, 650.0), 23.7348, "Syntagma", "3", Category::Metro);
        assert!(!same_station(&a, &far, &StationConfig::default()));
    }

    #[test]
    fn test_empty_names_never_match() {
        let a = stop(37.9755, 23.7348, "", "2", Category::Metro);
        let b = stop(north_of(37.9755, 350.0), 23.7348, "", "3", Category::Metro);
        assert!(!same_station(&a, &b, &StationConfig::default()));
    }

    #[test]
    fn test_longest_name_wins_first_on_ties() {
        let features = vec![
            stop(37.9838, 23.7275, "Omonia", "1", Category::Metro).with_name_en("Omonia"),
            stop(37.98381, 23.72751, "Omonoia", "2", Category::Metro).with_name_en("Omonoia Sq"),
            stop(37.98382, 23.72752, "Omonoix", "3", Category::Metro),
        ];

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Omonoia");
        assert_eq!(stations[0].name_en, "Omonoia Sq");
    }

    #[test]
    fn test_name_length_counts_characters() {
        // "Σύνταγμα" is 8 characters but 16 bytes
        let features = vec![
            stop(37.9755, 23.7348, "Syntagmas", "2", Category::Metro),
            stop(37.97551, 23.73481, "Σύνταγμα", "3", Category::Metro),
        ];

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations[0].name, "Syntagmas");
    }

    #[test]
    fn test_all_empty_names_fall_back() {
        let features = vec![
            stop(37.9755, 23.7348, "", "2", Category::Metro),
            stop(37.97551, 23.73481, "", "3", Category::Metro),
        ];

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations[0].name, UNKNOWN_NAME);
    }

    #[test]
    fn test_codes_and_lines_deduplicated() {
        let features = vec![
            stop(37.9755, 23.7348, "Syntagma", "2", Category::Metro).with_stop_code("B"),
            stop(37.97551, 23.73481, "Syntagma", "2", Category::Metro).with_stop_code("A"),
            stop(37.97552, 23.73482, "Syntagma", "3", Category::Metro).with_stop_code("B"),
            stop(37.97553, 23.73483, "Syntagma", "3", Category::Metro),
        ];

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations.len(), 1);
        assert_eq!(line_ids(&stations[0]), vec!["2", "3"]);
        assert_eq!(
            stations[0].stop_codes.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(stations[0].categories.len(), 1);
        assert_eq!(stations[0].member_count, 4);
    }

    #[test]
    fn test_chained_stops_form_one_station() {
        // 150m steps: each neighbour is in range, the ends are 300m apart
        let features: Vec<_> = (0..3)
            .map(|i| {
                stop(
                    north_of(37.9, 150.0 * i as f64),
                    23.7,
                    &format!("Stop {}", i),
                    &i.to_string(),
                    Category::Bus,
                )
            })
            .collect();

        let stations = consolidate_points(&features, &StationConfig::default());
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].member_count, 3);
    }

    #[test]
    fn test_matches_brute_force_grouping() {
        let mut features = Vec::new();
        for i in 0..12 {
            for j in 0..6 {
                let name = if (i + j) % 4 == 0 { "Shared" } else { "Other" };
                features.push(stop(
                    37.9 + i as f64 * 0.0021,
                    23.7 + j as f64 * 0.0033,
                    &format!("{} {}", name, (i * j) % 3),
                    &format!("{}", j),
                    Category::Bus,
                ));
            }
        }
        let config = StationConfig::default();

        let indexed = consolidate_points(&features, &config);
        let brute = crate::spatial::group_by(features.len(), |i, j| {
            same_station(&features[i], &features[j], &config)
        });

        assert_eq!(indexed.len(), brute.len());
        for (station, group) in indexed.iter().zip(&brute) {
            assert_eq!(station.member_count, group.len());
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(consolidate_points(&[], &StationConfig::default()).is_empty());
    }
}
