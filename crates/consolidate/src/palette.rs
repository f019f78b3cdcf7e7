//! Official line colours.

use crate::models::Category;

/// Colour used when neither the line nor its category is known.
pub const FALLBACK_COLOR: &str = "#666666";

fn official_color(key: &str) -> Option<&'static str> {
    let color = match key {
        // Metro
        "M1" | "1" => "#00A651",
        "M2" | "2" => "#ED1C24",
        "M3" | "3" => "#0066B3",
        "M4" | "4" => "#FFC107",
        // Tram
        "T6" | "6" | "T7" | "7" => "#00A651",
        // Suburban
        "A1" => "#FFD600",
        "A2" => "#9C27B0",
        "A3" => "#8BC34A",
        "A4" => "#87CEEB",
        _ => return None,
    };
    Some(color)
}

fn category_color(category: &Category) -> &'static str {
    match category {
        Category::Metro | Category::Tram => "#00A651",
        Category::Suburban => "#FFD600",
        Category::Trolley => "#F27C02",
        Category::Bus => "#009EC6",
        Category::Other(_) => FALLBACK_COLOR,
    }
}

/// Colour for a line, trying the bare number, then the mode-prefixed
/// number (`M2`, `T6`), then the category colour. Official colours only
/// belong to rail lines, so bus and trolley numbers never match them.
pub fn line_color(line: &str, category: &Category) -> &'static str {
    let prefixed = match category {
        Category::Metro => format!("M{}", line),
        Category::Tram => format!("T{}", line),
        Category::Suburban => line.to_string(),
        Category::Trolley | Category::Bus | Category::Other(_) => {
            return category_color(category)
        }
    };

    official_color(line)
        .or_else(|| official_color(&prefixed))
        .unwrap_or_else(|| category_color(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_colors() {
        assert_eq!(line_color("M2", &Category::Metro), "#ED1C24");
        assert_eq!(line_color("3", &Category::Metro), "#0066B3");
        assert_eq!(line_color("A2", &Category::Suburban), "#9C27B0");
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(line_color("608", &Category::Bus), "#009EC6");
        assert_eq!(line_color("21", &Category::Trolley), "#F27C02");
        assert_eq!(line_color("X", &Category::Other("ferry".into())), FALLBACK_COLOR);
    }

    #[test]
    fn test_bus_numbers_ignore_rail_colors() {
        assert_eq!(line_color("2", &Category::Bus), "#009EC6");
        assert_eq!(line_color("1", &Category::Trolley), "#F27C02");
        assert_eq!(line_color("A1", &Category::Other("ferry".into())), FALLBACK_COLOR);
        assert_eq!(line_color("2", &Category::Metro), "#ED1C24");
        assert_eq!(line_color("6", &Category::Tram), "#00A651");
    }
}
