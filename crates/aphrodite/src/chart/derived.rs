//! Points computed from other chart points rather than read from an ephemeris.

use crate::western::signs::normalize_degrees;

pub fn south_node(north_node: f64) -> f64 {
    normalize_degrees(north_node + 180.0)
}

pub fn descendant(ascendant: f64) -> f64 {
    normalize_degrees(ascendant + 180.0)
}

pub fn imum_coeli(midheaven: f64) -> f64 {
    normalize_degrees(midheaven + 180.0)
}

/// Sun above the horizon, i.e. in houses 7-12.
///
/// Without a resolved house the Sun's distance from the Ascendant decides: more
/// than 180° counter-clockwise puts it in the upper half.
pub fn is_day_chart(sun: f64, sun_house: Option<u8>, ascendant: f64) -> bool {
    match sun_house {
        Some(house) => house >= 7,
        None => normalize_degrees(sun - ascendant) > 180.0,
    }
}

/// Ascendant + Moon - Sun by day, Ascendant + Sun - Moon by night.
pub fn part_of_fortune(ascendant: f64, sun: f64, moon: f64, day_chart: bool) -> f64 {
    if day_chart {
        normalize_degrees(ascendant + moon - sun)
    } else {
        normalize_degrees(ascendant + sun - moon)
    }
}
