//! House placement from a set of twelve cusps.

use crate::western::signs::normalize_degrees;

/// 1-based house containing `lon`, or `None` when fewer than 12 cusps are known
/// (for example when a quadrant system degenerates near the poles).
///
/// House `i` spans `[cusp[i], cusp[i + 1])`, wrapping through 0° when the end
/// cusp is numerically smaller than the start.
pub fn resolve_house(lon: f64, cusps: &[f64]) -> Option<u8> {
    if cusps.len() < 12 {
        return None;
    }
    let lon = normalize_degrees(lon);
    for i in 0..12 {
        let start = normalize_degrees(cusps[i]);
        let end = normalize_degrees(cusps[(i + 1) % 12]);
        let inside = if start <= end {
            lon >= start && lon < end
        } else {
            lon >= start || lon < end
        };
        if inside {
            return Some(i as u8 + 1);
        }
    }
    // Cusps out of zodiacal order: take the nearest cusp behind the longitude.
    (0..12)
        .min_by(|&a, &b| {
            let da = normalize_degrees(lon - cusps[a]);
            let db = normalize_degrees(lon - cusps[b]);
            da.total_cmp(&db)
        })
        .map(|i| i as u8 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_cusps(start: f64) -> Vec<f64> {
        (0..12).map(|i| normalize_degrees(start + 30.0 * i as f64)).collect()
    }

    #[test]
    fn test_simple_houses() {
        let cusps = equal_cusps(0.0);
        assert_eq!(resolve_house(0.0, &cusps), Some(1));
        assert_eq!(resolve_house(29.99, &cusps), Some(1));
        assert_eq!(resolve_house(30.0, &cusps), Some(2));
        assert_eq!(resolve_house(359.0, &cusps), Some(12));
    }

    #[test]
    fn test_wraparound_house() {
        // House 10 runs from 350° to 20°
        let cusps = equal_cusps(80.0);
        assert_eq!(cusps[9], 350.0);
        assert_eq!(resolve_house(355.0, &cusps), Some(10));
        assert_eq!(resolve_house(5.0, &cusps), Some(10));
        assert_eq!(resolve_house(20.0, &cusps), Some(11));
    }

    #[test]
    fn test_too_few_cusps() {
        assert_eq!(resolve_house(10.0, &[0.0, 30.0, 60.0]), None);
        assert_eq!(resolve_house(10.0, &[]), None);
    }
}
