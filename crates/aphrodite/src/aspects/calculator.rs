use crate::aspects::types::{Aspect, AspectKind, AspectTable};
use crate::chart::position::PlanetPosition;

/// Aspect calculator
#[derive(Debug, Clone, Default)]
pub struct AspectCalculator {
    table: AspectTable,
}

impl AspectCalculator {
    /// Create a calculator over the default major-aspect table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: AspectTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &AspectTable {
        &self.table
    }

    /// Compute aspects for every unordered pair within one set of positions
    pub fn compute_aspects(&self, positions: &[PlanetPosition]) -> Vec<Aspect> {
        let mut aspects = Vec::new();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if let Some(aspect) = self.aspect_between(&positions[i], &positions[j]) {
                    aspects.push(aspect);
                }
            }
        }
        aspects
    }

    /// Compute aspects from each transiting position to each natal position.
    ///
    /// A body aspecting its own natal place is kept: that is how returns show up.
    pub fn compute_cross_aspects(
        &self,
        transits: &[PlanetPosition],
        natal: &[PlanetPosition],
    ) -> Vec<Aspect> {
        let mut aspects = Vec::new();
        for transit in transits {
            for radix in natal {
                if let Some(aspect) = self.aspect_between(transit, radix) {
                    aspects.push(aspect);
                }
            }
        }
        aspects
    }

    pub fn aspect_between(&self, a: &PlanetPosition, b: &PlanetPosition) -> Option<Aspect> {
        let (kind, orb, applying) =
            self.calculate_aspect(a.absolute_degrees(), b.absolute_degrees(), a.speed, b.speed)?;
        Some(Aspect {
            first: a.body,
            second: b.body,
            kind,
            orb,
            applying,
        })
    }

    /// Calculate aspect between two longitudes using planet speeds
    pub fn calculate_aspect(
        &self,
        lon1: f64,
        lon2: f64,
        speed1: f64,
        speed2: f64,
    ) -> Option<(AspectKind, f64, bool)> {
        let angle_diff = separation(lon1, lon2);
        let (kind, orb) = self.classify(angle_diff)?;
        let applying = is_aspect_applying(lon1, lon2, speed1, speed2, kind.angle(), angle_diff);
        Some((kind, orb, applying))
    }

    /// First rule in table order whose orb contains the separation
    pub fn classify(&self, angle_diff: f64) -> Option<(AspectKind, f64)> {
        // Early exit if angle is too large to be any aspect
        if !angle_diff.is_finite() || angle_diff > 180.0 + self.table.max_orb() {
            return None;
        }
        self.table.rules.iter().find_map(|rule| {
            let orb = (angle_diff - rule.kind.angle()).abs();
            (orb <= rule.orb).then_some((rule.kind, orb))
        })
    }
}

/// Shortest angular distance between two longitudes, in [0, 180]
pub fn separation(lon1: f64, lon2: f64) -> f64 {
    let raw_diff = (lon1 - lon2).rem_euclid(360.0);
    if raw_diff > 180.0 {
        360.0 - raw_diff
    } else {
        raw_diff
    }
}

/// Determine if an aspect is applying (approaching exact) or separating
fn is_aspect_applying(
    lon1: f64,
    lon2: f64,
    speed1: f64,
    speed2: f64,
    aspect_angle: f64,
    current_angle: f64,
) -> bool {
    // Relative speed (degrees per day)
    let relative_speed = speed1 - speed2;

    // Direction is unreliable when the bodies move together
    if relative_speed.abs() < 0.01 {
        return current_angle < aspect_angle + 0.5;
    }

    let signed_diff = wrap_signed(lon1 - lon2);
    let current_distance = (current_angle - aspect_angle).abs();

    // Project forward a small step and see whether we get closer to exact
    let time_step = 0.1;
    let future_angle = wrap_signed(signed_diff + relative_speed * time_step).abs();
    let future_distance = (future_angle - aspect_angle).abs();

    future_distance < current_distance
}

fn wrap_signed(diff: f64) -> f64 {
    let d = diff.rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_wraps() {
        assert_eq!(separation(95.0, 185.0), 90.0);
        assert_eq!(separation(350.0, 10.0), 20.0);
        assert_eq!(separation(10.0, 350.0), 20.0);
        assert_eq!(separation(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_square_not_opposition() {
        let calc = AspectCalculator::new();
        let (kind, orb, _) = calc.calculate_aspect(95.0, 185.0, 1.0, 13.0).unwrap();
        assert_eq!(kind, AspectKind::Square);
        assert_eq!(orb, 0.0);
    }

    #[test]
    fn test_orb_boundaries() {
        let calc = AspectCalculator::new();
        assert_eq!(calc.classify(7.0).map(|a| a.0), Some(AspectKind::Conjunction));
        assert_eq!(calc.classify(8.0).map(|a| a.0), Some(AspectKind::Conjunction));
        assert_eq!(calc.classify(8.5), None);
        assert_eq!(calc.classify(66.0).map(|a| a.0), Some(AspectKind::Sextile));
        assert_eq!(calc.classify(66.5), None);
        assert_eq!(calc.classify(173.0).map(|a| a.0), Some(AspectKind::Opposition));
    }

    #[test]
    fn test_applying_when_closing() {
        let calc = AspectCalculator::new();
        // Moon 5 degrees behind the Sun and catching up
        let (_, _, applying) = calc.calculate_aspect(95.0, 100.0, 13.0, 1.0).unwrap();
        assert!(applying);
        let (_, _, applying) = calc.calculate_aspect(105.0, 100.0, 13.0, 1.0).unwrap();
        assert!(!applying);
    }
}
