//! Closed-form fallback ephemeris.
//!
//! Longitudes advance uniformly from a J2000 phase at each body's mean sidereal
//! rate. Houses use local sidereal time and mean obliquity with equal houses from
//! the Ascendant. Deterministic: the same Julian Day always gives the same sky.

use crate::bodies::{Body, RetroWindow};
use crate::ephemeris::types::{GeoLocation, HousePositions, RawPosition};
use crate::ephemeris::{EphemerisError, EphemerisProvider};
use crate::time::days_since_j2000;
use crate::western::signs::normalize_degrees;

// Keep tan(latitude) finite at the poles.
const MAX_ABS_LATITUDE: f64 = 89.99;
// Apparent speed while retrograde, as a fraction of mean motion.
const RETROGRADE_SPEED_FACTOR: f64 = -0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct MeanMotionEphemeris;

impl MeanMotionEphemeris {
    pub fn new() -> Self {
        Self
    }

    /// Position from mean motion; `None` for points without an orbit of their own.
    pub fn mean_position(&self, jd: f64, body: Body) -> Option<RawPosition> {
        let orbit = body.mean_orbit()?;
        let days = days_since_j2000(jd);
        let mean_speed = 360.0 / orbit.period_days;
        let lon = normalize_degrees(orbit.epoch_lon + mean_speed * days);

        let retrograde = match orbit.retro {
            RetroWindow::Never => false,
            RetroWindow::Always => true,
            RetroWindow::Synodic {
                period_days,
                fraction,
            } => {
                let phase = (days / period_days + orbit.epoch_lon / 360.0).rem_euclid(1.0);
                phase < fraction
            }
        };
        let speed_lon = match orbit.retro {
            // already negative through the period sign
            RetroWindow::Always => mean_speed,
            _ if retrograde => mean_speed.abs() * RETROGRADE_SPEED_FACTOR,
            _ => mean_speed.abs(),
        };

        Some(RawPosition {
            lon,
            lat: 0.0,
            speed_lon,
        })
    }

    pub fn mean_houses(&self, jd: f64, location: GeoLocation) -> HousePositions {
        let lat = location.lat.clamp(-MAX_ABS_LATITUDE, MAX_ABS_LATITUDE);
        let eps = mean_obliquity(jd).to_radians();
        let ramc = local_sidereal_time_deg(jd, location.lon).to_radians();

        let ascendant = ascendant_deg(ramc, lat.to_radians(), eps);
        let midheaven =
            normalize_degrees(f64::atan2(ramc.sin(), ramc.cos() * eps.cos()).to_degrees());
        let east_point = ascendant_deg(ramc, 0.0, eps);
        // Vertex: the western "ascendant" of the prime vertical, i.e. the
        // ascendant formula at RAMC + 180 and the colatitude.
        let colatitude = 90.0 - lat;
        let vertex = ascendant_deg(ramc + std::f64::consts::PI, colatitude.to_radians(), eps);

        HousePositions {
            system: "equal".to_string(),
            cusps: (0..12)
                .map(|i| normalize_degrees(ascendant + 30.0 * i as f64))
                .collect(),
            ascendant,
            midheaven,
            vertex,
            east_point,
        }
    }
}

impl EphemerisProvider for MeanMotionEphemeris {
    fn name(&self) -> &str {
        "mean-motion"
    }

    fn body_position(&self, jd: f64, body: Body) -> Result<RawPosition, EphemerisError> {
        self.mean_position(jd, body)
            .ok_or_else(|| EphemerisError::CalculationFailed {
                body,
                jd,
                message: "no mean orbit for this point".to_string(),
            })
    }

    fn houses(&self, jd: f64, location: GeoLocation) -> Result<HousePositions, EphemerisError> {
        Ok(self.mean_houses(jd, location))
    }
}

/// Mean obliquity of the ecliptic in degrees (linear term only).
pub fn mean_obliquity(jd: f64) -> f64 {
    let t = days_since_j2000(jd) / 36_525.0;
    23.439_291_1 - 0.013_004_2 * t
}

/// Local sidereal time in degrees for an east-positive longitude.
pub fn local_sidereal_time_deg(jd: f64, lon_east: f64) -> f64 {
    let gmst = 280.460_618_37 + 360.985_647_366_29 * days_since_j2000(jd);
    normalize_degrees(gmst + lon_east)
}

/// Ecliptic longitude rising on the eastern horizon, all angles in radians in, degrees out.
fn ascendant_deg(ramc: f64, lat: f64, eps: f64) -> f64 {
    let asc = f64::atan2(ramc.cos(), -(ramc.sin() * eps.cos() + lat.tan() * eps.sin()));
    normalize_degrees(asc.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::J2000_JD;

    #[test]
    fn test_sun_at_epoch_is_phase_offset() {
        let eph = MeanMotionEphemeris::new();
        let sun = eph.mean_position(J2000_JD, Body::Sun).unwrap();
        assert!((sun.lon - 280.460).abs() < 1e-9);
        assert!(!sun.retrograde());
    }

    #[test]
    fn test_deterministic() {
        let eph = MeanMotionEphemeris::new();
        for body in Body::ephemeris_bodies() {
            let a = eph.mean_position(2_448_057.52, body).unwrap();
            let b = eph.mean_position(2_448_057.52, body).unwrap();
            assert_eq!(a.lon.to_bits(), b.lon.to_bits());
            assert!((0.0..360.0).contains(&a.lon));
        }
    }

    #[test]
    fn test_nodes_always_retrograde_luminaries_never() {
        let eph = MeanMotionEphemeris::new();
        for step in 0..50 {
            let jd = J2000_JD + step as f64 * 37.3;
            assert!(eph.mean_position(jd, Body::NorthNode).unwrap().retrograde());
            assert!(!eph.mean_position(jd, Body::Sun).unwrap().retrograde());
            assert!(!eph.mean_position(jd, Body::Moon).unwrap().retrograde());
        }
    }

    #[test]
    fn test_saturn_spends_some_time_retrograde() {
        let eph = MeanMotionEphemeris::new();
        let retro_days = (0..3780)
            .filter(|d| {
                eph.mean_position(J2000_JD + *d as f64, Body::Saturn)
                    .unwrap()
                    .retrograde()
            })
            .count();
        // ~37% of ten synodic cycles
        assert!(retro_days > 1200 && retro_days < 1600, "{}", retro_days);
    }

    #[test]
    fn test_points_have_no_mean_orbit() {
        let eph = MeanMotionEphemeris::new();
        assert!(eph.mean_position(J2000_JD, Body::Ascendant).is_none());
        assert!(eph.body_position(J2000_JD, Body::PartOfFortune).is_err());
    }

    #[test]
    fn test_equal_houses_follow_ascendant() {
        let eph = MeanMotionEphemeris::new();
        let houses = eph.mean_houses(2_448_057.52, GeoLocation { lat: 31.23, lon: 121.47 });
        assert!(houses.is_valid());
        assert_eq!(houses.cusps[0], houses.ascendant);
        let gap = normalize_degrees(houses.cusps[4] - houses.cusps[3]);
        assert!((gap - 30.0).abs() < 1e-9);
        // The MC sits in the upper half of the chart, roughly a quadrant behind the Ascendant.
        let asc_minus_mc = normalize_degrees(houses.ascendant - houses.midheaven);
        assert!(asc_minus_mc > 45.0 && asc_minus_mc < 135.0, "{}", asc_minus_mc);
    }

    #[test]
    fn test_equatorial_east_point_matches_ascendant() {
        let eph = MeanMotionEphemeris::new();
        let houses = eph.mean_houses(J2000_JD, GeoLocation { lat: 0.0, lon: 0.0 });
        assert!((houses.east_point - houses.ascendant).abs() < 1e-9);
    }

    #[test]
    fn test_polar_latitude_stays_finite() {
        let eph = MeanMotionEphemeris::new();
        let houses = eph.mean_houses(J2000_JD, GeoLocation { lat: 90.0, lon: 0.0 });
        assert!(houses.is_valid());
        assert!(houses.vertex.is_finite());
    }
}
