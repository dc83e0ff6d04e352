use crate::bodies::Body;
use crate::ephemeris::types::{GeoLocation, HousePositions, RawPosition};
use crate::ephemeris::{EphemerisError, EphemerisProvider};
use aphrodite_config::{house_system_code, HOUSE_SYSTEMS};
use std::panic;
use std::path::{Path, PathBuf};
use swisseph::swe::{calc_ut, houses_ex, set_ephe_path};
use swisseph::{AscMc, Cusp};

// SEFLG_SWIEPH: use Swiss Ephemeris data files
const FLG_SWIEPH: u32 = 2;
// SEFLG_SPEED: also compute daily motion
const FLG_SPEED: u32 = 256;

// Indices into the raw ascmc array
const ASCMC_VERTEX: usize = 3;
const ASCMC_EQUASC: usize = 4;

/// Swiss Ephemeris adapter implementation
pub struct SwissEphemerisAdapter {
    ephemeris_path: PathBuf,
    house_system: String,
    house_system_byte: u8,
}

impl SwissEphemerisAdapter {
    /// Create an adapter over the Swiss Ephemeris data files in `ephemeris_path`.
    ///
    /// Fails when the data directory is missing, which is how the engine decides
    /// at startup whether the precision library is usable at all.
    pub fn new(ephemeris_path: &Path, house_system: &str) -> Result<Self, EphemerisError> {
        if !ephemeris_path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: ephemeris_path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }
        let house_system_byte =
            house_system_code(house_system).ok_or_else(|| EphemerisError::InvalidHouseSystem {
                system: house_system.to_string(),
                valid: HOUSE_SYSTEMS.iter().map(|(name, _)| name.to_string()).collect(),
            })?;

        // Process-wide in the native library; asteroid files are only found here.
        set_ephe_path(&ephemeris_path.to_string_lossy());
        log::debug!("Swiss Ephemeris path set to {}", ephemeris_path.display());

        Ok(Self {
            ephemeris_path: ephemeris_path.to_path_buf(),
            house_system: house_system.to_lowercase(),
            house_system_byte,
        })
    }

    pub fn ephemeris_path(&self) -> &Path {
        &self.ephemeris_path
    }
}

impl EphemerisProvider for SwissEphemerisAdapter {
    fn name(&self) -> &str {
        "swiss-ephemeris"
    }

    fn body_position(&self, jd: f64, body: Body) -> Result<RawPosition, EphemerisError> {
        let planet_code = body.swiss_id().ok_or_else(|| EphemerisError::CalculationFailed {
            body,
            jd,
            message: "body has no Swiss Ephemeris id".to_string(),
        })?;

        // The native call sits behind a panic boundary so one bad body cannot take
        // the whole chart down.
        let outcome = panic::catch_unwind(|| calc_ut(jd, planet_code as u32, FLG_SWIEPH | FLG_SPEED))
            .map_err(|_| EphemerisError::CalculationFailed {
                body,
                jd,
                message: "Swiss Ephemeris panicked".to_string(),
            })?;
        let result = outcome.map_err(|e| EphemerisError::CalculationFailed {
            body,
            jd,
            message: format!("Swiss Ephemeris error: {}", e),
        })?;

        let out = result.out;
        let position = RawPosition {
            lon: out[0].rem_euclid(360.0),
            lat: out[1],
            speed_lon: out[3],
        };
        if !position.is_finite() {
            return Err(EphemerisError::NonFinite {
                what: format!("{} longitude", body),
                jd,
            });
        }
        Ok(position)
    }

    fn houses(&self, jd: f64, location: GeoLocation) -> Result<HousePositions, EphemerisError> {
        let outcome = panic::catch_unwind(|| {
            houses_ex(jd, 0, location.lat, location.lon, self.house_system_byte as i32)
        })
        .map_err(|_| EphemerisError::HouseCalculationFailed {
            message: "Swiss Ephemeris panicked".to_string(),
        })?;
        let (c, a) = outcome;
        let vertex = a[ASCMC_VERTEX];
        let east_point = a[ASCMC_EQUASC];
        let cusps = Cusp::from_array(c);
        let ascmc = AscMc::from_array(a);

        let cusp_values = [
            cusps.first, cusps.second, cusps.third, cusps.fourth,
            cusps.fifth, cusps.sixth, cusps.seventh, cusps.eighth,
            cusps.ninth, cusps.tenth, cusps.eleventh, cusps.twelfth,
        ];

        let houses = HousePositions {
            system: self.house_system.clone(),
            cusps: cusp_values.iter().map(|c| c.rem_euclid(360.0)).collect(),
            ascendant: ascmc.ascendant.rem_euclid(360.0),
            midheaven: ascmc.mc.rem_euclid(360.0),
            vertex: vertex.rem_euclid(360.0),
            east_point: east_point.rem_euclid(360.0),
        };
        if !houses.is_valid() {
            // Quadrant systems break down inside the polar circles.
            return Err(EphemerisError::HouseCalculationFailed {
                message: format!(
                    "{} houses undefined at lat {:.2}, lon {:.2}",
                    self.house_system, location.lat, location.lon
                ),
            });
        }
        Ok(houses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_rejected() {
        let err = SwissEphemerisAdapter::new(Path::new("/definitely/not/here/ephe"), "placidus")
            .err()
            .unwrap();
        assert!(matches!(err, EphemerisError::FileNotFound { .. }));
    }

    #[test]
    fn test_unknown_house_system_is_rejected() {
        let dir = std::env::temp_dir();
        let err = SwissEphemerisAdapter::new(&dir, "made_up").err().unwrap();
        assert!(matches!(err, EphemerisError::InvalidHouseSystem { .. }));
    }

    #[test]
    fn test_existing_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = SwissEphemerisAdapter::new(dir.path(), "Whole_Sign").unwrap();
        assert_eq!(adapter.ephemeris_path(), dir.path());
        assert_eq!(adapter.house_system, "whole_sign");
    }
}
