use crate::bodies::Body;
use crate::ephemeris::adapter::SwissEphemerisAdapter;
use crate::ephemeris::fallback::MeanMotionEphemeris;
use crate::ephemeris::types::{GeoLocation, HousePositions, RawPosition};
use crate::ephemeris::EphemerisProvider;
use aphrodite_config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which provider the engine settled on at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EphemerisMode {
    Precision,
    Fallback,
}

impl fmt::Display for EphemerisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EphemerisMode::Precision => f.write_str("precision"),
            EphemerisMode::Fallback => f.write_str("fallback"),
        }
    }
}

/// Precision provider with a mean-motion safety net.
///
/// Mode is decided once. In precision mode each body (and the house frame) is still
/// checked individually, and only the failing piece drops to the fallback. Nothing
/// from here surfaces as an error.
#[derive(Clone)]
pub struct ResilientEphemeris {
    primary: Option<Arc<dyn EphemerisProvider>>,
    fallback: MeanMotionEphemeris,
}

impl ResilientEphemeris {
    /// Probe the configured ephemeris path and pick a mode.
    pub fn bootstrap(config: &EngineConfig) -> Self {
        let Some(path) = config.ephemeris_path.as_deref() else {
            log::info!("No Swiss Ephemeris path configured, using mean-motion fallback");
            return Self::fallback_only();
        };
        match SwissEphemerisAdapter::new(path, &config.house_system) {
            Ok(adapter) => {
                log::info!(
                    "Swiss Ephemeris ready at {} ({} houses)",
                    adapter.ephemeris_path().display(),
                    config.house_system
                );
                Self::with_primary(Arc::new(adapter))
            }
            Err(e) => {
                log::warn!("Swiss Ephemeris unavailable, using mean-motion fallback: {}", e);
                Self::fallback_only()
            }
        }
    }

    pub fn with_primary(primary: Arc<dyn EphemerisProvider>) -> Self {
        Self {
            primary: Some(primary),
            fallback: MeanMotionEphemeris::new(),
        }
    }

    pub fn fallback_only() -> Self {
        Self {
            primary: None,
            fallback: MeanMotionEphemeris::new(),
        }
    }

    pub fn mode(&self) -> EphemerisMode {
        if self.primary.is_some() {
            EphemerisMode::Precision
        } else {
            EphemerisMode::Fallback
        }
    }

    /// Longitude, latitude and speed for one body. `None` only for points that
    /// have no orbit of their own (angles and derived points).
    pub fn position(&self, jd: f64, body: Body) -> Option<RawPosition> {
        if let Some(primary) = &self.primary {
            match primary.body_position(jd, body) {
                Ok(pos) if pos.is_finite() => return Some(pos),
                Ok(_) => log::debug!("{} returned non-finite {} at JD {}", primary.name(), body, jd),
                Err(e) => log::debug!("{} failed for {}: {}", primary.name(), body, e),
            }
        }
        self.fallback.mean_position(jd, body)
    }

    /// House frame for the instant and location. Always returns twelve finite cusps.
    pub fn houses(&self, jd: f64, location: GeoLocation) -> HousePositions {
        let approx = self.fallback.mean_houses(jd, location);
        let Some(primary) = &self.primary else {
            return approx;
        };
        match primary.houses(jd, location) {
            Ok(mut houses) if houses.is_valid() => {
                if !houses.vertex.is_finite() {
                    houses.vertex = approx.vertex;
                }
                if !houses.east_point.is_finite() {
                    houses.east_point = approx.east_point;
                }
                houses
            }
            Ok(_) => {
                log::debug!("{} returned an invalid house frame at JD {}", primary.name(), jd);
                approx
            }
            Err(e) => {
                log::debug!("{} house calculation failed: {}", primary.name(), e);
                approx
            }
        }
    }
}

impl fmt::Debug for ResilientEphemeris {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientEphemeris")
            .field("primary", &self.primary.as_ref().map(|p| p.name().to_string()))
            .field("mode", &self.mode())
            .finish()
    }
}
