//! Ephemeris providers.
//!
//! [`SwissEphemerisAdapter`] wraps the native Swiss Ephemeris; [`MeanMotionEphemeris`]
//! is a deterministic closed-form approximation. [`ResilientEphemeris`] composes the
//! two, degrading per body when the precision call fails.

pub mod adapter;
pub mod fallback;
pub mod resilient;
pub mod types;

pub use adapter::SwissEphemerisAdapter;
pub use fallback::MeanMotionEphemeris;
pub use resilient::{EphemerisMode, ResilientEphemeris};
pub use types::{GeoLocation, HousePositions, RawPosition};

use crate::bodies::Body;
use thiserror::Error;

/// Errors that can occur inside an ephemeris provider. They never leave
/// [`ResilientEphemeris`].
#[derive(Error, Debug, Clone)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Invalid house system: {system}. Valid systems: {valid:?}")]
    InvalidHouseSystem { system: String, valid: Vec<String> },
    #[error("Failed to calculate position for {body} at JD {jd}: {message}")]
    CalculationFailed { body: Body, jd: f64, message: String },
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
    #[error("{what} came back non-finite at JD {jd}")]
    NonFinite { what: String, jd: f64 },
}

/// Source of body longitudes and house frames.
pub trait EphemerisProvider: Send + Sync {
    fn name(&self) -> &str;

    fn body_position(&self, jd: f64, body: Body) -> Result<RawPosition, EphemerisError>;

    fn houses(&self, jd: f64, location: GeoLocation) -> Result<HousePositions, EphemerisError>;
}
