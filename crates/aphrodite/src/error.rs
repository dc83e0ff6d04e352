use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that escape the engine boundary.
///
/// Provider and input problems are recovered locally; what is left here
/// indicates a logic error upstream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Julian Day for {instant} is not finite; refusing to cast a chart from it")]
    NonFiniteJulianDay { instant: DateTime<Utc> },
}
