//! Aphrodite: an astrological ephemeris engine.
//!
//! Birth data flows through time normalization, the Julian Day, an ephemeris
//! provider (Swiss Ephemeris with a mean-motion fallback), sign/house resolution,
//! derived points, aspects and dominance into a [`NatalChart`]. Transits and cycle
//! scans reuse the same pipeline for later instants. [`ChartEngine`] puts caches
//! with in-flight sharing in front of all of it.

pub mod aspects;
pub mod bodies;
pub mod cache;
pub mod chart;
pub mod engine;
pub mod ephemeris;
pub mod error;
pub mod summary;
pub mod time;
pub mod transit;
pub mod western;

pub use aspects::{Aspect, AspectCalculator, AspectKind};
pub use bodies::Body;
pub use chart::{BirthAccuracy, BirthInput, NatalChart, PlanetPosition};
pub use engine::ChartEngine;
pub use ephemeris::{EphemerisMode, EphemerisProvider, ResilientEphemeris};
pub use error::EngineError;
pub use summary::{CompactChartSummary, CompactTransitSummary};
pub use transit::{CycleEvent, CycleKind, MoonPhase, TransitData};

pub use aphrodite_config::EngineConfig;
