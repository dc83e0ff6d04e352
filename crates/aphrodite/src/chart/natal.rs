use crate::aspects::{Aspect, AspectCalculator};
use crate::bodies::Body;
use crate::chart::birth::{BirthAccuracy, BirthInput};
use crate::chart::position::PlanetPosition;
use crate::chart::sky::observe_sky;
use crate::ephemeris::{EphemerisMode, GeoLocation, ResilientEphemeris};
use crate::error::EngineError;
use crate::time::checked_julian_day;
use crate::western::dominance::{tally_dominance, DominanceTally};
use aphrodite_config::ReferenceLocation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed configuration of the sky at birth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NatalChart {
    pub birth_instant: DateTime<Utc>,
    pub julian_day: f64,
    pub accuracy: BirthAccuracy,
    pub location: GeoLocation,
    pub mode: EphemerisMode,
    pub house_system: String,
    pub positions: Vec<PlanetPosition>,
    pub aspects: Vec<Aspect>,
    pub dominance: DominanceTally,
    pub house_cusps: Vec<f64>,
}

impl NatalChart {
    /// Run the full natal pipeline without any caching.
    pub fn compute(
        ephemeris: &ResilientEphemeris,
        calculator: &AspectCalculator,
        input: &BirthInput,
        default_location: ReferenceLocation,
    ) -> Result<Self, EngineError> {
        let birth_instant = input.utc_instant();
        let julian_day = checked_julian_day(birth_instant)?;
        let location = input.location(default_location);

        let sky = observe_sky(ephemeris, julian_day, location);
        let positions = sky.positions(&sky.houses.cusps);
        let aspect_bodies: Vec<PlanetPosition> = positions
            .iter()
            .filter(|p| !p.body.is_mirror())
            .cloned()
            .collect();
        let aspects = calculator.compute_aspects(&aspect_bodies);
        let dominance = tally_dominance(&positions);

        Ok(Self {
            birth_instant,
            julian_day,
            accuracy: input.accuracy,
            location,
            mode: ephemeris.mode(),
            house_system: sky.houses.system.clone(),
            positions,
            aspects,
            dominance,
            house_cusps: sky.houses.cusps,
        })
    }

    pub fn position(&self, body: Body) -> Option<&PlanetPosition> {
        self.positions.iter().find(|p| p.body == body)
    }

    pub fn longitude(&self, body: Body) -> Option<f64> {
        self.position(body).map(|p| p.longitude)
    }
}
