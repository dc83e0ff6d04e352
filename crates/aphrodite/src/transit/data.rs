use crate::aspects::Aspect;
use crate::chart::position::PlanetPosition;
use crate::western::signs::normalize_degrees;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Eight lunar phases, each spanning 45° of Moon-Sun elongation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

const PHASES: [MoonPhase; 8] = [
    MoonPhase::NewMoon,
    MoonPhase::WaxingCrescent,
    MoonPhase::FirstQuarter,
    MoonPhase::WaxingGibbous,
    MoonPhase::FullMoon,
    MoonPhase::WaningGibbous,
    MoonPhase::LastQuarter,
    MoonPhase::WaningCrescent,
];

impl MoonPhase {
    /// Phase whose 45° bin, centred on its canonical angle, holds the elongation.
    pub fn from_longitudes(sun: f64, moon: f64) -> Self {
        let elongation = normalize_degrees(moon - sun);
        let index = ((elongation + 22.5) / 45.0).floor() as usize % 8;
        PHASES[index]
    }

    pub fn label(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The sky on one day measured against a natal chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitData {
    pub date: NaiveDate,
    /// Instant the positions were computed for (noon UTC of `date`)
    pub instant: DateTime<Utc>,
    pub julian_day: f64,
    /// Transiting positions, housed in the natal chart
    pub positions: Vec<PlanetPosition>,
    /// `first` transiting, `second` natal
    pub aspects: Vec<Aspect>,
    pub moon_phase: MoonPhase,
}

impl TransitData {
    pub fn position(&self, body: crate::bodies::Body) -> Option<&PlanetPosition> {
        self.positions.iter().find(|p| p.body == body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_bins() {
        assert_eq!(MoonPhase::from_longitudes(100.0, 100.0), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_longitudes(100.0, 80.0), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_longitudes(100.0, 190.0), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::from_longitudes(350.0, 170.0), MoonPhase::FullMoon);
        assert_eq!(MoonPhase::from_longitudes(0.0, 300.0), MoonPhase::WaningCrescent);
        assert_eq!(MoonPhase::from_longitudes(0.0, 340.0), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::FullMoon.to_string(), "Full Moon");
    }
}
