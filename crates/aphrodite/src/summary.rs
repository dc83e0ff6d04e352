//! Bounded projections of charts and transits for downstream consumers.

use crate::aspects::Aspect;
use crate::bodies::Body;
use crate::chart::natal::NatalChart;
use crate::chart::position::PlanetPosition;
use crate::transit::data::{MoonPhase, TransitData};
use crate::western::dominance::DominanceTally;
use crate::western::signs::{Element, Modality};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactChartSummary {
    pub sun: Option<PlanetPosition>,
    pub moon: Option<PlanetPosition>,
    pub ascendant: Option<PlanetPosition>,
    pub personal: Vec<PlanetPosition>,
    pub dominance: DominanceTally,
    pub dominant_element: Element,
    pub dominant_modality: Modality,
    pub tightest_aspects: Vec<Aspect>,
}

impl CompactChartSummary {
    pub fn from_chart(chart: &NatalChart, max_aspects: usize) -> Self {
        Self {
            sun: chart.position(Body::Sun).cloned(),
            moon: chart.position(Body::Moon).cloned(),
            ascendant: chart.position(Body::Ascendant).cloned(),
            personal: pick(&chart.positions, &Body::PERSONAL),
            dominance: chart.dominance,
            dominant_element: chart.dominance.dominant_element(),
            dominant_modality: chart.dominance.dominant_modality(),
            tightest_aspects: tightest(&chart.aspects, max_aspects),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactTransitSummary {
    pub date: NaiveDate,
    pub moon_phase: MoonPhase,
    pub sun: Option<PlanetPosition>,
    pub moon: Option<PlanetPosition>,
    pub personal: Vec<PlanetPosition>,
    pub tightest_aspects: Vec<Aspect>,
}

impl CompactTransitSummary {
    pub fn from_transits(transits: &TransitData, max_aspects: usize) -> Self {
        Self {
            date: transits.date,
            moon_phase: transits.moon_phase,
            sun: transits.position(Body::Sun).cloned(),
            moon: transits.position(Body::Moon).cloned(),
            personal: pick(&transits.positions, &Body::PERSONAL),
            tightest_aspects: tightest(&transits.aspects, max_aspects),
        }
    }
}

fn pick(positions: &[PlanetPosition], bodies: &[Body]) -> Vec<PlanetPosition> {
    bodies
        .iter()
        .filter_map(|b| positions.iter().find(|p| p.body == *b).cloned())
        .collect()
}

/// The `n` smallest-orb aspects, ties kept in their original order.
pub fn tightest(aspects: &[Aspect], n: usize) -> Vec<Aspect> {
    let mut sorted = aspects.to_vec();
    sorted.sort_by(|a, b| a.orb.total_cmp(&b.orb));
    sorted.truncate(n);
    sorted
}
