//! Element and modality tallies over the ten core bodies.

use crate::chart::position::PlanetPosition;
use crate::western::signs::{Element, Modality};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub fire: u8,
    pub earth: u8,
    pub air: u8,
    pub water: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityCounts {
    pub cardinal: u8,
    pub fixed: u8,
    pub mutable: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominanceTally {
    pub elements: ElementCounts,
    pub modalities: ModalityCounts,
}

impl DominanceTally {
    pub fn count_element(&self, element: Element) -> u8 {
        match element {
            Element::Fire => self.elements.fire,
            Element::Earth => self.elements.earth,
            Element::Air => self.elements.air,
            Element::Water => self.elements.water,
        }
    }

    pub fn count_modality(&self, modality: Modality) -> u8 {
        match modality {
            Modality::Cardinal => self.modalities.cardinal,
            Modality::Fixed => self.modalities.fixed,
            Modality::Mutable => self.modalities.mutable,
        }
    }

    /// Highest element count; ties go to the earlier of fire, earth, air, water.
    pub fn dominant_element(&self) -> Element {
        let mut best = Element::Fire;
        for e in [Element::Earth, Element::Air, Element::Water] {
            if self.count_element(e) > self.count_element(best) {
                best = e;
            }
        }
        best
    }

    /// Highest modality count; ties go to the earlier of cardinal, fixed, mutable.
    pub fn dominant_modality(&self) -> Modality {
        let mut best = Modality::Cardinal;
        for m in [Modality::Fixed, Modality::Mutable] {
            if self.count_modality(m) > self.count_modality(best) {
                best = m;
            }
        }
        best
    }

    pub fn total(&self) -> u8 {
        self.elements.fire + self.elements.earth + self.elements.air + self.elements.water
    }
}

/// Tally the core bodies among `positions`; angles and derived points are ignored.
pub fn tally_dominance(positions: &[PlanetPosition]) -> DominanceTally {
    let mut tally = DominanceTally::default();
    for pos in positions.iter().filter(|p| p.body.is_core()) {
        match pos.sign.element() {
            Element::Fire => tally.elements.fire += 1,
            Element::Earth => tally.elements.earth += 1,
            Element::Air => tally.elements.air += 1,
            Element::Water => tally.elements.water += 1,
        }
        match pos.sign.modality() {
            Modality::Cardinal => tally.modalities.cardinal += 1,
            Modality::Fixed => tally.modalities.fixed += 1,
            Modality::Mutable => tally.modalities.mutable += 1,
        }
    }
    tally
}
