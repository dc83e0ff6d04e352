//! Closed catalogue of chart bodies and points.
//!
//! Every body carries its Swiss Ephemeris id (if it has one) and the mean-motion
//! parameters used by the fallback provider.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
    NorthNode,
    SouthNode,
    Lilith,
    Ceres,
    Pallas,
    Juno,
    Vesta,
    Ascendant,
    Midheaven,
    Descendant,
    ImumCoeli,
    PartOfFortune,
    Vertex,
    EastPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Planet,
    Centaur,
    Node,
    Apogee,
    Asteroid,
    Angle,
    Point,
}

/// When the fallback provider reports a body as retrograde.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetroWindow {
    Never,
    Always,
    /// Retrograde during the first `fraction` of each synodic cycle.
    Synodic { period_days: f64, fraction: f64 },
}

/// Mean orbital elements for the fallback provider. These are tuning constants
/// for a plausible sky, not an ephemeris.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanOrbit {
    /// Mean sidereal period in days. Negative for retrograde mean motion (the nodes).
    pub period_days: f64,
    /// Mean longitude at J2000.0, degrees.
    pub epoch_lon: f64,
    pub retro: RetroWindow,
}

#[derive(Debug, Clone, Copy)]
pub struct BodyMeta {
    pub body: Body,
    pub name: &'static str,
    pub kind: BodyKind,
    pub swiss_id: Option<i32>,
    pub orbit: Option<MeanOrbit>,
}

const fn orbit(period_days: f64, epoch_lon: f64, retro: RetroWindow) -> Option<MeanOrbit> {
    Some(MeanOrbit {
        period_days,
        epoch_lon,
        retro,
    })
}

const fn synodic(period_days: f64, fraction: f64) -> RetroWindow {
    RetroWindow::Synodic {
        period_days,
        fraction,
    }
}

// Indexed by `Body as usize`; order must match the enum.
const BODY_TABLE: [BodyMeta; 25] = [
    BodyMeta { body: Body::Sun, name: "Sun", kind: BodyKind::Planet, swiss_id: Some(0), orbit: orbit(365.256_363, 280.460, RetroWindow::Never) },
    BodyMeta { body: Body::Moon, name: "Moon", kind: BodyKind::Planet, swiss_id: Some(1), orbit: orbit(27.321_661, 218.316, RetroWindow::Never) },
    BodyMeta { body: Body::Mercury, name: "Mercury", kind: BodyKind::Planet, swiss_id: Some(2), orbit: orbit(87.969, 252.251, synodic(115.88, 0.19)) },
    BodyMeta { body: Body::Venus, name: "Venus", kind: BodyKind::Planet, swiss_id: Some(3), orbit: orbit(224.701, 181.980, synodic(583.92, 0.07)) },
    BodyMeta { body: Body::Mars, name: "Mars", kind: BodyKind::Planet, swiss_id: Some(4), orbit: orbit(686.980, 355.433, synodic(779.94, 0.09)) },
    BodyMeta { body: Body::Jupiter, name: "Jupiter", kind: BodyKind::Planet, swiss_id: Some(5), orbit: orbit(4_332.589, 34.351, synodic(398.88, 0.30)) },
    BodyMeta { body: Body::Saturn, name: "Saturn", kind: BodyKind::Planet, swiss_id: Some(6), orbit: orbit(10_759.22, 50.077, synodic(378.09, 0.37)) },
    BodyMeta { body: Body::Uranus, name: "Uranus", kind: BodyKind::Planet, swiss_id: Some(7), orbit: orbit(30_685.4, 314.055, synodic(369.66, 0.41)) },
    BodyMeta { body: Body::Neptune, name: "Neptune", kind: BodyKind::Planet, swiss_id: Some(8), orbit: orbit(60_189.0, 304.349, synodic(367.49, 0.43)) },
    BodyMeta { body: Body::Pluto, name: "Pluto", kind: BodyKind::Planet, swiss_id: Some(9), orbit: orbit(90_560.0, 238.929, synodic(366.73, 0.44)) },
    BodyMeta { body: Body::Chiron, name: "Chiron", kind: BodyKind::Centaur, swiss_id: Some(15), orbit: orbit(18_518.0, 251.0, synodic(368.0, 0.40)) },
    // True node from Swiss; mean node motion for the fallback.
    BodyMeta { body: Body::NorthNode, name: "North Node", kind: BodyKind::Node, swiss_id: Some(11), orbit: orbit(-6_798.38, 125.045, RetroWindow::Always) },
    BodyMeta { body: Body::SouthNode, name: "South Node", kind: BodyKind::Node, swiss_id: None, orbit: None },
    // Mean lunar apogee
    BodyMeta { body: Body::Lilith, name: "Lilith", kind: BodyKind::Apogee, swiss_id: Some(12), orbit: orbit(3_232.6, 263.353, RetroWindow::Never) },
    BodyMeta { body: Body::Ceres, name: "Ceres", kind: BodyKind::Asteroid, swiss_id: Some(17), orbit: orbit(1_681.63, 153.0, synodic(466.6, 0.20)) },
    BodyMeta { body: Body::Pallas, name: "Pallas", kind: BodyKind::Asteroid, swiss_id: Some(18), orbit: orbit(1_686.0, 221.0, synodic(466.0, 0.20)) },
    BodyMeta { body: Body::Juno, name: "Juno", kind: BodyKind::Asteroid, swiss_id: Some(19), orbit: orbit(1_594.0, 247.0, synodic(474.0, 0.18)) },
    BodyMeta { body: Body::Vesta, name: "Vesta", kind: BodyKind::Asteroid, swiss_id: Some(20), orbit: orbit(1_325.8, 196.0, synodic(504.0, 0.15)) },
    BodyMeta { body: Body::Ascendant, name: "Ascendant", kind: BodyKind::Angle, swiss_id: None, orbit: None },
    BodyMeta { body: Body::Midheaven, name: "Midheaven", kind: BodyKind::Angle, swiss_id: None, orbit: None },
    BodyMeta { body: Body::Descendant, name: "Descendant", kind: BodyKind::Angle, swiss_id: None, orbit: None },
    BodyMeta { body: Body::ImumCoeli, name: "IC", kind: BodyKind::Angle, swiss_id: None, orbit: None },
    BodyMeta { body: Body::PartOfFortune, name: "Part of Fortune", kind: BodyKind::Point, swiss_id: None, orbit: None },
    BodyMeta { body: Body::Vertex, name: "Vertex", kind: BodyKind::Point, swiss_id: None, orbit: None },
    BodyMeta { body: Body::EastPoint, name: "East Point", kind: BodyKind::Point, swiss_id: None, orbit: None },
];

impl Body {
    pub const ALL: [Body; 25] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Chiron,
        Body::NorthNode,
        Body::SouthNode,
        Body::Lilith,
        Body::Ceres,
        Body::Pallas,
        Body::Juno,
        Body::Vesta,
        Body::Ascendant,
        Body::Midheaven,
        Body::Descendant,
        Body::ImumCoeli,
        Body::PartOfFortune,
        Body::Vertex,
        Body::EastPoint,
    ];

    /// The ten bodies counted for element/modality dominance.
    pub const CORE: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Bodies scanned for returns, oppositions and squares.
    pub const SLOW: [Body; 5] = [
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    pub const PERSONAL: [Body; 3] = [Body::Mercury, Body::Venus, Body::Mars];

    pub fn meta(self) -> &'static BodyMeta {
        &BODY_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.meta().name
    }

    pub fn kind(self) -> BodyKind {
        self.meta().kind
    }

    pub fn swiss_id(self) -> Option<i32> {
        self.meta().swiss_id
    }

    pub fn mean_orbit(self) -> Option<MeanOrbit> {
        self.meta().orbit
    }

    pub fn is_core(self) -> bool {
        Self::CORE.contains(&self)
    }

    /// Bodies whose longitude comes straight from an ephemeris provider.
    pub fn is_ephemeris_body(self) -> bool {
        self.meta().orbit.is_some()
    }

    /// Points that are by construction exactly opposite another chart point.
    pub fn is_mirror(self) -> bool {
        matches!(self, Body::SouthNode | Body::Descendant | Body::ImumCoeli)
    }

    pub fn ephemeris_bodies() -> impl Iterator<Item = Body> {
        Self::ALL.into_iter().filter(|b| b.is_ephemeris_body())
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_enum_order() {
        for (i, body) in Body::ALL.iter().enumerate() {
            assert_eq!(*body as usize, i);
            assert_eq!(body.meta().body, *body, "table row {} is out of order", i);
        }
    }

    #[test]
    fn test_every_swiss_body_has_a_fallback_orbit() {
        for body in Body::ALL {
            if body.swiss_id().is_some() {
                assert!(body.mean_orbit().is_some(), "{} has no fallback", body);
            }
        }
    }

    #[test]
    fn test_body_sets() {
        assert_eq!(Body::CORE.len(), 10);
        assert!(Body::CORE.iter().all(|b| b.kind() == BodyKind::Planet));
        assert!(Body::SLOW.iter().all(|b| b.is_core()));
        assert!(!Body::Chiron.is_core());
        assert_eq!(Body::ephemeris_bodies().count(), 17);
        assert!(Body::SouthNode.is_mirror());
    }

    #[test]
    fn test_serde_tag() {
        assert_eq!(serde_json::to_string(&Body::NorthNode).unwrap(), "\"north_node\"");
        assert_eq!(Body::ImumCoeli.to_string(), "IC");
    }
}
