use crate::bodies::Body;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named angular relationship between two longitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Trine,
    Square,
    Sextile,
}

impl AspectKind {
    /// Exact angle for this aspect
    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Opposition => 180.0,
            AspectKind::Trine => 120.0,
            AspectKind::Square => 90.0,
            AspectKind::Sextile => 60.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Opposition => "opposition",
            AspectKind::Trine => "trine",
            AspectKind::Square => "square",
            AspectKind::Sextile => "sextile",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRule {
    pub kind: AspectKind,
    /// Maximum deviation from the exact angle, degrees
    pub orb: f64,
}

/// Aspect rules in priority order. The first rule that matches a pair wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectTable {
    pub rules: Vec<AspectRule>,
}

impl AspectTable {
    pub fn new(rules: Vec<AspectRule>) -> Self {
        Self { rules }
    }

    /// Widest orb in the table
    pub fn max_orb(&self) -> f64 {
        self.rules.iter().map(|r| r.orb).fold(0.0, f64::max)
    }

    pub fn orb_for(&self, kind: AspectKind) -> Option<f64> {
        self.rules.iter().find(|r| r.kind == kind).map(|r| r.orb)
    }
}

impl Default for AspectTable {
    /// The five major aspects, most common first.
    fn default() -> Self {
        Self::new(vec![
            AspectRule { kind: AspectKind::Conjunction, orb: 8.0 },
            AspectRule { kind: AspectKind::Opposition, orb: 8.0 },
            AspectRule { kind: AspectKind::Trine, orb: 8.0 },
            AspectRule { kind: AspectKind::Square, orb: 7.0 },
            AspectRule { kind: AspectKind::Sextile, orb: 6.0 },
        ])
    }
}

/// One detected aspect. For transit aspects `first` is the transiting body and
/// `second` the natal one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aspect {
    pub first: Body,
    pub second: Body,
    pub kind: AspectKind,
    /// Absolute deviation from the exact angle, degrees
    pub orb: f64,
    /// Whether the pair is moving toward exactness
    pub applying: bool,
}
