//! Returns, oppositions and squares of the slow bodies to their natal places.

use crate::aspects::separation;
use crate::bodies::Body;
use crate::chart::natal::NatalChart;
use crate::transit::data::TransitData;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CYCLE_WINDOW_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleKind {
    Return,
    Opposition,
    Square,
}

impl CycleKind {
    const ALL: [CycleKind; 3] = [CycleKind::Return, CycleKind::Opposition, CycleKind::Square];

    pub fn angle(self) -> f64 {
        match self {
            CycleKind::Return => 0.0,
            CycleKind::Opposition => 180.0,
            CycleKind::Square => 90.0,
        }
    }

    /// Days either side of the peak for an exact hit.
    fn max_half_width_days(self) -> f64 {
        match self {
            CycleKind::Return => 45.0,
            CycleKind::Opposition => 30.0,
            CycleKind::Square => 21.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CycleKind::Return => "Return",
            CycleKind::Opposition => "Opposition",
            CycleKind::Square => "Square",
        }
    }

    fn classify(separation: f64, tolerance: f64) -> Option<(CycleKind, f64)> {
        Self::ALL.into_iter().find_map(|kind| {
            let orb = (separation - kind.angle()).abs();
            (orb <= tolerance).then_some((kind, orb))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleEvent {
    pub body: Body,
    pub kind: CycleKind,
    /// "Saturn Return"
    pub label: String,
    /// Orb at the tightest sampled month
    pub orb: f64,
    pub start: NaiveDate,
    pub peak: NaiveDate,
    pub end: NaiveDate,
}

struct Run {
    kind: CycleKind,
    best_index: usize,
    best_orb: f64,
}

/// Scan monthly transit samples for each slow body in turn.
///
/// Consecutive months in orb of the same relationship collapse into one event
/// peaking at the tightest month. Tighter peaks get wider windows. Events come
/// back body by body in chronological order, at most `max_events` of them.
pub fn detect_cycles(
    natal: &NatalChart,
    samples: &[TransitData],
    tolerance: f64,
    max_events: usize,
) -> Vec<CycleEvent> {
    let mut events = Vec::new();

    for body in Body::SLOW {
        let Some(natal_lon) = natal.longitude(body) else {
            continue;
        };
        let mut run: Option<Run> = None;

        for (index, sample) in samples.iter().enumerate() {
            let hit = sample
                .position(body)
                .and_then(|p| CycleKind::classify(separation(p.longitude, natal_lon), tolerance));

            if let (Some(current), Some((kind, orb))) = (run.as_mut(), hit) {
                if current.kind == kind {
                    if orb < current.best_orb {
                        current.best_index = index;
                        current.best_orb = orb;
                    }
                    continue;
                }
            }
            if let Some(done) = run.take() {
                events.push(close_run(body, done, samples, tolerance));
            }
            run = hit.map(|(kind, orb)| Run {
                kind,
                best_index: index,
                best_orb: orb,
            });
        }
        if let Some(done) = run.take() {
            events.push(close_run(body, done, samples, tolerance));
        }
    }

    events.truncate(max_events);
    events
}

fn close_run(body: Body, run: Run, samples: &[TransitData], tolerance: f64) -> CycleEvent {
    let peak = samples[run.best_index].date;
    let tightness = 1.0 - run.best_orb / (2.0 * tolerance);
    let half_width = Duration::days((run.kind.max_half_width_days() * tightness).round() as i64);
    CycleEvent {
        body,
        kind: run.kind,
        label: format!("{} {}", body, run.kind.name()),
        orb: run.best_orb,
        start: peak - half_width,
        peak,
        end: peak + half_width,
    }
}
