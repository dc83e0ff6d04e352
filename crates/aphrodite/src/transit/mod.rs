pub mod cycles;
pub mod data;

pub use cycles::{detect_cycles, CycleEvent, CycleKind, DEFAULT_CYCLE_WINDOW_MONTHS};
pub use data::{MoonPhase, TransitData};
