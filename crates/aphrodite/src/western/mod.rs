pub mod dominance;
pub mod houses;
pub mod signs;

pub use dominance::{tally_dominance, DominanceTally, ElementCounts, ModalityCounts};
pub use houses::resolve_house;
pub use signs::{
    longitude_to_sign_degree_minute, normalize_degrees, Element, Modality, Sign, SignDegreeMinute,
};
