pub mod birth;
pub mod derived;
pub mod natal;
pub mod position;
pub mod sky;

pub use birth::{BirthAccuracy, BirthInput};
pub use natal::NatalChart;
pub use position::PlanetPosition;
pub use sky::{observe_sky, Sky};
