use serde::{Deserialize, Serialize};

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// Raw ecliptic position of a single body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Longitude in degrees (0-360)
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Speed in longitude (degrees per day)
    pub speed_lon: f64,
}

impl RawPosition {
    pub fn retrograde(&self) -> bool {
        self.speed_lon < 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.speed_lon.is_finite()
    }
}

/// House cusps and angles for one instant and location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousePositions {
    /// House system name
    pub system: String,
    /// Twelve cusp longitudes, house 1 first
    pub cusps: Vec<f64>,
    pub ascendant: f64,
    pub midheaven: f64,
    pub vertex: f64,
    /// Equatorial ascendant
    pub east_point: f64,
}

impl HousePositions {
    pub fn is_valid(&self) -> bool {
        self.cusps.len() == 12
            && self.cusps.iter().all(|c| c.is_finite())
            && self.ascendant.is_finite()
            && self.midheaven.is_finite()
    }
}
