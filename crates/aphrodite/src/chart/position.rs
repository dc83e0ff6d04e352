use crate::bodies::Body;
use crate::western::houses::resolve_house;
use crate::western::signs::{longitude_to_sign_degree_minute, normalize_degrees, Sign};
use serde::{Deserialize, Serialize};

/// A body resolved to zodiac sign, degree, minute and house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetPosition {
    pub body: Body,
    pub sign: Sign,
    /// Whole degrees within the sign (0-29)
    pub degree: u8,
    /// Whole arc minutes (0-59)
    pub minute: u8,
    /// 1-12, absent when no house frame could be resolved
    pub house: Option<u8>,
    pub retrograde: bool,
    /// Ecliptic longitude in [0, 360)
    pub longitude: f64,
    /// Degrees per day; zero for points without motion of their own
    pub speed: f64,
}

impl PlanetPosition {
    /// Resolve a raw longitude. An empty `cusps` slice leaves the house unset.
    pub fn from_longitude(body: Body, lon: f64, speed: f64, cusps: &[f64]) -> Self {
        let longitude = normalize_degrees(lon);
        let sdm = longitude_to_sign_degree_minute(longitude);
        Self {
            body,
            sign: sdm.sign,
            degree: sdm.degree,
            minute: sdm.minute,
            house: resolve_house(longitude, cusps),
            retrograde: speed < 0.0,
            longitude,
            speed,
        }
    }

    /// Longitude rebuilt from sign, degree and minute.
    pub fn absolute_degrees(&self) -> f64 {
        self.sign.index() as f64 * 30.0 + self.degree as f64 + self.minute as f64 / 60.0
    }

    /// "15°45' Gemini"
    pub fn formatted(&self) -> String {
        format!("{}°{:02}' {}", self.degree, self.minute, self.sign)
    }
}
