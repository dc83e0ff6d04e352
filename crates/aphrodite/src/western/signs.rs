//! Zodiac signs and their element/modality membership.
//!
//! Maps an ecliptic longitude to sign, whole degree and minute.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

const SIGN_ORDER: [Sign; 12] = [
    Sign::Aries,
    Sign::Taurus,
    Sign::Gemini,
    Sign::Cancer,
    Sign::Leo,
    Sign::Virgo,
    Sign::Libra,
    Sign::Scorpio,
    Sign::Sagittarius,
    Sign::Capricorn,
    Sign::Aquarius,
    Sign::Pisces,
];

impl Sign {
    pub fn from_index(index: usize) -> Sign {
        SIGN_ORDER[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }

    /// Fire, earth, air, water repeating from Aries.
    pub fn element(self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    /// Cardinal, fixed, mutable repeating from Aries.
    pub fn modality(self) -> Modality {
        match self.index() % 3 {
            0 => Modality::Cardinal,
            1 => Modality::Fixed,
            _ => Modality::Mutable,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDegreeMinute {
    pub sign: Sign,
    /// Whole degrees within the sign, 0..=29
    pub degree: u8,
    /// Whole arc-minutes, 0..=59
    pub minute: u8,
}

impl SignDegreeMinute {
    /// Longitude rebuilt from sign, degree and minute.
    pub fn to_degrees(self) -> f64 {
        self.sign.index() as f64 * 30.0 + self.degree as f64 + self.minute as f64 / 60.0
    }
}

/// Normalize any angle into [0, 360).
pub fn normalize_degrees(lon: f64) -> f64 {
    let n = lon.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if n >= 360.0 {
        0.0
    } else {
        n
    }
}

pub fn longitude_to_sign_degree_minute(lon: f64) -> SignDegreeMinute {
    let lon = normalize_degrees(lon);
    let sign_index = ((lon / 30.0).floor() as usize).min(11);
    let within = lon - sign_index as f64 * 30.0;
    let degree = (within.floor() as u8).min(29);
    let minute = (((within - degree as f64) * 60.0).floor() as u8).min(59);
    SignDegreeMinute {
        sign: Sign::from_index(sign_index),
        degree,
        minute,
    }
}
