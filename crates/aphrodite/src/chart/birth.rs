use crate::ephemeris::GeoLocation;
use crate::time::{normalize_to_utc, parse_clock_time, parse_zone};
use aphrodite_config::ReferenceLocation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BirthAccuracy {
    #[default]
    Exact,
    Approximate,
}

impl BirthAccuracy {
    pub fn as_str(self) -> &'static str {
        match self {
            BirthAccuracy::Exact => "exact",
            BirthAccuracy::Approximate => "approximate",
        }
    }
}

/// Civil birth data as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthInput {
    pub date: NaiveDate,
    /// "HH:MM"; local noon when absent
    #[serde(default)]
    pub time: Option<String>,
    /// IANA zone name or raw offset such as "+08:00"; UTC when absent
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub accuracy: BirthAccuracy,
    /// Free-form caller tag; does not influence the computed chart
    #[serde(default)]
    pub label: Option<String>,
}

impl BirthInput {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: None,
            timezone: None,
            latitude: None,
            longitude: None,
            accuracy: BirthAccuracy::Exact,
            label: None,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_accuracy(mut self, accuracy: BirthAccuracy) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn utc_instant(&self) -> DateTime<Utc> {
        normalize_to_utc(self.date, self.time.as_deref(), self.timezone.as_deref())
    }

    /// Observer location, substituting `default` for missing coordinates.
    pub fn location(&self, default: ReferenceLocation) -> GeoLocation {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => GeoLocation { lat, lon },
            _ => GeoLocation {
                lat: default.lat,
                lon: default.lon,
            },
        }
    }

    /// Stable hex digest of every field that affects the computed chart.
    ///
    /// Fields are normalized first, so "08:30" and "08:30:00" or a missing
    /// location and the explicit reference location produce the same key.
    pub fn cache_key(&self, default: ReferenceLocation) -> String {
        let location = self.location(default);
        let mut fields = BTreeMap::new();
        fields.insert("accuracy", self.accuracy.as_str().to_string());
        fields.insert("date", self.date.format("%Y-%m-%d").to_string());
        fields.insert("lat", format!("{:.4}", location.lat));
        fields.insert("lon", format!("{:.4}", location.lon));
        fields.insert(
            "time",
            parse_clock_time(self.time.as_deref())
                .format("%H:%M:%S")
                .to_string(),
        );
        fields.insert("tz", parse_zone(self.timezone.as_deref()).canonical());

        let mut hasher = Sha256::new();
        for (name, value) in &fields {
            hasher.update(name.as_bytes());
            hasher.update([0x1f]);
            hasher.update(value.as_bytes());
            hasher.update([0x1e]);
        }
        hex::encode(hasher.finalize())
    }
}
