use std::fmt;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point-in-time weather reading for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Provider-assigned id. `None` when the provider did not send one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_mps: f64,
    #[serde(default)]
    pub wind_deg: f64,
    #[serde(default)]
    pub clouds_pct: u8,
    #[serde(default)]
    pub visibility_m: u32,
    /// Primary condition category, e.g. "Clear", "Rain", "Thunderstorm".
    pub condition: String,
    pub description: String,
    pub icon: String,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
    pub observation_time: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Id when present, display name otherwise.
    ///
    /// Two distinct places without an id that share a display name collide.
    pub fn identity_key(&self) -> IdentityKey {
        match self.id {
            Some(id) => IdentityKey::Id(id),
            None => IdentityKey::Name(self.name.clone()),
        }
    }

    /// "London, GB", or just the name when the country is unknown.
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    /// 16-point compass direction of the wind.
    pub fn wind_direction(&self) -> &'static str {
        const DIRS: [&str; 16] = [
            "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
            "NW", "NNW",
        ];
        DIRS[compass_index(self.wind_deg, 16)]
    }

    /// 8-point compass direction, used on the compact card.
    pub fn wind_direction_short(&self) -> &'static str {
        const DIRS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
        DIRS[compass_index(self.wind_deg, 8)]
    }

    pub fn wind_speed_kmh(&self) -> f64 {
        self.wind_speed_mps * 3.6
    }

    pub fn visibility_km(&self) -> f64 {
        f64::from(self.visibility_m) / 1000.0
    }

    pub fn sunrise_local(&self) -> Option<String> {
        local_time(self.sunrise)
    }

    pub fn sunset_local(&self) -> Option<String> {
        local_time(self.sunset)
    }
}

fn compass_index(deg: f64, points: usize) -> usize {
    let step = 360.0 / points as f64;
    let normalized = deg.rem_euclid(360.0);
    (normalized / step).round() as usize % points
}

fn local_time(ts: i64) -> Option<String> {
    if ts == 0 {
        return None;
    }
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
}

/// Key used to deduplicate cards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Id(u64),
    Name(String),
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Id(id) => write!(f, "{id}"),
            IdentityKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for IdentityKey {
    /// All-digit input is treated as a provider id, anything else as a name.
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<u64>() {
            Ok(id) => IdentityKey::Id(id),
            Err(_) => IdentityKey::Name(trimmed.to_string()),
        }
    }
}

/// What the user asked to look up.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    City(String),
    PostalCode(String),
    Coordinates { lat: f64, lon: f64 },
}

impl SearchQuery {
    pub fn city(name: &str) -> Result<Self> {
        non_empty(name, "city name").map(SearchQuery::City)
    }

    pub fn postal_code(code: &str) -> Result<Self> {
        non_empty(code, "postal code").map(SearchQuery::PostalCode)
    }

    pub fn coordinates(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(Error::InvalidQuery(
                "latitude and longitude are required".to_string(),
            ));
        }
        Ok(SearchQuery::Coordinates { lat, lon })
    }

    /// Human-readable search term, as announced to the user.
    pub fn term(&self) -> String {
        match self {
            SearchQuery::City(value) | SearchQuery::PostalCode(value) => value.clone(),
            SearchQuery::Coordinates { lat, lon } => format!("{lat}, {lon}"),
        }
    }
}

fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidQuery(format!("{what} is required")));
    }
    Ok(trimmed.to_string())
}

/// One 3-hour item of the provider forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    /// Provider timestamp text, "YYYY-MM-DD HH:MM:SS".
    pub dt_txt: String,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
}

/// Forecast series for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub city: String,
    pub country: String,
    pub entries: Vec<ForecastEntry>,
}

/// Per-day summary of a forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub min_c: f64,
    pub max_c: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Theme {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(Error::InvalidQuery(format!(
                "Unknown theme '{value}'. Supported themes: light, dark."
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn snapshot(id: Option<u64>, name: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            id,
            name: name.to_string(),
            country: "GB".to_string(),
            latitude: 51.5,
            longitude: -0.13,
            temperature_c: 18.0,
            feels_like_c: 17.5,
            temp_min_c: 16.0,
            temp_max_c: 20.0,
            humidity_pct: 60,
            pressure_hpa: 1012,
            wind_speed_mps: 3.0,
            wind_deg: 200.0,
            clouds_pct: 40,
            visibility_m: 10_000,
            condition: "Clouds".to_string(),
            description: "scattered clouds".to_string(),
            icon: "03d".to_string(),
            sunrise: 1_717_560_000,
            sunset: 1_717_617_600,
            observation_time: DateTime::from_timestamp(1_717_590_000, 0).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::snapshot;
    use super::*;

    #[test]
    fn identity_key_prefers_id() {
        assert_eq!(snapshot(Some(42), "London").identity_key(), IdentityKey::Id(42));
        assert_eq!(
            snapshot(None, "London").identity_key(),
            IdentityKey::Name("London".to_string())
        );
    }

    #[test]
    fn identity_key_from_cli_argument() {
        assert_eq!(IdentityKey::from("2643743"), IdentityKey::Id(2643743));
        assert_eq!(IdentityKey::from(" Paris "), IdentityKey::Name("Paris".to_string()));
    }

    #[test]
    fn wind_directions() {
        let mut s = snapshot(None, "x");
        s.wind_deg = 0.0;
        assert_eq!(s.wind_direction(), "N");
        s.wind_deg = 350.0;
        assert_eq!(s.wind_direction(), "N");
        s.wind_deg = 200.0;
        assert_eq!(s.wind_direction(), "SSW");
        assert_eq!(s.wind_direction_short(), "S");
        s.wind_deg = 90.0;
        assert_eq!(s.wind_direction_short(), "E");
    }

    #[test]
    fn search_query_requires_values() {
        assert!(matches!(SearchQuery::city("   "), Err(Error::InvalidQuery(_))));
        assert!(matches!(SearchQuery::postal_code(""), Err(Error::InvalidQuery(_))));
        assert!(matches!(
            SearchQuery::coordinates(f64::NAN, 1.0),
            Err(Error::InvalidQuery(_))
        ));
        assert_eq!(SearchQuery::city(" London ").unwrap(), SearchQuery::City("London".into()));
        assert_eq!(SearchQuery::coordinates(51.5, -0.13).unwrap().term(), "51.5, -0.13");
    }

    #[test]
    fn theme_parsing() {
        assert_eq!(Theme::try_from("Dark").unwrap(), Theme::Dark);
        assert!(Theme::try_from("solarized").is_err());
        assert_eq!(Theme::default().to_string(), "light");
    }

    #[test]
    fn snapshot_serde_keeps_missing_id_absent() {
        let s = snapshot(None, "Nowhere");
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("\"id\""));
        let back: WeatherSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
