use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{ForecastEntry, ForecastSeries, WeatherSnapshot},
};

use super::WeatherGateway;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

/// How a failed lookup is reported to the caller.
#[derive(Debug, Clone, Copy)]
enum Lookup {
    City,
    PostalCode,
    Coordinates,
    Forecast,
}

impl Lookup {
    fn failure(self, status: StatusCode, body: &str) -> Error {
        let detail = format!("status {}: {}", status, truncate_body(body));
        match self {
            Lookup::City | Lookup::Forecast => {
                Error::LocationNotFound(format!("City not found ({detail})"))
            }
            Lookup::PostalCode => Error::InvalidQuery(format!("Invalid postal code ({detail})")),
            Lookup::Coordinates => Error::InvalidQuery(format!("Invalid coordinates ({detail})")),
        }
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        lookup: Lookup,
    ) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, ?lookup, "requesting OpenWeather");

        let mut params: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        params.push(("appid", self.api_key.as_str()));
        params.push(("units", "metric"));

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(lookup.failure(status, &body));
        }

        Ok(body)
    }

    async fn fetch_current(
        &self,
        query: &[(&str, String)],
        lookup: Lookup,
    ) -> Result<WeatherSnapshot> {
        let body = self.get("weather", query, lookup).await?;

        let parsed: OwCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("OpenWeather current JSON: {e}")))?;

        Ok(parsed.into_snapshot())
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    id: u64,
    name: String,
    #[serde(default)]
    dt: i64,
    coord: Option<OwCoord>,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    #[serde(default)]
    visibility: u32,
    #[serde(default)]
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        let observation_time =
            DateTime::from_timestamp(self.dt, 0).unwrap_or_else(Utc::now);
        let (condition, description, icon) = match self.weather.into_iter().next() {
            Some(w) => (w.main, w.description, w.icon),
            None => ("Unknown".to_string(), "Unknown".to_string(), String::new()),
        };
        let (latitude, longitude) = self.coord.map(|c| (c.lat, c.lon)).unwrap_or_default();

        WeatherSnapshot {
            id: (self.id != 0).then_some(self.id),
            name: self.name,
            country: self.sys.country,
            latitude,
            longitude,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            temp_min_c: self.main.temp_min.unwrap_or(self.main.temp),
            temp_max_c: self.main.temp_max.unwrap_or(self.main.temp),
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed_mps: self.wind.speed,
            wind_deg: self.wind.deg,
            clouds_pct: self.clouds.all,
            visibility_m: self.visibility,
            condition,
            description,
            icon,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            observation_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    #[serde(default)]
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

impl OwForecastResponse {
    fn into_series(self) -> ForecastSeries {
        let entries = self
            .list
            .into_iter()
            .map(|e| {
                let (description, icon) = e
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| (w.description, w.icon))
                    .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

                ForecastEntry {
                    dt: e.dt,
                    dt_txt: e.dt_txt,
                    temperature_c: e.main.temp,
                    description,
                    icon,
                }
            })
            .collect();

        ForecastSeries {
            city: self.city.name,
            country: self.city.country,
            entries,
        }
    }
}

#[async_trait]
impl WeatherGateway for OpenWeatherProvider {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot> {
        self.fetch_current(&[("q", name.to_string())], Lookup::City)
            .await
    }

    async fn fetch_by_postal_code(&self, code: &str) -> Result<WeatherSnapshot> {
        self.fetch_current(&[("zip", code.to_string())], Lookup::PostalCode)
            .await
    }

    async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        self.fetch_current(
            &[("lat", lat.to_string()), ("lon", lon.to_string())],
            Lookup::Coordinates,
        )
        .await
    }

    async fn fetch_forecast_by_city(&self, name: &str) -> Result<ForecastSeries> {
        let body = self
            .get("forecast", &[("q", name.to_string())], Lookup::Forecast)
            .await?;

        let parsed: OwForecastResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("OpenWeather forecast JSON: {e}")))?;

        Ok(parsed.into_series())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
