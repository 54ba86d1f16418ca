use crate::{
    Config, ForecastSeries, SearchQuery, WeatherSnapshot, error::Result,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Gateway to the remote weather API.
///
/// Each call issues exactly one request; failures surface immediately.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn fetch_by_city(&self, name: &str) -> Result<WeatherSnapshot>;

    async fn fetch_by_postal_code(&self, code: &str) -> Result<WeatherSnapshot>;

    async fn fetch_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot>;

    async fn fetch_forecast_by_city(&self, name: &str) -> Result<ForecastSeries>;

    /// Dispatch a search to the matching lookup.
    async fn fetch(&self, query: &SearchQuery) -> Result<WeatherSnapshot> {
        match query {
            SearchQuery::City(name) => self.fetch_by_city(name).await,
            SearchQuery::PostalCode(code) => self.fetch_by_postal_code(code).await,
            SearchQuery::Coordinates { lat, lon } => {
                self.fetch_by_coordinates(*lat, *lon).await
            }
        }
    }
}

/// Construct the OpenWeather gateway from config.
pub fn gateway_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weatherdeck configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    Ok(OpenWeatherProvider::new(api_key.to_owned()).with_base_url(&config.base_url))
}
