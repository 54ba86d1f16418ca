//! Tiered resolution of the user's current location.
//!
//! The device tier is asked first; only when it definitively fails is the
//! IP-based tier consulted. There is no third tier and no retry.

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    config::DeviceConfig,
    error::{Error, Result},
    model::{Coordinates, WeatherSnapshot},
    provider::WeatherGateway,
};

pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

/// Options passed to the device tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that may be returned. Zero means "no cache".
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Device tier failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("device location is not supported")]
    Unsupported,
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// The device's own notion of where it is.
#[async_trait]
pub trait DeviceLocator: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> std::result::Result<Coordinates, PositionError>;
}

/// Coarse location derived from the public IP address.
///
/// `Ok(None)` means the service answered without usable coordinates.
#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    async fn lookup(&self) -> Result<Option<Coordinates>>;
}

/// Device tier backed by coordinates from the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocator {
    position: Option<DeviceConfig>,
}

impl ConfiguredLocator {
    pub fn new(position: Option<DeviceConfig>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl DeviceLocator for ConfiguredLocator {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> std::result::Result<Coordinates, PositionError> {
        self.position
            .map(|p| Coordinates {
                latitude: p.latitude,
                longitude: p.longitude,
            })
            .ok_or(PositionError::Unsupported)
    }
}

/// IP tier backed by an ipapi.co-compatible endpoint.
#[derive(Debug, Clone)]
pub struct IpApiLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl IpApiLocator {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn lookup(&self) -> Result<Option<Coordinates>> {
        debug!(url = %self.url, "looking up location by IP");

        let res = self.http.get(&self.url).send().await?;
        let body = res.text().await?;
        let parsed: IpApiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Parse(format!("IP lookup JSON: {e}")))?;

        Ok(usable(parsed.latitude, parsed.longitude))
    }
}

/// Missing, non-finite or zero coordinates are not usable.
fn usable(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinates> {
    let ok = |v: f64| v.is_finite() && v != 0.0;
    match (latitude, longitude) {
        (Some(lat), Some(lon)) if ok(lat) && ok(lon) => Some(Coordinates {
            latitude: lat,
            longitude: lon,
        }),
        _ => None,
    }
}

/// Two-tier resolver: device first, IP lookup as the only fallback.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    gateway: Arc<dyn WeatherGateway>,
    device: Arc<dyn DeviceLocator>,
    ip: Arc<dyn IpLocator>,
    options: PositionOptions,
}

impl LocationResolver {
    pub fn new(
        gateway: Arc<dyn WeatherGateway>,
        device: Arc<dyn DeviceLocator>,
        ip: Arc<dyn IpLocator>,
    ) -> Self {
        Self {
            gateway,
            device,
            ip,
            options: PositionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn resolve_user_location(&self) -> Result<WeatherSnapshot> {
        let device_err = match self.device_position().await {
            Ok(pos) => {
                info!(lat = pos.latitude, lon = pos.longitude, "device location acquired");
                return self
                    .gateway
                    .fetch_by_coordinates(pos.latitude, pos.longitude)
                    .await
                    .map_err(|e| Error::LocationUnavailable(format!("weather lookup failed: {e}")));
            }
            Err(err) => err,
        };

        warn!(error = %device_err, "device location failed, falling back to IP lookup");

        let pos = match self.ip.lookup().await {
            Ok(Some(pos)) => pos,
            Ok(None) => {
                return Err(Error::LocationUnavailable(format!(
                    "{device_err}; IP-based location returned no coordinates"
                )));
            }
            Err(e) => {
                return Err(Error::LocationUnavailable(format!(
                    "{device_err}; IP-based location failed: {e}"
                )));
            }
        };

        info!(lat = pos.latitude, lon = pos.longitude, "IP location acquired");
        self.gateway
            .fetch_by_coordinates(pos.latitude, pos.longitude)
            .await
            .map_err(|e| {
                Error::LocationUnavailable(format!("{device_err}; weather lookup failed: {e}"))
            })
    }

    async fn device_position(&self) -> std::result::Result<Coordinates, PositionError> {
        match tokio::time::timeout(self.options.timeout, self.device.current_position(self.options))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PositionError::Timeout),
        }
    }
}
