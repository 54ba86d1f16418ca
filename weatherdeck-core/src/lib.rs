//! Core library for the `weatherdeck` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider gateway and the tiered location resolver
//! - Forecast aggregation and rule-based weather tips
//! - The persisted card collection, toast feed and detail panel
//! - [`Dashboard`], which wires all of the above together
//!
//! It is used by `weatherdeck-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod detail;
pub mod error;
pub mod forecast;
pub mod location;
pub mod model;
pub mod provider;
pub mod store;
pub mod tips;
pub mod toast;

pub use app::{Dashboard, Phase, SearchOutcome};
pub use config::Config;
pub use detail::DetailPanel;
pub use error::{Error, Result};
pub use forecast::summarize;
pub use location::{
    ConfiguredLocator, DeviceLocator, IpApiLocator, IpLocator, LocationResolver, PositionError,
    PositionOptions,
};
pub use model::{
    Coordinates, ForecastDay, ForecastEntry, ForecastSeries, IdentityKey, SearchQuery, Theme,
    WeatherSnapshot,
};
pub use provider::{WeatherGateway, gateway_from_config, openweather::OpenWeatherProvider};
pub use store::{CardStore, FileStorage, KeyValueStorage, MemoryStorage};
pub use tips::{Tip, TipKind, derive_tips, derive_tips_now};
pub use toast::{Toast, ToastKind, ToastManager};
