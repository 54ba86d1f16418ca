use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use tokio::sync::broadcast;
use weatherdeck_core::{
    CardStore, Config, ConfiguredLocator, Dashboard, FileStorage, IpApiLocator, KeyValueStorage,
    LocationResolver, MemoryStorage, SearchOutcome, SearchQuery, Theme, Toast, ToastManager,
    WeatherGateway, WeatherSnapshot, config::API_KEY_ENV, gateway_from_config,
};

use crate::render;

type Storage = Box<dyn KeyValueStorage>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdeck", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Keep cards in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key and an optional fixed device location.
    Configure,

    /// Detect your location and show all saved cards.
    Show {
        /// Skip location detection.
        #[arg(long)]
        no_detect: bool,
    },

    /// Search for a location and add it as a card.
    Search {
        #[command(subcommand)]
        by: SearchBy,
    },

    /// Show the 3-day forecast for a location.
    Forecast {
        /// City name, e.g. "London".
        location: String,
    },

    /// Remove a card by provider id or name (case-insensitive).
    Remove { key: String },

    /// Open the detailed view of a card, including tips.
    Detail {
        key: String,

        /// Panel width, between 300 and 600.
        #[arg(long)]
        width: Option<u16>,
    },

    /// Show or change the stored theme.
    Theme {
        /// "light" or "dark"; prints the current theme when absent.
        name: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SearchBy {
    /// By city name.
    City { name: String },

    /// By postal code, e.g. "94040" or "94040,us".
    Zip { code: String },

    /// By latitude and longitude.
    Coords {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

impl SearchBy {
    fn into_query(self) -> weatherdeck_core::Result<SearchQuery> {
        match self {
            SearchBy::City { name } => SearchQuery::city(&name),
            SearchBy::Zip { code } => SearchQuery::postal_code(&code),
            SearchBy::Coords { lat, lon } => SearchQuery::coordinates(lat, lon),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?.with_env_api_key(std::env::var(API_KEY_ENV).ok());

        match self.command {
            Command::Configure => configure(config),
            Command::Theme { name } => theme(&config, self.ephemeral, name.as_deref()),
            Command::Show { no_detect } => {
                Session::open(&config, self.ephemeral)?.show(no_detect).await
            }
            Command::Search { by } => Session::open(&config, self.ephemeral)?.search(by).await,
            Command::Forecast { location } => {
                Session::open(&config, self.ephemeral)?.forecast(&location).await
            }
            Command::Remove { key } => Session::open(&config, self.ephemeral)?.remove(&key),
            Command::Detail { key, width } => {
                Session::open(&config, self.ephemeral)?.detail(&key, width)
            }
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let fixed = Confirm::new("Use a fixed device location?")
        .with_default(config.device.is_some())
        .with_help_message("Without one, your location is looked up by IP address.")
        .prompt()?;

    if fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 51.51")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. -0.13")
            .prompt()?;
        config.set_device_location(latitude, longitude);
    } else {
        config.device = None;
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn storage(config: &Config, ephemeral: bool) -> anyhow::Result<Storage> {
    if ephemeral {
        return Ok(Box::new(MemoryStorage::default()));
    }
    Ok(Box::new(FileStorage::new(config.storage_file_path()?)))
}

fn theme(config: &Config, ephemeral: bool, name: Option<&str>) -> anyhow::Result<()> {
    let store = CardStore::new(storage(config, ephemeral)?);

    match name {
        Some(name) => {
            let theme = Theme::try_from(name)?;
            store.save_theme(theme)?;
            println!("Theme set to {theme}");
        }
        None => println!("{}", store.load_theme()),
    }
    Ok(())
}

/// A dashboard plus the toast feed the terminal prints.
struct Session {
    dashboard: Dashboard<Storage>,
    toasts: broadcast::Receiver<Toast>,
}

impl Session {
    fn open(config: &Config, ephemeral: bool) -> anyhow::Result<Self> {
        tracing::debug!(ephemeral, device = config.device.is_some(), "opening dashboard session");
        let gateway: Arc<dyn WeatherGateway> = Arc::new(gateway_from_config(config)?);
        let resolver = LocationResolver::new(
            gateway.clone(),
            Arc::new(ConfiguredLocator::new(config.device)),
            Arc::new(IpApiLocator::new(&config.ip_lookup_url)),
        );

        let toasts = ToastManager::new();
        let receiver = toasts.subscribe();
        let dashboard = Dashboard::new(gateway, resolver, storage(config, ephemeral)?, toasts);

        Ok(Self {
            dashboard,
            toasts: receiver,
        })
    }

    async fn show(mut self, no_detect: bool) -> anyhow::Result<()> {
        if no_detect {
            self.dashboard.initialize_without_location();
        } else {
            self.dashboard.initialize().await;
        }
        self.flush_toasts();
        render::cards(&self.dashboard.cards(), self.dashboard.theme());
        Ok(())
    }

    async fn search(mut self, by: SearchBy) -> anyhow::Result<()> {
        let query = by.into_query()?;
        let term = query.term();
        self.dashboard.initialize_without_location();
        let outcome = self.dashboard.search(query).await;
        self.flush_toasts();

        if outcome == SearchOutcome::Failed {
            bail!("Search for '{term}' failed");
        }
        Ok(())
    }

    async fn forecast(mut self, location: &str) -> anyhow::Result<()> {
        self.dashboard.initialize_without_location();
        let result = self.dashboard.forecast(location).await;
        self.flush_toasts();

        let days = result.with_context(|| format!("Forecast for '{location}' failed"))?;
        render::forecast(location, &days);
        Ok(())
    }

    /// The card `key` names, by provider id or by name.
    fn lookup(&self, key: &str) -> anyhow::Result<WeatherSnapshot> {
        self.dashboard.find_card(key).with_context(|| {
            format!("No card matches '{key}'. Run `weatherdeck show` to list cards.")
        })
    }

    fn remove(mut self, key: &str) -> anyhow::Result<()> {
        self.dashboard.initialize_without_location();
        let card = self.lookup(key)?;
        self.dashboard.delete(&card.identity_key());
        self.flush_toasts();
        Ok(())
    }

    fn detail(mut self, key: &str, width: Option<u16>) -> anyhow::Result<()> {
        self.dashboard.initialize_without_location();
        let snapshot = self.lookup(key)?;

        if let Some(width) = width {
            if !self.dashboard.resize_detail(width) {
                eprintln!("Ignoring width {width}: must be between 300 and 600");
            }
        }

        let tips = self.dashboard.open_detail(snapshot);
        self.flush_toasts();
        render::detail(&self.dashboard.detail(), &tips);
        self.dashboard.close_detail();
        Ok(())
    }

    fn flush_toasts(&mut self) {
        while let Ok(toast) = self.toasts.try_recv() {
            render::toast(&toast);
        }
    }
}
