//! The dashboard orchestrator: wires gateway, resolver, store, detail panel
//! and toast feed together and turns every outcome into a toast.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tracing::{error, info, instrument, warn};

use crate::{
    detail::DetailPanel,
    error::Result,
    forecast::{DEFAULT_FORECAST_DAYS, summarize},
    location::LocationResolver,
    model::{ForecastDay, IdentityKey, SearchQuery, Theme, WeatherSnapshot},
    provider::WeatherGateway,
    store::{CardStore, KeyValueStorage},
    tips::{Tip, derive_tips_now},
    toast::ToastManager,
};

const LOCATION_TOAST: Duration = Duration::from_millis(4000);
const LOCATION_FAILED_TOAST: Duration = Duration::from_millis(5000);
const SEARCHING_TOAST: Duration = Duration::from_millis(2000);
const ADDED_TOAST: Duration = Duration::from_millis(3000);
const DUPLICATE_TOAST: Duration = Duration::from_millis(4000);
const SEARCH_FAILED_TOAST: Duration = Duration::from_millis(5000);
const FORECAST_TOAST: Duration = Duration::from_millis(3000);
const FORECAST_FAILED_TOAST: Duration = Duration::from_millis(4000);
const REMOVED_TOAST: Duration = Duration::from_millis(3000);
const DETAIL_TOAST: Duration = Duration::from_millis(2000);

pub const SEARCH_FAILED_MESSAGE: &str =
    "Could not find weather for your search. Please check the spelling and try again.";
pub const LOCATION_FAILED_MESSAGE: &str = "Unable to fetch your location. Please search manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Ready,
}

/// Result of a user search, after the toast has been emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Added(WeatherSnapshot),
    Duplicate(WeatherSnapshot),
    Failed,
}

/// Application state and the user-triggered operations on it.
///
/// All operations take `&self` and never hold a lock across an await, so
/// several searches may be in flight at once; each one completes on its own.
#[derive(Debug)]
pub struct Dashboard<S: KeyValueStorage> {
    gateway: Arc<dyn WeatherGateway>,
    resolver: LocationResolver,
    store: Mutex<CardStore<S>>,
    detail: Mutex<DetailPanel>,
    phase: Mutex<Phase>,
    toasts: ToastManager,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<S: KeyValueStorage> Dashboard<S> {
    pub fn new(
        gateway: Arc<dyn WeatherGateway>,
        resolver: LocationResolver,
        storage: S,
        toasts: ToastManager,
    ) -> Self {
        Self {
            gateway,
            resolver,
            store: Mutex::new(CardStore::new(storage)),
            detail: Mutex::new(DetailPanel::default()),
            phase: Mutex::new(Phase::Initializing),
            toasts,
        }
    }

    /// Load persisted cards, detect the user's location and become ready.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        self.load_cards();

        match self.resolver.resolve_user_location().await {
            Ok(snapshot) => {
                let name = snapshot.name.clone();
                if self.insert_card(snapshot, true) {
                    self.toasts.show_success(
                        format!("Weather loaded for your location: {name}"),
                        LOCATION_TOAST,
                    );
                } else {
                    self.toasts.show_info(
                        format!("Weather for your location ({name}) is already displayed."),
                        LOCATION_TOAST,
                    );
                }
            }
            Err(err) => {
                warn!(error = %err, "location detection failed");
                self.toasts
                    .show_warning(LOCATION_FAILED_MESSAGE, LOCATION_FAILED_TOAST);
            }
        }

        self.set_phase(Phase::Ready);
    }

    /// Load persisted cards and become ready without detecting the location.
    pub fn initialize_without_location(&self) {
        self.load_cards();
        self.set_phase(Phase::Ready);
    }

    fn load_cards(&self) {
        let count = lock(&self.store).load().len();
        info!(count, "persisted cards loaded");
    }

    fn set_phase(&self, phase: Phase) {
        *lock(&self.phase) = phase;
    }

    /// Returns false when the identity key is already present.
    fn insert_card(&self, snapshot: WeatherSnapshot, front: bool) -> bool {
        let mut store = lock(&self.store);
        let result = if front {
            store.prepend(snapshot)
        } else {
            store.add(snapshot)
        };

        match result {
            Ok(added) => added,
            Err(err) => {
                // the card is in memory even though it was not written out
                error!(error = %err, "failed to persist cards");
                true
            }
        }
    }

    #[instrument(skip(self), fields(term = %query.term()))]
    pub async fn search(&self, query: SearchQuery) -> SearchOutcome {
        self.toasts
            .show_info(format!("Searching weather for {}...", query.term()), SEARCHING_TOAST);

        let snapshot = match self.gateway.fetch(&query).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "search failed");
                self.toasts
                    .show_error(SEARCH_FAILED_MESSAGE, SEARCH_FAILED_TOAST);
                return SearchOutcome::Failed;
            }
        };

        if self.insert_card(snapshot.clone(), false) {
            self.toasts
                .show_success(format!("Weather added for {}", snapshot.name), ADDED_TOAST);
            SearchOutcome::Added(snapshot)
        } else {
            self.toasts.show_warning(
                format!("Weather for {} is already displayed.", snapshot.name),
                DUPLICATE_TOAST,
            );
            SearchOutcome::Duplicate(snapshot)
        }
    }

    /// Fetch and summarize the forecast for `location`.
    ///
    /// Failures are toasted and also returned so the caller can collapse its
    /// forecast view.
    #[instrument(skip(self))]
    pub async fn forecast(&self, location: &str) -> Result<Vec<ForecastDay>> {
        match self.gateway.fetch_forecast_by_city(location).await {
            Ok(series) => {
                let days = summarize(&series, DEFAULT_FORECAST_DAYS);
                self.toasts
                    .show_info(format!("3-day forecast loaded for {location}"), FORECAST_TOAST);
                Ok(days)
            }
            Err(err) => {
                error!(error = %err, "forecast failed");
                self.toasts.show_error(
                    format!("Unable to load forecast for {location}. Please try again."),
                    FORECAST_FAILED_TOAST,
                );
                Err(err)
            }
        }
    }

    /// Remove a card; closes the detail panel if it was showing that card.
    pub fn delete(&self, key: &IdentityKey) -> Option<WeatherSnapshot> {
        let removed = {
            let mut store = lock(&self.store);
            let found = store.get(key).cloned();
            if let Err(err) = store.remove(key) {
                error!(error = %err, "failed to persist cards");
            }
            found
        };

        let name = removed.as_ref().map_or("location", |s| s.name.as_str());
        self.toasts
            .show_info(format!("Weather card for {name} removed"), REMOVED_TOAST);

        let mut detail = lock(&self.detail);
        if detail.is_showing(key) {
            detail.close();
        }

        removed
    }

    /// Open the detail panel for `snapshot` and return its tips.
    pub fn open_detail(&self, snapshot: WeatherSnapshot) -> Vec<Tip> {
        let tips = derive_tips_now(&snapshot);
        self.toasts
            .show_info(format!("Detailed view opened for {}", snapshot.name), DETAIL_TOAST);
        lock(&self.detail).open(snapshot);
        tips
    }

    pub fn close_detail(&self) {
        lock(&self.detail).close();
    }

    pub fn resize_detail(&self, width: u16) -> bool {
        lock(&self.detail).resize(width)
    }

    pub fn detail(&self) -> DetailPanel {
        lock(&self.detail).clone()
    }

    pub fn cards(&self) -> Vec<WeatherSnapshot> {
        lock(&self.store).cards().to_vec()
    }

    pub fn card(&self, key: &IdentityKey) -> Option<WeatherSnapshot> {
        lock(&self.store).get(key).cloned()
    }

    /// Card for a user-typed id or name; see [`CardStore::find`].
    pub fn find_card(&self, term: &str) -> Option<WeatherSnapshot> {
        lock(&self.store).find(term).cloned()
    }

    pub fn theme(&self) -> Theme {
        lock(&self.store).load_theme()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        lock(&self.store).save_theme(theme)
    }

    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }
}
