//! Persisted, deduplicated collection of weather cards.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    model::{IdentityKey, Theme, WeatherSnapshot},
};

pub const CARDS_KEY: &str = "weather_cards";
pub const THEME_KEY: &str = "theme";

/// String key-value storage for client-side state.
pub trait KeyValueStorage: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process storage, used by tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| Error::Storage(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A single JSON object on disk mapping keys to string values.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            Error::Storage(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        match serde_json::from_str(&contents) {
            Ok(values) => Ok(values),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "storage file unreadable, starting fresh"
                );
                Ok(BTreeMap::new())
            }
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(&values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {e}", self.path.display()))
        })?;

        Ok(())
    }
}

/// Ordered card collection with unique identity keys.
///
/// Every mutation writes the whole collection back to storage, including
/// when it becomes empty.
#[derive(Debug)]
pub struct CardStore<S: KeyValueStorage> {
    storage: S,
    cards: Vec<WeatherSnapshot>,
}

impl<S: KeyValueStorage> CardStore<S> {
    /// An empty store; call [`CardStore::load`] to read persisted cards.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cards: Vec::new(),
        }
    }

    /// Replace the in-memory collection with the persisted one.
    ///
    /// Missing or corrupt state degrades to an empty collection.
    pub fn load(&mut self) -> &[WeatherSnapshot] {
        self.cards = match self.read_persisted() {
            Ok(cards) => cards,
            Err(err) => {
                warn!(error = %err, "discarding persisted cards");
                Vec::new()
            }
        };
        debug!(count = self.cards.len(), "loaded cards");
        &self.cards
    }

    fn read_persisted(&self) -> Result<Vec<WeatherSnapshot>> {
        match self.storage.get(CARDS_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| Error::PersistedStateCorrupt(e.to_string())),
        }
    }

    /// Append `snapshot` unless its identity key is already present.
    pub fn add(&mut self, snapshot: WeatherSnapshot) -> Result<bool> {
        self.insert(snapshot, false)
    }

    /// Put `snapshot` at the front unless its identity key is already present.
    pub fn prepend(&mut self, snapshot: WeatherSnapshot) -> Result<bool> {
        self.insert(snapshot, true)
    }

    fn insert(&mut self, snapshot: WeatherSnapshot, front: bool) -> Result<bool> {
        if self.contains(&snapshot.identity_key()) {
            return Ok(false);
        }

        if front {
            self.cards.insert(0, snapshot);
        } else {
            self.cards.push(snapshot);
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove the card with `key`, returning it if it was present.
    pub fn remove(&mut self, key: &IdentityKey) -> Result<Option<WeatherSnapshot>> {
        let Some(pos) = self.cards.iter().position(|c| c.identity_key() == *key) else {
            return Ok(None);
        };

        let removed = self.cards.remove(pos);
        self.persist()?;
        Ok(Some(removed))
    }

    /// Write the full collection to storage.
    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.cards)?;
        self.storage.set(CARDS_KEY, &json)
    }

    pub fn cards(&self) -> &[WeatherSnapshot] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&WeatherSnapshot> {
        self.cards.iter().find(|c| c.identity_key() == *key)
    }

    /// Resolve user input to a card: a provider id first, then the name or
    /// display name, ignoring case.
    pub fn find(&self, term: &str) -> Option<&WeatherSnapshot> {
        let term = term.trim();
        if let Ok(id) = term.parse::<u64>() {
            if let Some(card) = self.cards.iter().find(|c| c.id == Some(id)) {
                return Some(card);
            }
        }

        let needle = term.to_lowercase();
        self.cards.iter().find(|c| {
            c.name.to_lowercase() == needle || c.display_name().to_lowercase() == needle
        })
    }

    /// Stored theme, falling back to the default on absent or unknown values.
    pub fn load_theme(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::try_from(raw.as_str()).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!(error = %err, "failed to read theme");
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.storage.set(THEME_KEY, theme.as_str())
    }
}
