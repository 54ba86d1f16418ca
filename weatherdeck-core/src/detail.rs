use crate::model::{IdentityKey, WeatherSnapshot};

pub const MIN_PANEL_WIDTH: u16 = 300;
pub const MAX_PANEL_WIDTH: u16 = 600;
pub const DEFAULT_PANEL_WIDTH: u16 = 400;

/// State of the detail side panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    selected: Option<WeatherSnapshot>,
    open: bool,
    width: u16,
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self {
            selected: None,
            open: false,
            width: DEFAULT_PANEL_WIDTH,
        }
    }
}

impl DetailPanel {
    pub fn open(&mut self, snapshot: WeatherSnapshot) {
        self.selected = Some(snapshot);
        self.open = true;
    }

    pub fn close(&mut self) {
        self.selected = None;
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn selected(&self) -> Option<&WeatherSnapshot> {
        self.selected.as_ref()
    }

    /// Whether the open panel shows the card identified by `key`.
    pub fn is_showing(&self, key: &IdentityKey) -> bool {
        self.open
            && self
                .selected
                .as_ref()
                .is_some_and(|s| s.identity_key() == *key)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Out-of-range widths are ignored. Returns whether the width changed.
    pub fn resize(&mut self, width: u16) -> bool {
        if !(MIN_PANEL_WIDTH..=MAX_PANEL_WIDTH).contains(&width) {
            return false;
        }
        self.width = width;
        true
    }
}
