//! Display colors: mode selection and the user's custom palette

mod palette;

pub use palette::{ColorKey, Palette, UnknownColorKey};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::{self, keys, KeyValueStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    Custom,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Custom => "custom",
        }
    }

    /// Light and dark swap; custom goes back to light
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark | ThemeMode::Custom => ThemeMode::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode: {0} (expected light, dark or custom)")]
pub struct UnknownThemeMode(pub String);

impl FromStr for ThemeMode {
    type Err = UnknownThemeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "custom" => Ok(ThemeMode::Custom),
            other => Err(UnknownThemeMode(other.to_string())),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active mode, the palette in effect, and the editable custom palette.
///
/// `colors` is always derived: the custom palette in custom mode, the
/// built-in palette of the mode otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeState {
    mode: ThemeMode,
    colors: Palette,
    custom_colors: Palette,
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(ThemeMode::Light, Palette::light())
    }
}

impl ThemeState {
    pub fn new(mode: ThemeMode, custom_colors: Palette) -> Self {
        let mut state = Self {
            mode,
            colors: Palette::light(),
            custom_colors,
        };
        state.sync_colors();
        state
    }

    /// Restore mode and custom palette from storage.
    ///
    /// The two keys load independently. An unknown mode string is light;
    /// a missing or unreadable palette is the light palette.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mode = match storage::load_string(store, keys::THEME) {
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownThemeMode| {
                tracing::warn!(error = %e, "falling back to light theme");
                ThemeMode::Light
            }),
            None => ThemeMode::Light,
        };
        let custom_colors = storage::load_json(store, keys::CUSTOM_COLORS).unwrap_or_default();
        tracing::debug!(%mode, "loaded theme");
        Self::new(mode, custom_colors)
    }

    pub fn persist_mode(&self, store: &dyn KeyValueStore) -> bool {
        storage::save_string(store, keys::THEME, self.mode.as_str())
    }

    pub fn persist_custom_colors(&self, store: &dyn KeyValueStore) -> bool {
        storage::save_json(store, keys::CUSTOM_COLORS, &self.custom_colors)
    }

    fn sync_colors(&mut self) {
        self.colors = match self.mode {
            ThemeMode::Light => Palette::light(),
            ThemeMode::Dark => Palette::dark(),
            ThemeMode::Custom => self.custom_colors.clone(),
        };
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn colors(&self) -> &Palette {
        &self.colors
    }

    pub fn custom_colors(&self) -> &Palette {
        &self.custom_colors
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    /// Returns whether the mode changed
    pub fn set_mode(&mut self, mode: ThemeMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        self.sync_colors();
        changed
    }

    pub fn toggle_mode(&mut self) -> ThemeMode {
        self.set_mode(self.mode.toggle());
        self.mode
    }

    /// Edit one custom color. The active palette follows only in custom mode.
    pub fn set_custom_color(&mut self, key: ColorKey, value: impl Into<String>) {
        let value = value.into();
        if self.mode == ThemeMode::Custom {
            self.colors.set(key, value.clone());
        }
        self.custom_colors.set(key, value);
    }

    /// Custom palette back to the light defaults
    pub fn reset_custom_colors(&mut self) {
        self.custom_colors = Palette::light();
        if self.mode == ThemeMode::Custom {
            self.colors = self.custom_colors.clone();
        }
    }
}
