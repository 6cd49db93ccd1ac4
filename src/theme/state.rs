//! Theme state container

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::THEME_STORAGE_KEY;

/// The two supported color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// The theme a single toggle switches to
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Accessible label for the toggle button while this theme is active
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Dark => "Switch to light mode",
            Theme::Light => "Switch to dark mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown theme: {0:?} (expected \"dark\" or \"light\")")]
pub struct ParseThemeError(String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ParseThemeError(other.to_string())),
        }
    }
}

/// Durable key/value storage the theme is persisted to
pub trait ThemeStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&mut self, key: &str, value: &str);
}

/// In-memory storage, used when nothing durable is available
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl ThemeStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Holds the active theme, mirrors it onto the document attribute and writes
/// every change through to storage.
///
/// Pages run the same lifecycle in the browser through
/// [`bootstrap_script`](super::bootstrap_script) and
/// [`toggle_script`](super::toggle_script); this type models it on the Rust side.
#[derive(Debug)]
pub struct ThemeController<S: ThemeStorage> {
    theme: Theme,
    document_theme: Option<Theme>,
    storage: S,
}

impl<S: ThemeStorage> ThemeController<S> {
    /// Initialize from storage. A missing or unrecognized stored value leaves
    /// `fallback` active and the document attribute unset.
    pub fn init(storage: S, fallback: Theme) -> Self {
        let stored = storage
            .load(THEME_STORAGE_KEY)
            .and_then(|value| match value.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::debug!("Ignoring stored theme: {}", e);
                    None
                }
            });

        Self {
            theme: stored.unwrap_or(fallback),
            document_theme: stored,
            storage,
        }
    }

    pub fn get(&self) -> Theme {
        self.theme
    }

    /// Value of the root `data-theme` attribute, if one has been applied
    pub fn document_theme(&self) -> Option<Theme> {
        self.document_theme
    }

    pub fn set(&mut self, theme: Theme) {
        self.theme = theme;
        self.document_theme = Some(theme);
        self.storage.store(THEME_STORAGE_KEY, theme.as_str());
    }

    /// Flip between dark and light, returning the new theme
    pub fn toggle(&mut self) -> Theme {
        let next = self.theme.toggled();
        self.set(next);
        next
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
