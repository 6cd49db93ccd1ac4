//! Theme module - light/dark theme state and the client-side scripts that
//! apply it before first paint

mod script;
mod state;

pub use script::{bootstrap_script, toggle_script};
pub use state::{MemoryStorage, ParseThemeError, Theme, ThemeController, ThemeStorage};

/// Key under which the chosen theme is persisted in client storage
pub const THEME_STORAGE_KEY: &str = "reader-theme";

/// Root element attribute the stylesheet keys off
pub const THEME_ATTRIBUTE: &str = "data-theme";
