//! Process-wide presentation theme cell.
//!
//! # Responsibility
//! - Hold the current light/dark theme for presentation consumers.
//!
//! # Invariants
//! - Engine logic never branches on the theme; it reaches render calls only
//!   inside an explicit `RenderConfig`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Presentation theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

static CURRENT_THEME: Lazy<RwLock<Theme>> = Lazy::new(|| RwLock::new(Theme::Light));

/// Returns the active theme.
pub fn current_theme() -> Theme {
    *CURRENT_THEME
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets the active theme.
pub fn set_theme(theme: Theme) {
    *CURRENT_THEME
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = theme;
}

/// Flips between light and dark, returning the new theme.
pub fn toggle_theme() -> Theme {
    let mut guard = CURRENT_THEME
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = guard.toggled();
    *guard
}
