//! User settings, persisted best-effort next to the stream cache

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::storage::{KeyValueStore, StorageError};

pub const USER_SETTINGS_KEY: &str = "userSettings";
pub const DEFAULT_PLAYLIST_ID: &str = "favorites";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub autoplay: bool,
    pub hide_explicit: bool,
    pub continuous_voice: bool,
    pub show_lyrics: bool,
    /// Playlist that receives stream tracks when nothing is selected in the sidebar
    pub default_playlist: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            autoplay: true,
            hide_explicit: false,
            continuous_voice: false,
            show_lyrics: true,
            default_playlist: DEFAULT_PLAYLIST_ID.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored settings, or defaults when missing or unreadable
    pub fn load(&self) -> UserSettings {
        match self.store.get(USER_SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Corrupt user settings, using defaults");
                UserSettings::default()
            }),
            Ok(None) => UserSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read user settings");
                UserSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &UserSettings) {
        let result = serde_json::to_string(settings)
            .map_err(StorageError::from)
            .and_then(|raw| self.store.set(USER_SETTINGS_KEY, &raw));
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist user settings");
        }
    }

    /// Load, modify, save. Returns the settings as modified.
    pub fn update<F>(&self, f: F) -> UserSettings
    where
        F: FnOnce(&mut UserSettings),
    {
        let mut settings = self.load();
        f(&mut settings);
        self.save(&settings);
        settings
    }
}
