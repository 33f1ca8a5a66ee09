//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `track`: Track metadata and source classification by id prefix
//! - `storage`: Per-origin key-value persistence
//! - `cache`: Local playlist stream cache with change notification
//! - `settings`: Persisted user settings
//! - `types`: Core type definitions (enums, UI state, etc.)
//! - `playback`: Now-playing state
//! - `content`: Content view data (search results, stream playlists, lyrics, profile)
//! - `app_model`: Main application model with state management methods

mod track;
mod storage;
mod cache;
mod settings;
mod types;
mod playback;
mod content;
mod app_model;

// Re-export all public types for convenient access
pub use track::{Track, TrackSource, ITUNES_PREFIX, LIBRARY_PREFIX, YOUTUBE_MUSIC_PREFIX};

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub use cache::{
    drop_track, promote_track, PlaylistStreamCache, StreamChange, StreamEntry, StreamTable,
    Subscription, PLAYLIST_STREAMS_KEY,
};

pub use settings::{SettingsStore, UserSettings, DEFAULT_PLAYLIST_ID};

pub use types::{ActiveSection, PlaylistItem, SearchSource, SelectedItem, UiState};

pub use playback::NowPlaying;

pub use content::{ContentState, ContentView, SearchResults};

pub use app_model::AppModel;
