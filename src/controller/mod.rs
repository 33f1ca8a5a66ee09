//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model, the services and the view.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Search, playlists, lyrics and profile views
//! - `streams`: Adding and removing stream tracks in local playlists
//! - `playback`: Now-playing handoff and autoplay
//! - `voice`: Voice search sessions
//! - `stream_events`: Stream cache change listener

mod input;
mod navigation;
mod streams;
mod playback;
mod voice;
mod stream_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{AppModel, PlaylistStreamCache, SettingsStore};
use crate::services::{ServiceError, Services};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) services: Services,
    pub(crate) streams: PlaylistStreamCache,
    pub(crate) settings_store: SettingsStore,
    stream_listener_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        services: Services,
        streams: PlaylistStreamCache,
        settings_store: SettingsStore,
    ) -> Self {
        Self {
            model,
            services,
            streams,
            settings_store,
            stream_listener_started: Arc::new(Mutex::new(false)),
        }
    }

    /// Start the stream cache listener unless it is already running
    pub async fn start_background_tasks(&self) {
        let mut started = self.stream_listener_started.lock().await;
        if *started {
            return;
        }
        *started = true;
        drop(started);
        self.start_stream_listener();
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        match error.downcast_ref::<ServiceError>() {
            Some(ServiceError::Status(401 | 403, _)) => {
                "Not authorized. Check SOUNDSTREAM_BACKEND_KEY.".to_string()
            }
            Some(ServiceError::Status(404, _)) => "Backend function not found.".to_string(),
            Some(ServiceError::Status(429, _)) => "Rate limited. Please wait a moment.".to_string(),
            Some(ServiceError::Network(_)) => "Network error. Check your connection.".to_string(),
            Some(ServiceError::NotConfigured(what)) => format!("No {} configured.", what),
            _ => format!("Error: {}", error),
        }
    }
}
