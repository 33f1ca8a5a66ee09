//! Stream cache change listener

use tokio::sync::broadcast::error::RecvError;

use super::AppController;

impl AppController {
    /// Keep the sidebar and any open stream playlist in step with the cache
    pub(crate) fn start_stream_listener(&self) {
        let mut changes = self.streams.changes();
        let controller = self.clone();
        tracing::info!("Starting stream cache listener");

        tokio::spawn(async move {
            loop {
                let change = match changes.recv().await {
                    Ok(change) => change,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Stream listener lagged, refreshing everything");
                        controller.refresh_open_playlist(None).await;
                        controller.refresh_playlists().await;
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Stream listener shutting down");
                    break;
                }

                tracing::trace!(playlist_id = ?change.playlist_id, "Stream cache changed");
                controller.refresh_open_playlist(change.playlist_id.as_deref()).await;
                controller.refresh_playlists().await;
            }
        });
    }

    /// Reload the open playlist view when `changed` names it, or when unknown
    async fn refresh_open_playlist(&self, changed: Option<&str>) {
        let Some(open) = self.model.lock().await.current_stream_playlist().await else {
            return;
        };
        if changed.is_some_and(|id| id != open) {
            return;
        }

        let entries = self.streams.entries(&open);
        self.model.lock().await.refresh_playlist_streams(&open, entries).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    use crate::config::AppConfig;
    use crate::model::{
        AppModel, ContentView, MemoryStore, PlaylistStreamCache, SettingsStore, Track, UserSettings,
    };
    use crate::services::{Services, VoiceSearch};
    use super::AppController;

    fn controller() -> AppController {
        let config = AppConfig {
            backend_url: None,
            backend_key: None,
            data_dir: std::env::temp_dir(),
            origin: "test".to_string(),
            user_id: None,
            search_limit: 5,
            stt_command: None,
        };
        let store = Arc::new(MemoryStore::new());
        let model = AppModel::new(UserSettings::default(), VoiceSearch::new(None));
        AppController::new(
            Arc::new(Mutex::new(model)),
            Services::from_config(&config).unwrap(),
            PlaylistStreamCache::with_store(store.clone()),
            SettingsStore::new(store),
        )
    }

    async fn open_entries(controller: &AppController) -> Vec<String> {
        match controller.model.lock().await.get_content_state().await.view {
            ContentView::PlaylistStreams { entries, .. } => {
                entries.into_iter().map(|entry| entry.track.id).collect()
            }
            _ => panic!("playlist view not open"),
        }
    }

    async fn wait_for<F, Fut>(mut check: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..100 {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_open_playlist_follows_cache() {
        let controller = controller();
        controller.start_background_tasks().await;
        controller.open_playlist_streams("mix").await;

        controller.streams.add_track("mix", Track::new("itunes-1", "One"));
        controller.streams.add_track("other", Track::new("itunes-2", "Two"));

        let c = &controller;
        wait_for(move || async move { open_entries(c).await == vec!["itunes-1".to_string()] }).await;

        controller.streams.remove_track("mix", "itunes-1");
        wait_for(move || async move { open_entries(c).await.is_empty() }).await;
    }

    #[tokio::test]
    async fn test_sidebar_lists_default_then_cached() {
        let controller = controller();
        controller.start_background_tasks().await;
        controller.streams.add_track("road-trip", Track::new("ytm-abc", "Road"));

        let c = &controller;
        wait_for(move || async move {
            let playlists = c.model.lock().await.get_ui_state().await.playlists;
            playlists.iter().map(|p| p.id.as_str()).collect::<Vec<_>>() == vec!["favorites", "road-trip"]
        })
        .await;
    }
}
