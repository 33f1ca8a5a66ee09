//! Navigation-related controller methods (search, playlists, lyrics, profile)

use crate::model::{ActiveSection, ContentView, PlaylistItem, SearchResults, SearchSource, SelectedItem, Track, UserSettings};
use crate::services::{Lyrics, ProfileStats};
use super::AppController;

impl AppController {
    /// Query every source at once; one failing source only empties its own tab
    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        let settings = {
            let model = self.model.lock().await;
            model.set_content_loading(true).await;
            model.get_settings().await
        };

        let services = &self.services;
        let limit = services.search_limit;
        let (catalog, library, itunes, youtube) = futures::join!(
            async { services.backend()?.search_tracks(query, limit).await },
            async {
                let user_id = services.user_id()?;
                services.backend()?.search_library(user_id, query, limit).await
            },
            services.itunes.search(query, limit),
            async { services.backend()?.youtube_search(query).await },
        );

        let outcomes = [
            (SearchSource::Catalog, catalog),
            (SearchSource::Library, library),
            (SearchSource::ITunes, itunes),
            (SearchSource::YouTubeMusic, youtube),
        ];

        let model = self.model.lock().await;
        let Some(mut results) = SearchResults::from_outcomes(query, outcomes) else {
            tracing::error!(query, "Search failed on every source");
            model.clear_search_results().await;
            model.set_error("Search failed".to_string()).await;
            return;
        };

        if settings.hide_explicit {
            results.remove_explicit();
        }
        results.determine_best_match(query);

        tracing::info!(
            query,
            catalog = results.catalog.len(),
            library = results.library.len(),
            itunes = results.itunes.len(),
            youtube = results.youtube.len(),
            failed = results.failed.len(),
            "Search completed"
        );

        model.set_search_results(query.to_string(), results).await;
        // Switch to MainContent section to show results
        model.set_active_section(ActiveSection::MainContent).await;
    }

    /// Rebuild the sidebar from the stream cache; the default playlist is always listed first
    pub async fn refresh_playlists(&self) {
        let default_playlist = self.model.lock().await.get_settings().await.default_playlist;

        let mut playlists = vec![PlaylistItem {
            track_count: self.streams.get_tracks(&default_playlist).len(),
            id: default_playlist.clone(),
        }];
        playlists.extend(
            self.streams
                .playlist_ids()
                .into_iter()
                .filter(|id| *id != default_playlist)
                .map(|id| PlaylistItem {
                    track_count: self.streams.get_tracks(&id).len(),
                    id,
                }),
        );

        tracing::trace!(count = playlists.len(), "Refreshed stream playlists");
        self.model.lock().await.set_playlists(playlists).await;
    }

    pub async fn open_playlist_streams(&self, playlist_id: &str) {
        tracing::debug!(playlist_id, "Opening stream playlist");
        let entries = self.streams.entries(playlist_id);

        let model = self.model.lock().await;
        model.show_playlist_streams(playlist_id.to_string(), entries).await;
        model.set_active_section(ActiveSection::MainContent).await;
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::SearchTrack { track } | SelectedItem::StreamTrack { track, .. } => {
                self.play_track(track, false).await;
            }
            SelectedItem::LyricsLine => {}
        }
    }

    /// Lyrics for the playing track, or for the selected one when nothing plays
    pub async fn show_lyrics(&self) {
        let track = {
            let model = self.model.lock().await;
            match model.get_now_playing().await.track {
                Some(track) => Some(track),
                None => model
                    .get_selected_content_item()
                    .await
                    .and_then(|item| item.track().cloned()),
            }
        };

        let Some(track) = track else {
            self.model.lock().await.set_status("Select or play a track to see lyrics").await;
            return;
        };

        self.model.lock().await.set_content_loading(true).await;

        match self.fetch_lyrics(&track).await {
            Ok(Some(lyrics)) => {
                tracing::info!(track_id = %track.id, lines = lyrics.lines.len(), synced = lyrics.synced, "Lyrics loaded");
                let model = self.model.lock().await;
                model.set_lyrics(lyrics).await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Ok(None) => {
                tracing::info!(track_id = %track.id, "No lyrics found");
                let model = self.model.lock().await;
                model.set_no_lyrics(track.title.clone(), track.artist_name.clone()).await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                tracing::error!(track_id = %track.id, error = %e, "Lyrics lookup failed");
                let model = self.model.lock().await;
                model.set_content_loading(false).await;
                model.set_error(format!("Lyrics lookup failed. {}", Self::format_error(&e))).await;
            }
        }
    }

    async fn fetch_lyrics(&self, track: &Track) -> anyhow::Result<Option<Lyrics>> {
        let payload = self
            .services
            .backend()?
            .fetch_lyrics(&track.title, &track.artist_name)
            .await?;
        Ok(payload.map(|payload| Lyrics::from_payload(&track.title, &track.artist_name, payload)))
    }

    pub async fn show_profile(&self) {
        self.model.lock().await.set_content_loading(true).await;

        let result = self.load_profile().await;

        let model = self.model.lock().await;
        match result {
            Ok((user_id, stats)) => {
                let settings = model.get_settings().await;
                model.set_profile(user_id, stats, settings).await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load profile");
                model.set_content_loading(false).await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    async fn load_profile(&self) -> anyhow::Result<(String, ProfileStats)> {
        let user_id = self.services.user_id()?;
        let stats = self.services.backend()?.profile_stats(user_id).await?;
        Ok((user_id.to_string(), stats))
    }

    /// Apply a settings change, persist it and refresh anything showing settings
    pub async fn update_settings<F>(&self, f: F)
    where
        F: FnOnce(&mut UserSettings),
    {
        let settings = self.settings_store.update(f);
        tracing::info!(?settings, "Settings updated");

        let model = self.model.lock().await;
        model.set_settings(settings.clone()).await;
        let content = model.get_content_state().await;
        if let ContentView::Profile { user_id, stats, .. } = content.view {
            model.set_profile(user_id, stats, settings).await;
        }
    }
}
