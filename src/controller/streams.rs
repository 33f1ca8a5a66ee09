//! Stream track operations on local playlists

use crate::model::{ActiveSection, SelectedItem};
use super::AppController;

impl AppController {
    /// Playlist that `a` adds to: the one open in the content area, else the
    /// one selected in the sidebar, else the configured default
    async fn target_playlist(&self) -> String {
        let model = self.model.lock().await;
        if let Some(open) = model.current_stream_playlist().await {
            return open;
        }
        let ui_state = model.get_ui_state().await;
        if ui_state.active_section == ActiveSection::Playlists {
            if let Some(playlist) = model.get_selected_playlist().await {
                return playlist.id;
            }
        }
        model.get_settings().await.default_playlist
    }

    pub async fn add_selected_to_playlist(&self) {
        let selected = self.model.lock().await.get_selected_content_item().await;
        let Some(track) = selected.as_ref().and_then(SelectedItem::track).cloned() else {
            return;
        };

        let playlist_id = self.target_playlist().await;
        let title = track.title.clone();
        tracing::info!(playlist_id, track_id = %track.id, source = track.source().label(), "Adding stream track");

        self.streams.add_track(&playlist_id, track);
        self.model
            .lock()
            .await
            .set_status(format!("Added \"{}\" to {}", title, playlist_id))
            .await;
    }

    pub async fn remove_selected_from_playlist(&self) {
        let selected = self.model.lock().await.get_selected_content_item().await;
        let Some(SelectedItem::StreamTrack { playlist_id, track }) = selected else {
            return;
        };

        tracing::info!(playlist_id, track_id = %track.id, "Removing stream track");
        self.streams.remove_track(&playlist_id, &track.id);
        self.model
            .lock()
            .await
            .set_status(format!("Removed \"{}\" from {}", track.title, playlist_id))
            .await;
    }
}
