//! Now-playing handoff and autoplay

use anyhow::Result;

use crate::model::{Track, TrackSource};
use super::AppController;

impl AppController {
    /// Hand `track` to the player, resolving a YouTube Music stream first
    pub async fn play_track(&self, track: Track, from_autoplay: bool) {
        let audio_url = if track.source() == TrackSource::YouTubeMusic {
            match self.resolve_youtube_stream(&track).await {
                Ok(Some(url)) => Some(url),
                Ok(None) => {
                    tracing::warn!(track_id = %track.id, "No audio stream for track");
                    let model = self.model.lock().await;
                    model.set_error(format!("No stream available for \"{}\"", track.title)).await;
                    return;
                }
                Err(e) => {
                    tracing::error!(track_id = %track.id, error = %e, "Failed to resolve audio stream");
                    let model = self.model.lock().await;
                    model.set_error(Self::format_error(&e)).await;
                    return;
                }
            }
        } else {
            track.audio_url.clone()
        };

        tracing::info!(
            track_id = %track.id,
            title = %track.title,
            artist = %track.artist_name,
            source = track.source().label(),
            from_autoplay,
            "Now playing"
        );

        let status = if from_autoplay {
            format!("Autoplay: {} - {}", track.title, track.artist_name)
        } else {
            format!("Playing {} - {}", track.title, track.artist_name)
        };
        let model = self.model.lock().await;
        model.start_track(track, audio_url, from_autoplay).await;
        model.set_status(status).await;
    }

    async fn resolve_youtube_stream(&self, track: &Track) -> Result<Option<String>> {
        let video_id = TrackSource::native_id(&track.id);
        Ok(self.services.backend()?.youtube_stream_url(video_id).await?)
    }

    pub async fn toggle_playback(&self) {
        let model = self.model.lock().await;
        model.toggle_pause().await;
        let now_playing = model.get_now_playing().await;
        if now_playing.track.is_some() {
            tracing::debug!(is_playing = now_playing.is_playing, "Playback toggled");
        }
    }

    /// Skip to whatever autoplay would pick after the current track
    pub async fn next_track(&self) {
        let seed = self.model.lock().await.get_now_playing().await.track;
        match seed {
            Some(seed) => self.autoplay_after(seed).await,
            None => {
                let model = self.model.lock().await;
                model.set_status("Nothing is playing").await;
            }
        }
    }

    /// Called from the main loop; starts autoplay once the current track has run out
    pub async fn autoplay_tick(&self) {
        let finished = {
            let model = self.model.lock().await;
            if !model.get_settings().await.autoplay {
                return;
            }
            model.take_finished_track().await
        };

        if let Some(seed) = finished {
            tracing::debug!(track_id = %seed.id, "Track finished, starting autoplay");
            let controller = self.clone();
            tokio::spawn(async move {
                controller.autoplay_after(seed).await;
            });
        }
    }

    async fn autoplay_after(&self, seed: Track) {
        let (hide_explicit, pending, recent) = {
            let model = self.model.lock().await;
            let hide_explicit = model.get_settings().await.hide_explicit;
            (
                hide_explicit,
                model.take_pending_autoplay(hide_explicit).await,
                model.recently_played_ids().await,
            )
        };

        if let Some(next) = pending {
            self.play_track(next, true).await;
            return;
        }

        let suggestions = match self.fetch_suggestions(&seed, &recent).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::error!(seed_id = %seed.id, error = %e, "Autoplay suggestions failed");
                let model = self.model.lock().await;
                model.set_error(format!("Autoplay failed. {}", Self::format_error(&e))).await;
                return;
            }
        };

        let next = self
            .model
            .lock()
            .await
            .choose_autoplay(&seed, suggestions, hide_explicit)
            .await;

        match next {
            Some(next) => self.play_track(next, true).await,
            None => {
                tracing::info!(seed_id = %seed.id, "Autoplay found nothing new");
                let model = self.model.lock().await;
                model.set_status("Autoplay has nothing new to play").await;
            }
        }
    }

    async fn fetch_suggestions(&self, seed: &Track, recent: &[String]) -> Result<Vec<Track>> {
        Ok(self.services.backend()?.autoplay_suggestions(seed, recent).await?)
    }
}
