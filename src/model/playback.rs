//! Now-playing state
//!
//! Audio output is handled outside this client; here we only track which
//! track was handed off and estimate its position for lyrics and autoplay.

use std::time::Instant;

use super::track::Track;

#[derive(Clone, Debug, Default)]
pub struct NowPlaying {
    pub track: Option<Track>,
    /// Resolved audio locator, if the source needed resolving
    pub audio_url: Option<String>,
    position_ms: u32,
    last_update: Option<Instant>,
    pub is_playing: bool,
    /// Set by autoplay rather than by the user
    pub from_autoplay: bool,
}

impl NowPlaying {
    pub fn start(track: Track, audio_url: Option<String>, from_autoplay: bool) -> Self {
        Self {
            track: Some(track),
            audio_url,
            position_ms: 0,
            last_update: Some(Instant::now()),
            is_playing: true,
            from_autoplay,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.track.as_ref().map(|t| t.duration).unwrap_or(0)
    }

    /// Interpolated position, clamped to the track length
    pub fn position_ms(&self) -> u32 {
        self.position_at(Instant::now())
    }

    fn position_at(&self, now: Instant) -> u32 {
        let mut position = self.position_ms;
        if self.is_playing {
            if let Some(last) = self.last_update {
                let elapsed = now.saturating_duration_since(last).as_millis() as u32;
                position = position.saturating_add(elapsed);
            }
        }
        match self.duration_ms() {
            0 => position,
            duration => position.min(duration),
        }
    }

    pub fn toggle_pause(&mut self) {
        self.position_ms = self.position_ms();
        self.last_update = Some(Instant::now());
        self.is_playing = !self.is_playing;
    }

    /// True once a playing track has run its full length
    pub fn has_finished(&self) -> bool {
        self.has_finished_at(Instant::now())
    }

    fn has_finished_at(&self, now: Instant) -> bool {
        let duration = self.duration_ms();
        self.is_playing && duration > 0 && self.position_at(now) >= duration
    }
}
