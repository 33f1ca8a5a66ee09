//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::cache::StreamEntry;
use super::content::{ContentState, ContentView, SearchResults};
use super::playback::NowPlaying;
use super::settings::UserSettings;
use super::track::Track;
use super::types::{ActiveSection, PlaylistItem, SelectedItem, UiState};
use crate::services::{AutoplayQueue, ListenMode, Lyrics, ProfileStats, RecognitionEvent, VoiceSearch};
use tokio::sync::mpsc;

const ERROR_DISPLAY_SECS: u64 = 5;

/// Main application model containing all state
pub struct AppModel {
    ui_state: Arc<Mutex<UiState>>,
    content_state: Arc<Mutex<ContentState>>,
    now_playing: Arc<Mutex<NowPlaying>>,
    autoplay: Arc<Mutex<AutoplayQueue>>,
    settings: Arc<Mutex<UserSettings>>,
    voice: Arc<Mutex<VoiceSearch>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(settings: UserSettings, voice: VoiceSearch) -> Self {
        let ui_state = UiState {
            voice_supported: voice.is_supported(),
            ..UiState::default()
        };
        Self {
            ui_state: Arc::new(Mutex::new(ui_state)),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            now_playing: Arc::new(Mutex::new(NowPlaying::default())),
            autoplay: Arc::new(Mutex::new(AutoplayQueue::new())),
            settings: Arc::new(Mutex::new(settings)),
            voice: Arc::new(Mutex::new(voice)),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // General
    // ========================================================================

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn get_settings(&self) -> UserSettings {
        self.settings.lock().await.clone()
    }

    pub async fn set_settings(&self, settings: UserSettings) {
        *self.settings.lock().await = settings;
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        if state.active_section == ActiveSection::Playlists && state.playlist_selected > 0 {
            state.playlist_selected -= 1;
        }
    }

    pub async fn move_selection_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.active_section == ActiveSection::Playlists
            && state.playlist_selected < state.playlists.len().saturating_sub(1)
        {
            state.playlist_selected += 1;
        }
    }

    pub async fn update_search_query(&self, query: String) {
        let mut state = self.ui_state.lock().await;
        state.search_query = query;
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    /// Replace the sidebar list, keeping the selection on the same playlist when it still exists
    pub async fn set_playlists(&self, playlists: Vec<PlaylistItem>) {
        let mut state = self.ui_state.lock().await;
        let selected_id = state.playlists.get(state.playlist_selected).map(|p| p.id.clone());
        state.playlist_selected = selected_id
            .and_then(|id| playlists.iter().position(|p| p.id == id))
            .unwrap_or(0);
        state.playlists = playlists;
    }

    pub async fn get_selected_playlist(&self) -> Option<PlaylistItem> {
        let state = self.ui_state.lock().await;
        state.playlists.get(state.playlist_selected).cloned()
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > ERROR_DISPLAY_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn set_status(&self, message: impl Into<String>) {
        let mut state = self.ui_state.lock().await;
        state.status_message = Some(message.into());
    }

    /// Begin a voice session; `None` when unsupported or already listening
    pub async fn start_voice(&self, mode: ListenMode) -> Option<mpsc::Receiver<RecognitionEvent>> {
        let events = self.voice.lock().await.start(mode)?;
        let mut state = self.ui_state.lock().await;
        state.voice_listening = true;
        state.status_message = Some("Listening...".to_string());
        Some(events)
    }

    /// Feed a recognizer event through; returns the query to search for, if any
    pub async fn apply_voice_event(&self, event: RecognitionEvent) -> Option<String> {
        let (query, listening, transcript, error) = {
            let mut voice = self.voice.lock().await;
            let query = voice.apply(event);
            (query, voice.listening, voice.transcript.clone(), voice.error.take())
        };

        let mut state = self.ui_state.lock().await;
        state.voice_listening = listening;
        state.status_message = if listening && !transcript.is_empty() {
            Some(format!("Heard: {}", transcript))
        } else {
            None
        };
        if let Some(message) = error {
            state.error_message = Some(message);
            state.error_timestamp = Some(Instant::now());
        }
        query
    }

    pub async fn show_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        let mut state = self.ui_state.lock().await;
        state.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Content State
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        let mut state = self.content_state.lock().await;
        state.is_loading = loading;
    }

    pub async fn set_search_results(&self, query: String, results: SearchResults) {
        let mut state = self.content_state.lock().await;

        state.navigation_stack.clear(); // New search starts a new history
        let source = results.best_match;
        state.view = ContentView::SearchResults {
            query,
            results,
            source,
            indices: [0; 4],
        };
        state.is_loading = false;
    }

    /// Drop any previous results, used when a search fails
    pub async fn clear_search_results(&self) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Empty;
        state.is_loading = false;
    }

    fn push_view(state: &mut ContentState, view: ContentView) {
        if !matches!(state.view, ContentView::Empty) {
            let previous_view = std::mem::take(&mut state.view);
            state.navigation_stack.push(previous_view);
        }
        state.view = view;
        state.is_loading = false;
    }

    pub async fn show_playlist_streams(&self, playlist_id: String, entries: Vec<StreamEntry>) {
        let mut state = self.content_state.lock().await;
        // Re-opening the playlist already on screen refreshes it in place
        if let ContentView::PlaylistStreams { playlist_id: current, .. } = &state.view {
            if *current == playlist_id {
                state.view = ContentView::PlaylistStreams { playlist_id, entries, selected_index: 0 };
                state.is_loading = false;
                return;
            }
        }
        Self::push_view(&mut state, ContentView::PlaylistStreams { playlist_id, entries, selected_index: 0 });
    }

    /// Refresh the stream list if `playlist_id` is the one on screen
    pub async fn refresh_playlist_streams(&self, playlist_id: &str, new_entries: Vec<StreamEntry>) -> bool {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::PlaylistStreams { playlist_id: current, entries, selected_index } if *current == playlist_id => {
                *entries = new_entries;
                *selected_index = (*selected_index).min(entries.len().saturating_sub(1));
                true
            }
            _ => false,
        }
    }

    pub async fn current_stream_playlist(&self) -> Option<String> {
        match &self.content_state.lock().await.view {
            ContentView::PlaylistStreams { playlist_id, .. } => Some(playlist_id.clone()),
            _ => None,
        }
    }

    pub async fn set_lyrics(&self, lyrics: Lyrics) {
        let mut state = self.content_state.lock().await;
        Self::push_view(&mut state, ContentView::Lyrics { lyrics, scroll: 0 });
    }

    pub async fn set_no_lyrics(&self, title: String, artist: String) {
        let mut state = self.content_state.lock().await;
        Self::push_view(&mut state, ContentView::NoLyrics { title, artist });
    }

    pub async fn set_profile(&self, user_id: String, stats: ProfileStats, settings: UserSettings) {
        let mut state = self.content_state.lock().await;
        if let ContentView::Profile { .. } = state.view {
            state.view = ContentView::Profile { user_id, stats, settings };
            state.is_loading = false;
            return;
        }
        Self::push_view(&mut state, ContentView::Profile { user_id, stats, settings });
    }

    pub async fn navigate_back(&self) {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::SearchResults { source, indices, .. } => {
                let index = &mut indices[source.index()];
                *index = index.saturating_sub(1);
            }
            ContentView::PlaylistStreams { selected_index, .. } => {
                *selected_index = selected_index.saturating_sub(1);
            }
            ContentView::Lyrics { scroll, .. } => {
                *scroll = scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub async fn content_move_down(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::SearchResults { results, source, indices, .. } => {
                let len = results.tracks(*source).len();
                let index = &mut indices[source.index()];
                if *index < len.saturating_sub(1) {
                    *index += 1;
                }
            }
            ContentView::PlaylistStreams { entries, selected_index, .. } => {
                if *selected_index < entries.len().saturating_sub(1) {
                    *selected_index += 1;
                }
            }
            ContentView::Lyrics { lyrics, scroll } => {
                if *scroll < lyrics.lines.len().saturating_sub(1) {
                    *scroll += 1;
                }
            }
            _ => {}
        }
    }

    pub async fn navigate_search_source(&self, forward: bool) {
        let mut state = self.content_state.lock().await;
        if let ContentView::SearchResults { source, .. } = &mut state.view {
            *source = if forward { source.next() } else { source.prev() };
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::SearchResults { results, source, indices, .. } => results
                .tracks(*source)
                .get(indices[source.index()])
                .map(|track| SelectedItem::SearchTrack { track: track.clone() }),
            ContentView::PlaylistStreams { playlist_id, entries, selected_index } => {
                entries.get(*selected_index).map(|entry| SelectedItem::StreamTrack {
                    playlist_id: playlist_id.clone(),
                    track: entry.track.clone(),
                })
            }
            ContentView::Lyrics { .. } => Some(SelectedItem::LyricsLine),
            _ => None,
        }
    }

    // ========================================================================
    // Now Playing & Autoplay
    // ========================================================================

    pub async fn get_now_playing(&self) -> NowPlaying {
        self.now_playing.lock().await.clone()
    }

    pub async fn start_track(&self, track: Track, audio_url: Option<String>, from_autoplay: bool) {
        self.autoplay.lock().await.record_played(&track.id);
        *self.now_playing.lock().await = NowPlaying::start(track, audio_url, from_autoplay);
    }

    pub async fn toggle_pause(&self) {
        self.now_playing.lock().await.toggle_pause();
    }

    /// The track that just ran out, at most once per play
    pub async fn take_finished_track(&self) -> Option<Track> {
        let mut now_playing = self.now_playing.lock().await;
        if !now_playing.has_finished() {
            return None;
        }
        now_playing.is_playing = false;
        now_playing.track.clone()
    }

    pub async fn recently_played_ids(&self) -> Vec<String> {
        self.autoplay.lock().await.recent_ids()
    }

    pub async fn take_pending_autoplay(&self, hide_explicit: bool) -> Option<Track> {
        self.autoplay.lock().await.take_pending(hide_explicit)
    }

    pub async fn choose_autoplay(&self, seed: &Track, suggestions: Vec<Track>, hide_explicit: bool) -> Option<Track> {
        self.autoplay.lock().await.next_from(seed, suggestions, hide_explicit)
    }
}
