//! Core type definitions for the application

use std::time::Instant;

use super::track::Track;

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Playlists => ActiveSection::Search,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// Where search results came from; also the tabs of the results view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SearchSource {
    #[default]
    Catalog,
    Library,
    ITunes,
    YouTubeMusic,
}

impl SearchSource {
    pub const ALL: [SearchSource; 4] = [
        SearchSource::Catalog,
        SearchSource::Library,
        SearchSource::ITunes,
        SearchSource::YouTubeMusic,
    ];

    pub fn next(self) -> Self {
        match self {
            Self::Catalog => Self::Library,
            Self::Library => Self::ITunes,
            Self::ITunes => Self::YouTubeMusic,
            Self::YouTubeMusic => Self::Catalog,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Catalog => Self::YouTubeMusic,
            Self::Library => Self::Catalog,
            Self::ITunes => Self::Library,
            Self::YouTubeMusic => Self::ITunes,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Catalog => 0,
            Self::Library => 1,
            Self::ITunes => 2,
            Self::YouTubeMusic => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::Library => "Library",
            Self::ITunes => "iTunes",
            Self::YouTubeMusic => "YouTube Music",
        }
    }
}

/// A playlist holding stream tracks (for sidebar display)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistItem {
    pub id: String,
    pub track_count: usize,
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    SearchTrack { track: Track },
    StreamTrack { playlist_id: String, track: Track },
    LyricsLine,
}

impl SelectedItem {
    pub fn track(&self) -> Option<&Track> {
        match self {
            Self::SearchTrack { track } | Self::StreamTrack { track, .. } => Some(track),
            Self::LyricsLine => None,
        }
    }
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub playlists: Vec<PlaylistItem>,
    pub playlist_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub status_message: Option<String>,
    pub show_help_popup: bool,
    pub voice_supported: bool,
    pub voice_listening: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            playlists: vec![],
            playlist_selected: 0,
            error_message: None,
            error_timestamp: None,
            status_message: None,
            show_help_popup: false,
            voice_supported: false,
            voice_listening: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_cycle() {
        let mut section = ActiveSection::Search;
        for _ in 0..3 {
            section = section.next();
        }
        assert_eq!(section, ActiveSection::Search);
        assert_eq!(ActiveSection::Search.prev(), ActiveSection::MainContent);
    }

    #[test]
    fn test_source_cycle_and_index() {
        for source in SearchSource::ALL {
            assert_eq!(source.next().prev(), source);
            assert_eq!(SearchSource::ALL[source.index()], source);
        }
    }
}
