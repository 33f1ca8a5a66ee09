//! Track value type shared by search results, the stream cache and autoplay

use serde::{Deserialize, Serialize};

pub const ITUNES_PREFIX: &str = "itunes-";
pub const YOUTUBE_MUSIC_PREFIX: &str = "ytm-";
pub const LIBRARY_PREFIX: &str = "library-";

/// Where a track came from, derived from its id prefix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackSource {
    Catalog,
    Library,
    ITunes,
    YouTubeMusic,
}

impl TrackSource {
    pub fn from_id(id: &str) -> Self {
        if id.starts_with(ITUNES_PREFIX) {
            Self::ITunes
        } else if id.starts_with(YOUTUBE_MUSIC_PREFIX) {
            Self::YouTubeMusic
        } else if id.starts_with(LIBRARY_PREFIX) {
            Self::Library
        } else {
            Self::Catalog
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

    /// Strip the source prefix, returning the id as the source system knows it
    pub fn native_id(id: &str) -> &str {
        [ITUNES_PREFIX, YOUTUBE_MUSIC_PREFIX, LIBRARY_PREFIX]
            .iter()
            .find_map(|prefix| id.strip_prefix(prefix))
            .unwrap_or(id)
    }
}

/// A playable track. Ids are unique across sources thanks to their prefix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist_id: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub play_count: u64,
    #[serde(default)]
    pub explicit: bool,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist_id: String::new(),
            artist_name: String::new(),
            album_id: None,
            album_title: None,
            album_cover: None,
            audio_url: None,
            duration: 0,
            play_count: 0,
            explicit: false,
        }
    }

    pub fn with_artist(mut self, artist_id: impl Into<String>, artist_name: impl Into<String>) -> Self {
        self.artist_id = artist_id.into();
        self.artist_name = artist_name.into();
        self
    }

    pub fn source(&self) -> TrackSource {
        TrackSource::from_id(&self.id)
    }

    pub fn album_label(&self) -> &str {
        self.album_title.as_deref().unwrap_or("")
    }
}
