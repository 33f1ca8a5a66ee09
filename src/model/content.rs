//! Content view state and data structures for search results, stream playlists, lyrics, profile

use super::cache::StreamEntry;
use super::settings::UserSettings;
use super::track::Track;
use super::types::SearchSource;
use crate::services::{Lyrics, ProfileStats, ServiceError};

/// Combined search results, one list per source
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub catalog: Vec<Track>,
    pub library: Vec<Track>,
    pub itunes: Vec<Track>,
    pub youtube: Vec<Track>,
    /// Sources whose request failed, with the reason
    pub failed: Vec<(SearchSource, String)>,
    pub best_match: SearchSource,
}

impl SearchResults {
    /// Merge per-source outcomes. Unconfigured sources are skipped, a failing
    /// source is recorded in `failed`, and `None` means every attempted source failed.
    pub fn from_outcomes<I>(query: &str, outcomes: I) -> Option<Self>
    where
        I: IntoIterator<Item = (SearchSource, Result<Vec<Track>, ServiceError>)>,
    {
        let mut results = Self::default();
        let mut attempted = 0;

        for (source, outcome) in outcomes {
            match outcome {
                Ok(tracks) => {
                    attempted += 1;
                    *results.tracks_mut(source) = tracks;
                }
                Err(ServiceError::NotConfigured(what)) => {
                    tracing::debug!(source = source.label(), what, "Search source disabled");
                }
                Err(e) => {
                    attempted += 1;
                    tracing::warn!(query, source = source.label(), error = %e, "Search source failed");
                    results.failed.push((source, e.to_string()));
                }
            }
        }

        if attempted > 0 && results.failed.len() == attempted {
            return None;
        }
        Some(results)
    }

    pub fn tracks(&self, source: SearchSource) -> &[Track] {
        match source {
            SearchSource::Catalog => &self.catalog,
            SearchSource::Library => &self.library,
            SearchSource::ITunes => &self.itunes,
            SearchSource::YouTubeMusic => &self.youtube,
        }
    }

    pub fn tracks_mut(&mut self, source: SearchSource) -> &mut Vec<Track> {
        match source {
            SearchSource::Catalog => &mut self.catalog,
            SearchSource::Library => &mut self.library,
            SearchSource::ITunes => &mut self.itunes,
            SearchSource::YouTubeMusic => &mut self.youtube,
        }
    }

    pub fn total(&self) -> usize {
        SearchSource::ALL.iter().map(|s| self.tracks(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn remove_explicit(&mut self) {
        for source in SearchSource::ALL {
            self.tracks_mut(source).retain(|track| !track.explicit);
        }
    }

    /// Pick the source whose top result best matches the query
    pub fn determine_best_match(&mut self, query: &str) {
        let query_lower = query.to_lowercase();

        let score = |tracks: &[Track], exact: u32| -> u32 {
            tracks
                .first()
                .map(|t| {
                    let title = t.title.to_lowercase();
                    let artist = t.artist_name.to_lowercase();
                    if title == query_lower || artist == query_lower {
                        exact
                    } else if title.starts_with(&query_lower) || artist.starts_with(&query_lower) {
                        exact - 20
                    } else if title.contains(&query_lower) || artist.contains(&query_lower) {
                        exact - 40
                    } else {
                        0
                    }
                })
                .unwrap_or(0)
        };

        // The catalog wins ties, then the user's own library, then external sources
        let scored = [
            (SearchSource::Catalog, score(&self.catalog, 100)),
            (SearchSource::Library, score(&self.library, 95)),
            (SearchSource::ITunes, score(&self.itunes, 90)),
            (SearchSource::YouTubeMusic, score(&self.youtube, 85)),
        ];

        let best = scored
            .iter()
            .filter(|(_, score)| *score > 0)
            .max_by_key(|(source, score)| (*score, std::cmp::Reverse(source.index())))
            .map(|(source, _)| *source);

        self.best_match = best.unwrap_or_else(|| {
            SearchSource::ALL
                .into_iter()
                .find(|source| !self.tracks(*source).is_empty())
                .unwrap_or_default()
        });
    }
}

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    SearchResults {
        query: String,
        results: SearchResults,
        source: SearchSource,
        /// Selected row per source, indexed by `SearchSource::index`
        indices: [usize; 4],
    },
    /// Stream tracks cached locally for one playlist
    PlaylistStreams {
        playlist_id: String,
        entries: Vec<StreamEntry>,
        selected_index: usize,
    },
    Lyrics {
        lyrics: Lyrics,
        scroll: usize,
    },
    /// Lookup succeeded but the backend had nothing for this track
    NoLyrics {
        title: String,
        artist: String,
    },
    Profile {
        user_id: String,
        stats: ProfileStats,
        settings: UserSettings,
    },
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, artist: &str) -> Track {
        Track::new(id, title).with_artist("", artist)
    }

    #[test]
    fn test_best_match_prefers_exact_title() {
        let mut results = SearchResults {
            catalog: vec![track("1", "Something Else", "Nobody")],
            itunes: vec![track("itunes-2", "Hey Jude", "The Beatles")],
            ..Default::default()
        };
        results.determine_best_match("hey jude");
        assert_eq!(results.best_match, SearchSource::ITunes);
    }

    #[test]
    fn test_best_match_catalog_wins_ties() {
        let mut results = SearchResults {
            catalog: vec![track("1", "Hey Jude (Live)", "Cover Band")],
            youtube: vec![track("ytm-x", "Hey Jude (Remastered)", "The Beatles")],
            ..Default::default()
        };
        results.determine_best_match("hey jude");
        assert_eq!(results.best_match, SearchSource::Catalog);
    }

    #[test]
    fn test_best_match_falls_back_to_first_non_empty() {
        let mut results = SearchResults {
            library: vec![track("library-1", "Unrelated", "Someone")],
            ..Default::default()
        };
        results.determine_best_match("zzz");
        assert_eq!(results.best_match, SearchSource::Library);
    }

    fn failure() -> Result<Vec<Track>, ServiceError> {
        Err(ServiceError::Status(500, "boom".to_string()))
    }

    #[test]
    fn test_outcomes_all_failed() {
        let outcomes = [
            (SearchSource::Catalog, failure()),
            (SearchSource::Library, Err(ServiceError::NotConfigured("user id"))),
            (SearchSource::ITunes, failure()),
            (SearchSource::YouTubeMusic, failure()),
        ];
        assert!(SearchResults::from_outcomes("q", outcomes).is_none());
    }

    #[test]
    fn test_outcomes_partial_failure_marks_only_that_source() {
        let outcomes = [
            (SearchSource::Catalog, failure()),
            (SearchSource::ITunes, Ok(vec![track("itunes-1", "Song", "Band")])),
            (SearchSource::YouTubeMusic, Ok(vec![])),
        ];
        let results = SearchResults::from_outcomes("q", outcomes).unwrap();

        assert_eq!(results.failed.len(), 1);
        assert_eq!(results.failed[0].0, SearchSource::Catalog);
        assert!(results.failed[0].1.contains("500"));
        assert_eq!(results.itunes.len(), 1);
        assert!(results.youtube.is_empty());
    }

    #[test]
    fn test_outcomes_unconfigured_not_attempted() {
        let outcomes = [
            (SearchSource::Catalog, Err(ServiceError::NotConfigured("backend"))),
            (SearchSource::Library, Err(ServiceError::NotConfigured("backend"))),
            (SearchSource::ITunes, Ok(vec![track("itunes-1", "Song", "Band")])),
            (SearchSource::YouTubeMusic, Err(ServiceError::NotConfigured("backend"))),
        ];
        let results = SearchResults::from_outcomes("q", outcomes).unwrap();
        assert!(results.failed.is_empty());
        assert_eq!(results.total(), 1);

        // Nothing configured at all is an empty result, not a failure
        let unconfigured = [(SearchSource::Catalog, Err(ServiceError::NotConfigured("backend")))];
        let results = SearchResults::from_outcomes("q", unconfigured).unwrap();
        assert!(results.is_empty());
        assert!(results.failed.is_empty());
    }

    #[test]
    fn test_remove_explicit() {
        let mut explicit = track("1", "A", "B");
        explicit.explicit = true;
        let mut results = SearchResults {
            catalog: vec![explicit, track("2", "C", "D")],
            ..Default::default()
        };
        results.remove_explicit();
        assert_eq!(results.total(), 1);
        assert_eq!(results.catalog[0].id, "2");
    }
}
