//! Backend client: row queries over `/rest/v1/rpc` and edge functions over `/functions/v1`

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::model::{Track, LIBRARY_PREFIX, YOUTUBE_MUSIC_PREFIX};
use crate::{log_api_request, log_api_result};
use super::lyrics::LyricsPayload;
use super::profile::ProfileStats;
use super::{build_http_client, read_json, ServiceResult};

/// A track row as the backend returns it
#[derive(Clone, Debug, Deserialize)]
pub struct TrackRow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default)]
    pub album_title: Option<String>,
    #[serde(default)]
    pub album_cover: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Milliseconds
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub play_count: Option<u64>,
    #[serde(default)]
    pub explicit: Option<bool>,
}

impl TrackRow {
    pub fn into_track(self, id_prefix: &str) -> Track {
        Track {
            id: format!("{}{}", id_prefix, self.id),
            title: self.title,
            artist_id: self.artist_id.unwrap_or_default(),
            artist_name: self.artist_name.unwrap_or_else(|| "Unknown artist".to_string()),
            album_id: self.album_id,
            album_title: self.album_title,
            album_cover: self.album_cover,
            audio_url: self.audio_url,
            duration: self.duration.unwrap_or(0),
            play_count: self.play_count.unwrap_or(0),
            explicit: self.explicit.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuggestionsResponse {
    #[serde(default)]
    tracks: Vec<TrackRow>,
}

/// One YouTube Music search hit
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeResult {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<u32>,
}

impl YouTubeResult {
    pub fn into_track(self) -> Track {
        Track {
            id: format!("{}{}", YOUTUBE_MUSIC_PREFIX, self.video_id),
            title: self.title,
            artist_id: String::new(),
            artist_name: self.artist.unwrap_or_else(|| "Unknown artist".to_string()),
            album_id: None,
            album_title: self.album,
            album_cover: self.thumbnail,
            audio_url: None, // resolved on demand via youtube_stream_url
            duration: self.duration.unwrap_or(0).saturating_mul(1000),
            play_count: 0,
            explicit: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YouTubeSearchResponse {
    #[serde(default)]
    results: Vec<YouTubeResult>,
}

#[derive(Debug, Deserialize)]
struct StreamUrlResponse {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: String, api_key: Option<String>) -> ServiceResult<Self> {
        Ok(Self {
            http: build_http_client()?,
            base_url,
            api_key,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.post(format!("{}/{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.header("apikey", key).bearer_auth(key),
            None => request,
        }
    }

    async fn rpc<B, T>(&self, name: &str, body: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self.post(&format!("rest/v1/rpc/{}", name)).json(body).send().await?;
        read_json(response).await
    }

    async fn invoke<B, T>(&self, name: &str, body: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self.post(&format!("functions/v1/{}", name)).json(body).send().await?;
        read_json(response).await
    }

    /// Full-text search over the catalog
    pub async fn search_tracks(&self, query: &str, limit: u32) -> ServiceResult<Vec<Track>> {
        log_api_request!("search_tracks", query, limit);
        let result: ServiceResult<Vec<TrackRow>> = self
            .rpc("search_tracks", &json!({ "search_query": query, "result_limit": limit }))
            .await;
        log_api_result!("search_tracks", result);
        Ok(result?.into_iter().map(|row| row.into_track("")).collect())
    }

    /// Search the tracks a user has uploaded or saved to their library
    pub async fn search_library(&self, user_id: &str, query: &str, limit: u32) -> ServiceResult<Vec<Track>> {
        log_api_request!("search_library", user_id, query, limit);
        let result: ServiceResult<Vec<TrackRow>> = self
            .rpc(
                "search_library",
                &json!({ "p_user_id": user_id, "search_query": query, "result_limit": limit }),
            )
            .await;
        log_api_result!("search_library", result);
        Ok(result?
            .into_iter()
            .map(|row| row.into_track(LIBRARY_PREFIX))
            .collect())
    }

    pub async fn fetch_lyrics(&self, title: &str, artist: &str) -> ServiceResult<Option<LyricsPayload>> {
        log_api_request!("lyrics", title, artist);
        let result: ServiceResult<LyricsPayload> = self
            .invoke("lyrics", &json!({ "title": title, "artist": artist }))
            .await;
        log_api_result!("lyrics", result);
        let payload = result?;
        Ok(if payload.is_empty() { None } else { Some(payload) })
    }

    pub async fn profile_stats(&self, user_id: &str) -> ServiceResult<ProfileStats> {
        log_api_request!("get_profile_stats", user_id);
        let result: ServiceResult<ProfileStats> = self
            .rpc("get_profile_stats", &json!({ "p_user_id": user_id }))
            .await;
        log_api_result!("get_profile_stats", result);
        result
    }

    /// Tracks the backend suggests after `seed`, skipping `exclude_ids`
    pub async fn autoplay_suggestions(&self, seed: &Track, exclude_ids: &[String]) -> ServiceResult<Vec<Track>> {
        log_api_request!("autoplay", seed_id = %seed.id, excluded = exclude_ids.len());
        let result: ServiceResult<SuggestionsResponse> = self
            .invoke(
                "autoplay",
                &json!({
                    "trackId": seed.id,
                    "title": seed.title,
                    "artistId": seed.artist_id,
                    "artistName": seed.artist_name,
                    "exclude": exclude_ids,
                }),
            )
            .await;
        log_api_result!("autoplay", result);
        Ok(result?.tracks.into_iter().map(|row| row.into_track("")).collect())
    }

    pub async fn youtube_search(&self, query: &str) -> ServiceResult<Vec<Track>> {
        log_api_request!("youtube-music", action = "search", query);
        let result: ServiceResult<YouTubeSearchResponse> = self
            .invoke("youtube-music", &json!({ "action": "search", "query": query }))
            .await;
        log_api_result!("youtube-music", result);
        Ok(result?.results.into_iter().map(YouTubeResult::into_track).collect())
    }

    pub async fn youtube_stream_url(&self, video_id: &str) -> ServiceResult<Option<String>> {
        log_api_request!("youtube-music", action = "stream", video_id);
        let result: ServiceResult<StreamUrlResponse> = self
            .invoke("youtube-music", &json!({ "action": "stream", "videoId": video_id }))
            .await;
        log_api_result!("youtube-music", result);
        Ok(result?.url.filter(|url| !url.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackSource;

    #[test]
    fn test_catalog_row_mapping() {
        let row: TrackRow = serde_json::from_value(json!({
            "id": "42",
            "title": "Song",
            "artist_id": "a1",
            "artist_name": "Band",
            "album_title": "Record",
            "duration": 215000,
            "play_count": 12,
            "explicit": true
        }))
        .unwrap();

        let track = row.into_track("");
        assert_eq!(track.id, "42");
        assert_eq!(track.source(), TrackSource::Catalog);
        assert_eq!(track.album_label(), "Record");
        assert_eq!(track.duration, 215000);
        assert!(track.explicit);
    }

    #[test]
    fn test_library_row_mapping_prefixes_id() {
        let row: TrackRow = serde_json::from_value(json!({ "id": "7", "title": "Demo" })).unwrap();
        let track = row.into_track(LIBRARY_PREFIX);
        assert_eq!(track.id, "library-7");
        assert_eq!(track.source(), TrackSource::Library);
        assert_eq!(track.artist_name, "Unknown artist");
    }

    #[test]
    fn test_youtube_result_mapping() {
        let response: YouTubeSearchResponse = serde_json::from_value(json!({
            "results": [
                { "videoId": "dQw4w9WgXcQ", "title": "Never", "artist": "Rick", "duration": 213 }
            ]
        }))
        .unwrap();

        let track = response.results.into_iter().next().unwrap().into_track();
        assert_eq!(track.id, "ytm-dQw4w9WgXcQ");
        assert_eq!(track.duration, 213_000);
        assert!(track.audio_url.is_none());
    }

    #[test]
    fn test_suggestions_tolerate_missing_field() {
        let response: SuggestionsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.tracks.is_empty());
    }

    #[test]
    fn test_client_creation() {
        assert!(BackendClient::new("https://api.example.com".into(), None).is_ok());
    }
}
