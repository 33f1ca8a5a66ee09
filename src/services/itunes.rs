//! iTunes Search API client

use serde::Deserialize;

use crate::model::{Track, ITUNES_PREFIX};
use crate::{log_api_request, log_api_result};
use super::{build_http_client, read_json, ServiceResult};

const ITUNES_SEARCH_URL: &str = "https://itunes.apple.com/search";
const ARTWORK_SIZE: &str = "600x600";

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    #[serde(default)]
    results: Vec<ItunesSong>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesSong {
    track_id: Option<u64>,
    track_name: Option<String>,
    #[serde(default)]
    artist_id: Option<u64>,
    #[serde(default)]
    artist_name: Option<String>,
    #[serde(default)]
    collection_id: Option<u64>,
    #[serde(default)]
    collection_name: Option<String>,
    #[serde(default)]
    artwork_url100: Option<String>,
    #[serde(default)]
    preview_url: Option<String>,
    #[serde(default)]
    track_time_millis: Option<u32>,
    #[serde(default)]
    track_explicitness: Option<String>,
}

impl ItunesSong {
    /// Songs without an id or a title are dropped
    fn into_track(self) -> Option<Track> {
        let id = self.track_id?;
        let title = self.track_name?;
        Some(Track {
            id: format!("{}{}", ITUNES_PREFIX, id),
            title,
            artist_id: self.artist_id.map(|id| id.to_string()).unwrap_or_default(),
            artist_name: self.artist_name.unwrap_or_default(),
            album_id: self.collection_id.map(|id| id.to_string()),
            album_title: self.collection_name,
            album_cover: self.artwork_url100.map(|url| upscale_artwork(&url)),
            audio_url: self.preview_url,
            duration: self.track_time_millis.unwrap_or(0),
            play_count: 0,
            explicit: self.track_explicitness.as_deref() == Some("explicit"),
        })
    }
}

/// iTunes artwork URLs embed their size; ask for a larger one
fn upscale_artwork(url: &str) -> String {
    url.replace("100x100", ARTWORK_SIZE)
}

#[derive(Clone)]
pub struct ItunesClient {
    http: reqwest::Client,
}

impl ItunesClient {
    pub fn new() -> ServiceResult<Self> {
        Ok(Self { http: build_http_client()? })
    }

    pub async fn search(&self, term: &str, limit: u32) -> ServiceResult<Vec<Track>> {
        log_api_request!("itunes_search", term, limit);
        let limit = limit.to_string();
        let result = self
            .http
            .get(ITUNES_SEARCH_URL)
            .query(&[("term", term), ("entity", "song"), ("limit", limit.as_str())])
            .send()
            .await;

        let response: ServiceResult<ItunesResponse> = match result {
            Ok(response) => read_json(response).await,
            Err(e) => Err(e.into()),
        };
        log_api_result!("itunes_search", response);

        Ok(response?
            .results
            .into_iter()
            .filter_map(ItunesSong::into_track)
            .collect())
    }
}
