//! Services module - clients for everything that lives outside this process
//!
//! - `backend`: backend query/function invocation (catalog, library, lyrics,
//!   profile stats, autoplay, YouTube Music)
//! - `itunes`: public iTunes song search
//! - `lyrics`: lyrics view model (LRC parsing, active line lookup)
//! - `autoplay`: picking the next track from backend suggestions
//! - `profile`: follower/playlist counts and their display format
//! - `voice`: optional speech recognition capability

mod backend;
mod itunes;
mod lyrics;
mod autoplay;
mod profile;
mod voice;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::AppConfig;

pub use backend::BackendClient;
pub use itunes::ItunesClient;
pub use lyrics::{LyricLine, Lyrics, LyricsPayload};
pub use autoplay::AutoplayQueue;
pub use profile::{format_count, ProfileStats};
pub use voice::{
    resolve_capability, CommandRecognizer, ListenMode, RecognitionError, RecognitionEvent,
    SpeechRecognizer, VoiceSearch,
};

const USER_AGENT: &str = concat!("soundstream-rs/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("invalid response: {0}")]
    Parse(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) fn build_http_client() -> ServiceResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Turn a response into `T`, mapping non-2xx statuses to [`ServiceError::Status`]
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ServiceResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Status(status.as_u16(), body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Parse(e.to_string()))
}

/// All remote collaborators, built once at startup
#[derive(Clone)]
pub struct Services {
    backend: Option<BackendClient>,
    pub itunes: ItunesClient,
    pub user_id: Option<String>,
    pub search_limit: u32,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        let backend = match &config.backend_url {
            Some(url) => Some(BackendClient::new(url.clone(), config.backend_key.clone())?),
            None => {
                tracing::warn!("No backend URL configured, catalog features disabled");
                None
            }
        };

        Ok(Self {
            backend,
            itunes: ItunesClient::new()?,
            user_id: config.user_id.clone(),
            search_limit: config.search_limit,
        })
    }

    pub fn backend(&self) -> ServiceResult<&BackendClient> {
        self.backend.as_ref().ok_or(ServiceError::NotConfigured("backend"))
    }

    pub fn user_id(&self) -> ServiceResult<&str> {
        self.user_id.as_deref().ok_or(ServiceError::NotConfigured("user id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_without_backend() {
        let config = AppConfig {
            backend_url: None,
            backend_key: None,
            data_dir: std::env::temp_dir(),
            origin: "test".to_string(),
            user_id: None,
            search_limit: 5,
            stt_command: None,
        };
        let services = Services::from_config(&config).unwrap();

        assert!(matches!(services.backend(), Err(ServiceError::NotConfigured("backend"))));
        assert!(services.user_id().is_err());
    }
}
