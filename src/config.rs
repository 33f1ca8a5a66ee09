//! Runtime configuration read from the environment at startup

use std::env;
use std::path::PathBuf;

const DEFAULT_ORIGIN: &str = "soundstream.local";
const DEFAULT_SEARCH_LIMIT: u32 = 25;
const FALLBACK_DATA_DIR: &str = ".cache";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the backend service, e.g. `https://xyz.example.co`
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    pub data_dir: PathBuf,
    /// Scopes local storage, one directory per origin
    pub origin: String,
    pub user_id: Option<String>,
    pub search_limit: u32,
    /// External speech-to-text command used for voice search
    pub stt_command: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty("SOUNDSTREAM_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("soundstream")))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR));

        let search_limit = non_empty("SOUNDSTREAM_SEARCH_LIMIT")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_SEARCH_LIMIT);

        Self {
            backend_url: non_empty("SOUNDSTREAM_BACKEND_URL").map(|u| u.trim_end_matches('/').to_string()),
            backend_key: non_empty("SOUNDSTREAM_BACKEND_KEY"),
            data_dir,
            origin: non_empty("SOUNDSTREAM_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            user_id: non_empty("SOUNDSTREAM_USER_ID"),
            search_limit,
            stt_command: non_empty("SOUNDSTREAM_STT_COMMAND"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(config.backend_url.is_none());
        assert_eq!(config.origin, DEFAULT_ORIGIN);
        assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("SOUNDSTREAM_BACKEND_URL", "https://api.example.com/"),
            ("SOUNDSTREAM_DATA_DIR", "/tmp/ss"),
            ("SOUNDSTREAM_SEARCH_LIMIT", "10"),
            ("SOUNDSTREAM_USER_ID", "   "),
        ]);
        assert_eq!(config.backend_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ss"));
        assert_eq!(config.search_limit, 10);
        assert!(config.user_id.is_none());
    }

    #[test]
    fn test_invalid_limit_falls_back() {
        let config = config_from(&[("SOUNDSTREAM_SEARCH_LIMIT", "0")]);
        assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
    }
}
