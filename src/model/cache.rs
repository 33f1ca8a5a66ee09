//! Local cache of stream tracks per playlist
//!
//! Stream tracks come from outside the catalog (library, iTunes, YouTube Music)
//! and are kept on this machine against a playlist instead of being saved by
//! the backend. The cache is best-effort: storage failures are logged and
//! degrade to an empty table, they never reach the caller.
//!
//! Per playlist the list is ordered most-recently-added first and holds at
//! most one entry per track id. Adding a track that is already present moves
//! it to the front.
//!
//! Every mutation reads the whole table, applies a pure transform, writes the
//! whole table back and then notifies subscribers, all under one lock.
//! Subscriber callbacks run while that lock is held: a callback that calls
//! [`PlaylistStreamCache::add_track`] or [`PlaylistStreamCache::remove_track`]
//! deadlocks. Reading from a callback is fine.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::storage::{FileStore, KeyValueStore, StorageError};
use super::track::Track;

pub const PLAYLIST_STREAMS_KEY: &str = "playlistStreams";
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A track together with the time it was added to the playlist
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEntry {
    pub track: Track,
    pub added_at: DateTime<Utc>,
}

/// Playlist id to entries, most recent first
pub type StreamTable = BTreeMap<String, Vec<StreamEntry>>;

/// Broadcast after every add/remove
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamChange {
    pub playlist_id: Option<String>,
}

type Callback = Arc<dyn Fn(Option<&str>) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Handle returned by [`PlaylistStreamCache::subscribe`]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Deregister the callback. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            let mut subscribers = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
            subscribers.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

#[derive(Clone)]
pub struct PlaylistStreamCache {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
    subscribers: Arc<Mutex<Subscribers>>,
    changes: broadcast::Sender<StreamChange>,
}

impl PlaylistStreamCache {
    /// Open the file-backed cache for `origin` under `data_dir`
    pub fn init(data_dir: &Path, origin: &str) -> Result<Self, StorageError> {
        let store = FileStore::init(data_dir, origin)?;
        Ok(Self::with_store(Arc::new(store)))
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            changes,
        }
    }

    /// Tracks for `playlist_id`, most recent first. Empty when unknown or unreadable.
    pub fn get_tracks(&self, playlist_id: &str) -> Vec<Track> {
        self.entries(playlist_id)
            .into_iter()
            .map(|entry| entry.track)
            .collect()
    }

    pub fn entries(&self, playlist_id: &str) -> Vec<StreamEntry> {
        self.load_table().remove(playlist_id).unwrap_or_default()
    }

    /// Playlists that currently hold at least one stream track
    pub fn playlist_ids(&self) -> Vec<String> {
        self.load_table()
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn add_track(&self, playlist_id: &str, track: Track) {
        tracing::debug!(playlist_id, track_id = %track.id, "Adding stream track");
        let added_at = Utc::now();
        self.transact(Some(playlist_id), |table| {
            Some(promote_track(table, playlist_id, track, added_at))
        });
    }

    pub fn remove_track(&self, playlist_id: &str, track_id: &str) {
        tracing::debug!(playlist_id, track_id, "Removing stream track");
        self.transact(Some(playlist_id), |table| drop_track(table, playlist_id, track_id));
    }

    /// Register `callback`, invoked once per add/remove with the affected playlist id
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&str>) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(callback)));
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Async view of the same notifications
    pub fn changes(&self) -> broadcast::Receiver<StreamChange> {
        self.changes.subscribe()
    }

    /// Read the full table, apply `transform`, write the full table, notify.
    ///
    /// `transform` returning `None` skips the write. Subscribers are notified
    /// either way.
    pub fn transact<F>(&self, playlist_id: Option<&str>, transform: F)
    where
        F: FnOnce(StreamTable) -> Option<StreamTable>,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(updated) = transform(self.load_table()) {
            if let Err(e) = self.save_table(&updated) {
                tracing::warn!(playlist_id = ?playlist_id, error = %e, "Failed to persist playlist streams");
            }
        }

        self.notify(playlist_id);
    }

    fn load_table(&self) -> StreamTable {
        match self.store.get(PLAYLIST_STREAMS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!(error = %e, "Corrupt playlist streams, treating as empty");
                    StreamTable::new()
                }
            },
            Ok(None) => StreamTable::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read playlist streams");
                StreamTable::new()
            }
        }
    }

    fn save_table(&self, table: &StreamTable) -> Result<(), StorageError> {
        let raw = serde_json::to_string(table)?;
        self.store.set(PLAYLIST_STREAMS_KEY, &raw)
    }

    fn notify(&self, playlist_id: Option<&str>) {
        let callbacks: Vec<Callback> = {
            let subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
            subscribers.entries.iter().map(|(_, cb)| cb.clone()).collect()
        };

        for callback in callbacks {
            callback(playlist_id);
        }

        // No receivers is fine
        let _ = self.changes.send(StreamChange {
            playlist_id: playlist_id.map(str::to_string),
        });
    }
}

/// Put `track` at the front of `playlist_id`, dropping any earlier entry with the same id
pub fn promote_track(
    mut table: StreamTable,
    playlist_id: &str,
    track: Track,
    added_at: DateTime<Utc>,
) -> StreamTable {
    let entries = table.entry(playlist_id.to_string()).or_default();
    entries.retain(|entry| entry.track.id != track.id);
    entries.insert(0, StreamEntry { track, added_at });
    table
}

/// Remove `track_id` from `playlist_id`. `None` when the playlist has no entries.
pub fn drop_track(mut table: StreamTable, playlist_id: &str, track_id: &str) -> Option<StreamTable> {
    let entries = table.get_mut(playlist_id).filter(|entries| !entries.is_empty())?;
    entries.retain(|entry| entry.track.id != track_id);
    if entries.is_empty() {
        table.remove(playlist_id);
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct UnreadableStore;

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("storage disabled".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    fn track(id: &str) -> Track {
        Track::new(id, format!("Track {}", id))
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    fn memory_cache() -> (Arc<MemoryStore>, PlaylistStreamCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = PlaylistStreamCache::with_store(store.clone());
        (store, cache)
    }

    #[test]
    fn test_unknown_playlist_is_empty() {
        let (_store, cache) = memory_cache();
        assert!(cache.get_tracks("never-seen").is_empty());
    }

    #[test]
    fn test_reverse_insertion_order() {
        let (_store, cache) = memory_cache();
        for id in ["a", "b", "c", "d"] {
            cache.add_track("p1", track(id));
        }
        assert_eq!(ids(&cache.get_tracks("p1")), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_readd_promotes_without_duplicate() {
        let (_store, cache) = memory_cache();
        cache.add_track("p1", track("a"));
        cache.add_track("p1", track("b"));
        cache.add_track("p1", track("a"));
        assert_eq!(ids(&cache.get_tracks("p1")), vec!["a", "b"]);
    }

    #[test]
    fn test_readd_keeps_newest_timestamp() {
        let earlier = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2024-06-01T12:30:00Z").unwrap().with_timezone(&Utc);

        let table = promote_track(StreamTable::new(), "p1", track("a"), earlier);
        let table = promote_track(table, "p1", track("a"), later);

        let entries = &table["p1"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].added_at, later);
    }

    #[test]
    fn test_playlists_are_independent() {
        let (_store, cache) = memory_cache();
        cache.add_track("p1", track("a"));
        cache.add_track("p2", track("a"));
        cache.remove_track("p1", "a");

        assert!(cache.get_tracks("p1").is_empty());
        assert_eq!(ids(&cache.get_tracks("p2")), vec!["a"]);
        assert_eq!(cache.playlist_ids(), vec!["p2".to_string()]);
    }

    #[test]
    fn test_remove_absent_track_leaves_table_unchanged() {
        let (store, cache) = memory_cache();
        cache.add_track("p1", track("a"));
        cache.add_track("p1", track("b"));
        let before = store.get(PLAYLIST_STREAMS_KEY).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_callback = seen.clone();
        let _subscription = cache.subscribe(move |id| {
            seen_by_callback.lock().unwrap().push(id.map(str::to_string));
        });

        cache.remove_track("p1", "zzz");

        assert_eq!(store.get(PLAYLIST_STREAMS_KEY).unwrap(), before);
        assert_eq!(ids(&cache.get_tracks("p1")), vec!["b", "a"]);
        assert_eq!(*seen.lock().unwrap(), vec![Some("p1".to_string())]);
    }

    #[test]
    fn test_remove_from_empty_playlist_skips_write() {
        let table = StreamTable::new();
        assert!(drop_track(table, "p1", "a").is_none());

        let (store, cache) = memory_cache();
        cache.remove_track("p1", "a");
        assert!(store.get(PLAYLIST_STREAMS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_returned_tracks_are_detached() {
        let (_store, cache) = memory_cache();
        cache.add_track("p1", track("a"));

        let mut tracks = cache.get_tracks("p1");
        tracks[0].title = "changed".to_string();
        tracks.clear();

        assert_eq!(cache.get_tracks("p1")[0].title, "Track a");
    }

    #[test]
    fn test_survives_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let cache = PlaylistStreamCache::init(temp_dir.path(), "http://localhost").unwrap();
            cache.add_track("p1", track("a"));
        }

        let reloaded = PlaylistStreamCache::init(temp_dir.path(), "http://localhost").unwrap();
        assert_eq!(ids(&reloaded.get_tracks("p1")), vec!["a"]);
    }

    #[test]
    fn test_storage_layout() {
        let (store, cache) = memory_cache();
        cache.add_track("p1", track("a"));

        let raw = store.get(PLAYLIST_STREAMS_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["p1"][0]["track"]["id"], "a");
        let added_at = json["p1"][0]["addedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(added_at).is_ok());
    }

    #[test]
    fn test_unreadable_storage_reads_empty() {
        let cache = PlaylistStreamCache::with_store(Arc::new(UnreadableStore));
        assert!(cache.get_tracks("p1").is_empty());
        assert!(cache.playlist_ids().is_empty());
    }

    #[test]
    fn test_corrupt_storage_reads_empty() {
        let (store, cache) = memory_cache();
        store.set(PLAYLIST_STREAMS_KEY, "{not json").unwrap();
        assert!(cache.get_tracks("p1").is_empty());

        cache.add_track("p1", track("a"));
        assert_eq!(ids(&cache.get_tracks("p1")), vec!["a"]);
    }

    #[test]
    fn test_write_failure_still_notifies() {
        let cache = PlaylistStreamCache::with_store(Arc::new(UnreadableStore));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _subscription = cache.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cache.add_track("p1", track("a"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_one_notification_per_call_then_none_after_unsubscribe() {
        let (_store, cache) = memory_cache();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_callback = seen.clone();
        let subscription = cache.subscribe(move |id| {
            seen_by_callback.lock().unwrap().push(id.map(str::to_string));
        });

        cache.add_track("p1", track("a"));
        cache.remove_track("p2", "a");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("p1".to_string()), Some("p2".to_string())]
        );

        subscription.unsubscribe();
        subscription.unsubscribe();
        cache.add_track("p1", track("b"));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_subscribers_called_in_registration_order() {
        let (_store, cache) = memory_cache();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let _a = cache.subscribe(move |_| first.lock().unwrap().push(1));
        let second = order.clone();
        let _b = cache.subscribe(move |_| second.lock().unwrap().push(2));

        cache.add_track("p1", track("a"));
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_callback_can_read_updated_list() {
        let (_store, cache) = memory_cache();
        let observed = Arc::new(Mutex::new(Vec::new()));

        let reader = cache.clone();
        let sink = observed.clone();
        let _subscription = cache.subscribe(move |id| {
            if let Some(id) = id {
                *sink.lock().unwrap() = reader.get_tracks(id);
            }
        });

        cache.add_track("p1", track("a"));
        assert_eq!(ids(&observed.lock().unwrap()), vec!["a"]);
    }

    #[test]
    fn test_transact_with_pure_transform() {
        let (_store, cache) = memory_cache();
        cache.transact(None, |table| {
            let now = Utc::now();
            let table = promote_track(table, "p1", track("x"), now);
            Some(promote_track(table, "p1", track("y"), now))
        });
        assert_eq!(ids(&cache.get_tracks("p1")), vec!["y", "x"]);
    }

    #[tokio::test]
    async fn test_changes_channel() {
        let (_store, cache) = memory_cache();
        let mut changes = cache.changes();

        cache.add_track("p1", track("a"));

        let change = changes.recv().await.unwrap();
        assert_eq!(change.playlist_id.as_deref(), Some("p1"));
    }
}
