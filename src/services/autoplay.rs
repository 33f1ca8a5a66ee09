//! Picks what plays next once the user's own selection runs out

use std::collections::VecDeque;

use crate::model::Track;

const HISTORY_LIMIT: usize = 50;

#[derive(Clone, Debug, Default)]
pub struct AutoplayQueue {
    history: VecDeque<String>,
    pending: VecDeque<Track>,
}

impl AutoplayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `track_id` as played; the oldest entries fall off past the limit
    pub fn record_played(&mut self, track_id: &str) {
        self.history.retain(|id| id != track_id);
        self.history.push_front(track_id.to_string());
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn recent_ids(&self) -> Vec<String> {
        self.history.iter().cloned().collect()
    }

    pub fn was_recently_played(&self, track_id: &str) -> bool {
        self.history.iter().any(|id| id == track_id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Next leftover suggestion from an earlier backend round, if any still qualifies
    pub fn take_pending(&mut self, hide_explicit: bool) -> Option<Track> {
        while let Some(track) = self.pending.pop_front() {
            if self.is_eligible(&track, None, hide_explicit) {
                return Some(track);
            }
        }
        None
    }

    /// Choose the first usable suggestion for `seed` and keep the rest for later
    pub fn next_from(&mut self, seed: &Track, suggestions: Vec<Track>, hide_explicit: bool) -> Option<Track> {
        let mut eligible: VecDeque<Track> = suggestions
            .into_iter()
            .filter(|track| self.is_eligible(track, Some(seed), hide_explicit))
            .collect();

        let next = eligible.pop_front();
        self.pending = eligible;
        next
    }

    fn is_eligible(&self, track: &Track, seed: Option<&Track>, hide_explicit: bool) -> bool {
        if seed.is_some_and(|seed| seed.id == track.id) {
            return false;
        }
        if hide_explicit && track.explicit {
            return false;
        }
        !self.was_recently_played(&track.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, id)
    }

    #[test]
    fn test_history_is_bounded_and_deduplicated() {
        let mut queue = AutoplayQueue::new();
        for i in 0..60 {
            queue.record_played(&format!("t{}", i));
        }
        queue.record_played("t59");

        let recent = queue.recent_ids();
        assert_eq!(recent.len(), HISTORY_LIMIT);
        assert_eq!(recent[0], "t59");
        assert!(!queue.was_recently_played("t0"));
    }

    #[test]
    fn test_skips_seed_and_recent() {
        let mut queue = AutoplayQueue::new();
        queue.record_played("b");

        let seed = track("a");
        let next = queue.next_from(&seed, vec![track("a"), track("b"), track("c"), track("d")], false);

        assert_eq!(next.map(|t| t.id), Some("c".to_string()));
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn test_hide_explicit() {
        let mut queue = AutoplayQueue::new();
        let mut explicit = track("x");
        explicit.explicit = true;

        let next = queue.next_from(&track("seed"), vec![explicit, track("y")], true);
        assert_eq!(next.map(|t| t.id), Some("y".to_string()));
    }

    #[test]
    fn test_take_pending_rechecks_history() {
        let mut queue = AutoplayQueue::new();
        queue.next_from(&track("seed"), vec![track("a"), track("b"), track("c")], false);
        queue.record_played("b");

        assert_eq!(queue.take_pending(false).map(|t| t.id), Some("c".to_string()));
        assert!(queue.take_pending(false).is_none());
    }

    #[test]
    fn test_no_suggestions() {
        let mut queue = AutoplayQueue::new();
        assert!(queue.next_from(&track("seed"), Vec::new(), false).is_none());
    }
}
