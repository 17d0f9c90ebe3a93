//! Rotation state
//!
//! Short-term memory of recently recommended bottles. The state is a plain
//! value: the recommender takes it in and hands back the updated copy.
//! Entries older than the retention window are pruned before every read.

use cellar_common::time;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Default retention window
pub const DEFAULT_ROTATION_WINDOW_DAYS: i64 = 3;

/// One recently shown bottle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationEntry {
    pub bottle_id: String,
    pub shown_at: DateTime<Utc>,
}

/// Time-bounded set of (bottle id, shown timestamp) pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    #[serde(deserialize_with = "deserialize_window_days")]
    window_days: i64,
    entries: Vec<RotationEntry>,
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION_WINDOW_DAYS)
    }
}

impl RotationState {
    pub fn new(window_days: i64) -> Self {
        Self {
            window_days: clamp_window_days(window_days),
            entries: Vec::new(),
        }
    }

    /// Rebuild state from stored pairs; a bottle appearing twice keeps its latest timestamp
    pub fn from_entries(
        window_days: i64,
        entries: impl IntoIterator<Item = (String, DateTime<Utc>)>,
    ) -> Self {
        let mut state = Self::new(window_days);
        for (bottle_id, shown_at) in entries {
            state.upsert(bottle_id, shown_at);
        }
        state
    }

    pub fn window(&self) -> Duration {
        time::days(self.window_days)
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    pub fn entries(&self) -> &[RotationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries shown before `now - window`
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = time::before(now, self.window());
        self.entries.retain(|e| e.shown_at >= cutoff);
    }

    /// Whether `bottle_id` has an unexpired entry
    pub fn contains(&self, bottle_id: &str, now: DateTime<Utc>) -> bool {
        let cutoff = time::before(now, self.window());
        self.entries
            .iter()
            .any(|e| e.bottle_id == bottle_id && e.shown_at >= cutoff)
    }

    /// Prune, then record `bottle_ids` as shown at `now`
    pub fn mark_shown<S: AsRef<str>>(&mut self, bottle_ids: &[S], now: DateTime<Utc>) {
        self.prune(now);
        for id in bottle_ids {
            self.upsert(id.as_ref().to_string(), now);
        }
    }

    fn upsert(&mut self, bottle_id: String, shown_at: DateTime<Utc>) {
        match self.entries.iter_mut().find(|e| e.bottle_id == bottle_id) {
            Some(entry) => entry.shown_at = entry.shown_at.max(shown_at),
            None => self.entries.push(RotationEntry { bottle_id, shown_at }),
        }
    }
}

fn clamp_window_days(window_days: i64) -> i64 {
    window_days.clamp(1, time::MAX_WINDOW_DAYS)
}

fn deserialize_window_days<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_window_days)
}
