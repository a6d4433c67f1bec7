//! Leaderboard of completed Rapid rounds.

use crate::store::{load_json, save_json, KeyValueStore, HIGH_SCORES_KEY};
use crate::types::{HighScoreEntry, Level, Operation};
use chrono::Utc;

/// Maximum number of entries kept.
pub const MAX_HIGH_SCORES: usize = 10;

/// Maximum display name length, in characters.
pub const MAX_NAME_CHARS: usize = 20;

/// Name used when the learner leaves the prompt blank.
pub const ANONYMOUS: &str = "Anônimo";

/// High-score table, sorted descending by score.
#[derive(Debug, Clone, Default)]
pub struct HighScoreTable {
    entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    /// Load the table. Unreadable data yields an empty table.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut entries: Vec<HighScoreEntry> =
            load_json(store, HIGH_SCORES_KEY).unwrap_or_default();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);
        Self { entries }
    }

    /// Whether a score would enter the table.
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .iter()
            .map(|e| e.score)
            .min()
            .is_some_and(|min| score > min)
    }

    /// Insert a Rapid result if it qualifies.
    ///
    /// `name_prompt` is only called for qualifying scores.
    pub fn try_submit(
        &mut self,
        store: &mut dyn KeyValueStore,
        score: u32,
        operation: Operation,
        level: Level,
        name_prompt: impl FnOnce() -> Option<String>,
    ) -> bool {
        if !self.qualifies(score) {
            return false;
        }

        let display_name = clean_name(name_prompt().as_deref().unwrap_or_default());
        tracing::info!(score, %display_name, "new high score");

        self.entries.push(HighScoreEntry {
            display_name,
            score,
            operation,
            level,
            achieved_at: Utc::now(),
        });
        // Stable sort keeps earlier entries ahead on ties.
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        save_json(store, HIGH_SCORES_KEY, &self.entries[..]);
        true
    }

    pub fn clear(&mut self, store: &mut dyn KeyValueStore) {
        self.entries.clear();
        save_json(store, HIGH_SCORES_KEY, &self.entries[..]);
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clean_name(raw: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_NAME_CHARS).collect();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed
    }
}
