//! Test fixtures and factory functions for creating test data.

use chrono::{DateTime, Duration, Utc};

use matemagica_core::store::{HIGH_SCORES_KEY, MISTAKES_KEY, XP_KEY};
use matemagica_core::{HighScoreEntry, KeyValueStore, Level, MemoryStore, MistakeRecord, Operation};

/// Fixed instant `offset` seconds after the epoch.
pub fn at(offset: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(offset)
}

/// An addition mistake `a + b` answered with `given`.
pub fn addition_mistake(a: i64, b: i64, given: i64, offset: i64) -> MistakeRecord {
    MistakeRecord {
        prompt: format!("{a} + {b} = ?"),
        correct_answer: a + b,
        given_answer: given,
        operation: Operation::Addition,
        recorded_at: at(offset),
    }
}

pub fn high_score(name: &str, score: u32) -> HighScoreEntry {
    HighScoreEntry {
        display_name: name.to_string(),
        score,
        operation: Operation::Multiplication,
        level: Level::Medium,
        achieved_at: at(i64::from(score)),
    }
}

/// Store preloaded with XP, mistakes (newest first) and high scores.
pub fn seeded_store(xp: u32, mistakes: &[MistakeRecord], scores: &[HighScoreEntry]) -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .set(XP_KEY, &xp.to_string())
        .expect("Failed to seed XP");
    store
        .set(
            MISTAKES_KEY,
            &serde_json::to_string(mistakes).expect("Failed to encode mistakes"),
        )
        .expect("Failed to seed mistakes");
    store
        .set(
            HIGH_SCORES_KEY,
            &serde_json::to_string(scores).expect("Failed to encode scores"),
        )
        .expect("Failed to seed scores");
    store
}
