//! Log of wrong answers kept for error training.

use crate::store::{load_json, save_json, KeyValueStore, MISTAKES_KEY};
use crate::types::MistakeRecord;
use chrono::{DateTime, Utc};

/// Maximum number of mistakes kept.
pub const MAX_MISTAKES: usize = 50;

/// Saved mistakes, newest first.
#[derive(Debug, Clone, Default)]
pub struct ErrorBank {
    records: Vec<MistakeRecord>,
}

impl ErrorBank {
    /// Load the bank. Unreadable data yields an empty bank.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut records: Vec<MistakeRecord> = load_json(store, MISTAKES_KEY).unwrap_or_default();
        records.truncate(MAX_MISTAKES);
        tracing::debug!(count = records.len(), "loaded mistake log");
        Self { records }
    }

    /// Save a new mistake as the most recent one.
    pub fn record(&mut self, store: &mut dyn KeyValueStore, mistake: MistakeRecord) {
        self.records.insert(0, mistake);
        self.records.truncate(MAX_MISTAKES);
        self.persist(store);
    }

    /// Delete the first record with this timestamp. Returns whether one was found.
    pub fn remove(&mut self, store: &mut dyn KeyValueStore, recorded_at: DateTime<Utc>) -> bool {
        let Some(index) = self
            .records
            .iter()
            .position(|r| r.recorded_at == recorded_at)
        else {
            return false;
        };
        self.records.remove(index);
        self.persist(store);
        true
    }

    pub fn clear(&mut self, store: &mut dyn KeyValueStore) {
        self.records.clear();
        self.persist(store);
    }

    /// All records, newest first.
    pub fn records(&self) -> &[MistakeRecord] {
        &self.records
    }

    /// The `n` most recent records.
    pub fn recent(&self, n: usize) -> &[MistakeRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        save_json(store, MISTAKES_KEY, &self.records[..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::BrokenStore;
    use crate::store::MemoryStore;
    use crate::types::Operation;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn mistake(i: i64) -> MistakeRecord {
        MistakeRecord {
            prompt: format!("{i} + 1 = ?"),
            correct_answer: i + 1,
            given_answer: i,
            operation: Operation::Addition,
            recorded_at: DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(i),
        }
    }

    #[test]
    fn test_record_is_newest_first_and_persisted() {
        let mut store = MemoryStore::new();
        let mut bank = ErrorBank::load(&store);
        bank.record(&mut store, mistake(1));
        bank.record(&mut store, mistake(2));

        assert_eq!(bank.records()[0], mistake(2));
        let reloaded = ErrorBank::load(&store);
        assert_eq!(reloaded.records(), bank.records());
    }

    #[test]
    fn test_oldest_evicted_after_limit() {
        let mut store = MemoryStore::new();
        let mut bank = ErrorBank::default();
        for i in 0..=MAX_MISTAKES as i64 {
            bank.record(&mut store, mistake(i));
        }

        assert_eq!(bank.len(), MAX_MISTAKES);
        assert!(!bank.records().contains(&mistake(0)));
        assert_eq!(bank.records()[0], mistake(MAX_MISTAKES as i64));
        assert_eq!(ErrorBank::load(&store).len(), MAX_MISTAKES);
    }

    #[test]
    fn test_remove_by_timestamp() {
        let mut store = MemoryStore::new();
        let mut bank = ErrorBank::default();
        bank.record(&mut store, mistake(1));
        bank.record(&mut store, mistake(2));

        assert!(bank.remove(&mut store, mistake(1).recorded_at));
        assert!(!bank.remove(&mut store, mistake(1).recorded_at));
        assert_eq!(ErrorBank::load(&store).records(), &[mistake(2)]);
    }

    #[test]
    fn test_recent_and_clear() {
        let mut store = MemoryStore::new();
        let mut bank = ErrorBank::default();
        for i in 0..15 {
            bank.record(&mut store, mistake(i));
        }
        assert_eq!(bank.recent(10).len(), 10);
        assert_eq!(bank.recent(10)[0], mistake(14));

        bank.clear(&mut store);
        assert!(bank.is_empty());
        assert!(ErrorBank::load(&store).is_empty());
    }

    #[test]
    fn test_broken_store_keeps_memory_state() {
        let mut store = BrokenStore;
        let mut bank = ErrorBank::load(&store);
        assert!(bank.is_empty());
        bank.record(&mut store, mistake(3));
        assert_eq!(bank.len(), 1);
    }
}
