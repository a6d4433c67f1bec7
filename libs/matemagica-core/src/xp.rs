//! Persisted experience points.
//!
//! XP never goes below zero: penalties saturate and paid actions are
//! rejected when the balance is short.

use crate::error::{QuizError, Result};
use crate::store::{load_json, save_json, KeyValueStore, XP_KEY};

/// XP for a correct Rapid answer.
pub const RAPID_GAIN: u32 = 5;
/// XP for a correct Study answer.
pub const STUDY_GAIN: u32 = 2;
/// XP lost on a wrong answer.
pub const WRONG_PENALTY: u32 = 2;
/// Cost of revealing the answer in Study mode.
pub const REVEAL_COST: u32 = 250;
/// Cost of extending the Rapid countdown.
pub const EXTEND_TIME_COST: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Experience {
    points: u32,
}

impl Experience {
    /// Load XP. Missing, negative or unparsable values count as zero.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let points = load_json::<i64>(store, XP_KEY)
            .map(|p| p.clamp(0, i64::from(u32::MAX)) as u32)
            .unwrap_or(0);
        Self { points }
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn gain(&mut self, store: &mut dyn KeyValueStore, amount: u32) {
        self.points = self.points.saturating_add(amount);
        self.persist(store);
    }

    pub fn penalize(&mut self, store: &mut dyn KeyValueStore, amount: u32) {
        self.points = self.points.saturating_sub(amount);
        self.persist(store);
    }

    /// Pay for an assist. Nothing changes when the balance is short.
    pub fn spend(&mut self, store: &mut dyn KeyValueStore, cost: u32) -> Result<()> {
        if self.points < cost {
            return Err(QuizError::InsufficientXp {
                required: cost,
                available: self.points,
            });
        }
        self.points -= cost;
        self.persist(store);
        Ok(())
    }

    fn persist(&self, store: &mut dyn KeyValueStore) {
        save_json(store, XP_KEY, &self.points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_load_defaults_to_zero() {
        let mut store = MemoryStore::new();
        assert_eq!(Experience::load(&store).points(), 0);
        store.set(XP_KEY, "abc").unwrap();
        assert_eq!(Experience::load(&store).points(), 0);
        store.set(XP_KEY, "-40").unwrap();
        assert_eq!(Experience::load(&store).points(), 0);
    }

    #[test]
    fn test_penalty_saturates() {
        let mut store = MemoryStore::new();
        let mut xp = Experience::default();
        xp.gain(&mut store, 1);
        xp.penalize(&mut store, WRONG_PENALTY);
        assert_eq!(xp.points(), 0);
        assert_eq!(store.get(XP_KEY).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_spend_rejects_short_balance() {
        let mut store = MemoryStore::new();
        let mut xp = Experience::default();
        xp.gain(&mut store, 99);

        let err = xp.spend(&mut store, EXTEND_TIME_COST).unwrap_err();
        assert_eq!(
            err,
            QuizError::InsufficientXp {
                required: 100,
                available: 99
            }
        );
        assert_eq!(xp.points(), 99);

        xp.gain(&mut store, 1);
        xp.spend(&mut store, EXTEND_TIME_COST).unwrap();
        assert_eq!(xp.points(), 0);
        assert_eq!(Experience::load(&store).points(), 0);
    }
}
