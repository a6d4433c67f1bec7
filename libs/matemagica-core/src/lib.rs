//! Core arithmetic quiz library shared by the front-ends.
//!
//! Provides:
//! - Problem generation with multiple-choice options
//! - Round state machine (Rapid, Study, error training) and countdown
//! - Persisted XP, error bank and high-score table over a key-value store
//! - Session orchestration behind a presentation trait

pub mod error;
pub mod error_bank;
pub mod frontend;
pub mod generator;
pub mod high_scores;
pub mod narration;
pub mod round;
pub mod session;
pub mod store;
pub mod timer;
pub mod types;
pub mod xp;

pub use error::{QuizError, Result};
pub use error_bank::{ErrorBank, MAX_MISTAKES};
pub use frontend::{FeedbackKind, Frontend, RecordingFrontend, UiEvent};
pub use generator::generate;
pub use high_scores::{HighScoreTable, MAX_HIGH_SCORES};
pub use round::Round;
pub use session::{Advance, AnswerOutcome, RoundSummary, Session, SessionState, Suggestion};
pub use store::{KeyValueStore, MemoryStore, StoreError};
pub use timer::{Countdown, TickOutcome, TickReport, TimeBand, TICK_INTERVAL};
pub use types::{Accessibility, HighScoreEntry, Level, MistakeRecord, Mode, Operation, Problem};
pub use xp::Experience;
