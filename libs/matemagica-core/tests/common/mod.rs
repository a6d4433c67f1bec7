//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - QuizContext bundling a session, its store and a recording frontend
//! - Helper functions for creating test data

#![allow(dead_code)]

pub mod fixtures;

use rand::rngs::StdRng;
use rand::SeedableRng;

use matemagica_core::{MemoryStore, Mode, RecordingFrontend, Session};

/// Seed used by every context so runs are reproducible.
pub const SEED: u64 = 2024;

/// Session over an in-memory store with a seeded generator.
pub struct QuizContext {
    pub session: Session<MemoryStore>,
    pub ui: RecordingFrontend,
}

impl QuizContext {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            session: Session::with_rng(store, StdRng::seed_from_u64(SEED)),
            ui: RecordingFrontend::new(),
        }
    }

    /// Start a round, panicking on configuration errors.
    pub fn start(&mut self, operation: &str, level: &str, mode: Mode) {
        self.session
            .start(operation, level, mode, &mut self.ui)
            .expect("Failed to start round");
    }

    /// Correct answer of the open question.
    pub fn answer(&self) -> i64 {
        self.session
            .round()
            .and_then(|round| round.current_problem())
            .map(|problem| problem.correct_answer)
            .expect("No open question")
    }

    pub fn answer_correctly(&mut self) {
        let answer = self.answer();
        self.session
            .submit_answer(answer, &mut self.ui)
            .expect("Answer was ignored");
    }

    pub fn answer_wrongly(&mut self) {
        let wrong = self.answer() + 1;
        self.session
            .submit_answer(wrong, &mut self.ui)
            .expect("Answer was ignored");
    }
}
