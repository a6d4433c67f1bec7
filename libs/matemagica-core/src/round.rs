//! In-progress round state.
//!
//! A [`Round`] only knows about its own counters, the current problem and
//! the countdown. Persistence side effects (XP, mistakes, high scores) are
//! applied by the session that owns it.

use crate::generator;
use crate::timer::{Countdown, TickOutcome};
use crate::types::{Accessibility, Level, MistakeRecord, Mode, Operation, Problem};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;

/// Questions in a Rapid round.
pub const RAPID_QUESTIONS: u32 = 20;

/// Delay before advancing after a Rapid/Study answer.
pub const ANSWER_DELAY: Duration = Duration::from_millis(1500);
/// Delay before advancing after an error-training answer.
pub const TRAINING_ANSWER_DELAY: Duration = Duration::from_millis(1200);
/// Delay before advancing after a revealed answer.
pub const REVEAL_DELAY: Duration = Duration::from_millis(2500);

/// Result of evaluating one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub correct_answer: i64,
    pub score_gain: u32,
    /// Mistake the problem was rebuilt from, if any.
    pub source_reference: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Round {
    mode: Mode,
    operation: Option<Operation>,
    level: Option<Level>,
    score: u32,
    question_index: u32,
    total_questions: Option<u32>,
    hits: u32,
    misses: u32,
    current: Option<Problem>,
    locked: bool,
    countdown: Option<Countdown>,
    training_queue: VecDeque<MistakeRecord>,
}

impl Round {
    /// Rapid or Study round. Only Rapid rounds get a countdown.
    pub fn new(operation: Operation, level: Level, mode: Mode, accessibility: Accessibility) -> Self {
        let (total_questions, countdown) = match mode {
            Mode::Rapid => {
                let base = level.base_time();
                let max = if accessibility.is_active() { base * 2 } else { base };
                (Some(RAPID_QUESTIONS), Some(Countdown::new(max)))
            }
            Mode::Study | Mode::ErrorTraining => (None, None),
        };

        Self {
            mode,
            operation: Some(operation),
            level: Some(level),
            score: 0,
            question_index: 0,
            total_questions,
            hits: 0,
            misses: 0,
            current: None,
            locked: false,
            countdown,
            training_queue: VecDeque::new(),
        }
    }

    /// Untimed replay of saved mistakes, in the given order.
    pub fn error_training(queue: Vec<MistakeRecord>) -> Self {
        Self {
            mode: Mode::ErrorTraining,
            operation: None,
            level: None,
            score: 0,
            question_index: 0,
            total_questions: Some(queue.len() as u32),
            hits: 0,
            misses: 0,
            current: None,
            locked: false,
            countdown: None,
            training_queue: queue.into(),
        }
    }

    /// Tag a training round with the menu selection it was started from.
    pub(crate) fn with_selection(mut self, operation: Operation, level: Level) -> Self {
        self.operation = Some(operation);
        self.level = Some(level);
        self
    }

    /// Move to the next problem. Returns `false` when the round is over.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let problem = match self.mode {
            Mode::ErrorTraining => match self.training_queue.pop_front() {
                Some(record) => generator::build_from_mistake(&record, rng),
                None => return false,
            },
            Mode::Rapid | Mode::Study => {
                if self
                    .total_questions
                    .is_some_and(|total| self.question_index >= total)
                {
                    return false;
                }
                let (Some(operation), Some(level)) = (self.operation, self.level) else {
                    return false;
                };
                generator::generate(operation, level, rng)
            }
        };

        self.question_index += 1;
        self.current = Some(problem);
        self.locked = false;
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.resume();
        }
        true
    }

    /// Evaluate an answer. `None` when there is no open question.
    ///
    /// The countdown is stopped before the answer is checked.
    pub fn submit(&mut self, candidate: i64) -> Option<Verdict> {
        if self.locked {
            return None;
        }
        let (correct_answer, source_reference) = match self.current.as_ref() {
            Some(problem) => (problem.correct_answer, problem.source_reference),
            None => return None,
        };
        self.stop_countdown();
        self.locked = true;

        let correct = candidate == correct_answer;
        let score_gain = match (self.mode, correct) {
            (Mode::Rapid, true) => 20 * self.question_index,
            (Mode::Study, true) => 10,
            _ => 0,
        };

        if correct {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.score += score_gain;

        Some(Verdict {
            correct,
            correct_answer,
            score_gain,
            source_reference,
        })
    }

    /// Lock the question and return its answer. `None` if already locked.
    pub fn reveal(&mut self) -> Option<i64> {
        if self.locked {
            return None;
        }
        let answer = self.current.as_ref()?.correct_answer;
        self.stop_countdown();
        self.locked = true;
        Some(answer)
    }

    pub fn tick(&mut self) -> TickOutcome {
        match self.countdown.as_mut() {
            Some(countdown) => countdown.tick(),
            None => TickOutcome::Idle,
        }
    }

    /// Extend the countdown. Returns the ticks added, `None` without a countdown.
    pub fn extend_time(&mut self, amount: u32) -> Option<u32> {
        self.countdown.as_mut().map(|c| c.extend(amount))
    }

    pub fn stop_countdown(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }
    }

    /// Counter text such as `Questão: 3/20`.
    pub fn counter_text(&self) -> String {
        match self.total_questions {
            Some(total) => format!("Questão: {}/{}", self.question_index, total),
            None => format!("Questão: {}/∞", self.question_index),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn operation(&self) -> Option<Operation> {
        self.operation
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    /// `None` means unbounded (Study).
    pub fn total_questions(&self) -> Option<u32> {
        self.total_questions
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.current.as_ref()
    }

    /// Whether the current question has been answered or revealed.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// Time budget in ticks; `None` for untimed rounds.
    pub fn time_max(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::max)
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    pub fn is_timer_running(&self) -> bool {
        self.countdown.as_ref().is_some_and(Countdown::is_running)
    }

    pub fn remaining_in_queue(&self) -> usize {
        self.training_queue.len()
    }
}
