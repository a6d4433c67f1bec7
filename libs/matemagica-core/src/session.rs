//! Quiz session orchestration.
//!
//! A [`Session`] owns the persisted state (XP, error bank, high scores), the
//! accessibility toggles and at most one [`Round`]. Every user action goes
//! through it; it applies the side effects and pushes output to a
//! [`Frontend`]. Deferred work (advancing after feedback) is returned to the
//! caller as a delay so the owner of the event loop can schedule it.

use crate::error::{QuizError, Result};
use crate::error_bank::ErrorBank;
use crate::frontend::{FeedbackKind, Frontend};
use crate::high_scores::HighScoreTable;
use crate::narration;
use crate::round::{Round, ANSWER_DELAY, REVEAL_DELAY, TRAINING_ANSWER_DELAY};
use crate::store::KeyValueStore;
use crate::timer::{TickOutcome, TimeBand, TICKS_PER_SECOND};
use crate::types::{Accessibility, Level, MistakeRecord, Mode, Operation};
use crate::xp::{Experience, EXTEND_TIME_COST, RAPID_GAIN, REVEAL_COST, STUDY_GAIN, WRONG_PENALTY};
use chrono::{DateTime, Duration as TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Score above which an advanced round earns the mastery message.
pub const MASTERY_SCORE: u32 = 1000;

/// Coarse session state, for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active(Mode),
    Ended,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Active(Round),
    Ended(RoundSummary),
}

/// Advice shown at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Too many mistakes; practice this pair in Study mode.
    Study { operation: Operation, level: Level },
    /// High score on the advanced level.
    Mastery { operation: Operation },
    KeepPracticing,
    TrainingFinished { hits: u32, misses: u32 },
}

impl Suggestion {
    fn for_round(round: &Round) -> Self {
        if round.mode() == Mode::ErrorTraining {
            return Self::TrainingFinished {
                hits: round.hits(),
                misses: round.misses(),
            };
        }
        match (round.operation(), round.level()) {
            (Some(operation), Some(level)) if 2 * round.misses() > round.hits() => {
                Self::Study { operation, level }
            }
            (Some(operation), Some(Level::Advanced)) if round.score() > MASTERY_SCORE => {
                Self::Mastery { operation }
            }
            _ => Self::KeepPracticing,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Study { operation, level } => format!(
                "Você teve muitos erros! Recomendamos usar o Modo Estudo para treinar {} (nível {}).",
                operation.label(),
                level.label()
            ),
            Self::Mastery { operation } => format!(
                "Fantástico! Você está dominando {} no Nível Avançado! Tente outro desafio.",
                operation.label()
            ),
            Self::KeepPracticing => {
                "Continue praticando para alcançar o próximo nível de mestre!".to_string()
            }
            Self::TrainingFinished { hits, misses } => {
                format!("Treinamento concluído! Acertos: {hits} | Erros: {misses}")
            }
        }
    }
}

/// Final figures of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub mode: Mode,
    pub operation: Option<Operation>,
    pub level: Option<Level>,
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    /// Display-only XP balance of the round (`hits × gain − misses × 2`).
    pub xp_delta: i64,
    /// XP balance after the round.
    pub xp_total: u32,
    pub suggestion: Suggestion,
    pub timed_out: bool,
    /// Whether the score entered the high-score table.
    pub high_score: bool,
}

/// Result of an accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: i64,
    pub score: u32,
    pub xp: u32,
    /// How long the feedback stays up before [`Session::advance`] is due.
    pub advance_after: Duration,
}

/// What [`Session::advance`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Question,
    Ended(RoundSummary),
}

pub struct Session<S: KeyValueStore> {
    store: S,
    xp: Experience,
    bank: ErrorBank,
    high_scores: HighScoreTable,
    accessibility: Accessibility,
    phase: Phase,
    rng: StdRng,
}

impl<S: KeyValueStore> Session<S> {
    /// Load persisted state from `store`, seeding randomness from the OS.
    pub fn open(store: S) -> Self {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    pub fn with_rng(store: S, rng: StdRng) -> Self {
        let xp = Experience::load(&store);
        let bank = ErrorBank::load(&store);
        let high_scores = HighScoreTable::load(&store);
        tracing::debug!(
            xp = xp.points(),
            mistakes = bank.len(),
            high_scores = high_scores.len(),
            "session loaded"
        );

        Self {
            store,
            xp,
            bank,
            high_scores,
            accessibility: Accessibility::default(),
            phase: Phase::Idle,
            rng,
        }
    }

    /// Start a round from menu selections.
    ///
    /// Empty or unknown selections are reported to the learner and leave the
    /// session idle.
    pub fn start(
        &mut self,
        operation: &str,
        level: &str,
        mode: Mode,
        ui: &mut dyn Frontend,
    ) -> Result<()> {
        self.discard_round();

        let (operation, level) = match parse_selection(operation, level) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::debug!(error = %e, "round not started");
                ui.show_feedback(&selection_message(&e), FeedbackKind::Error);
                return Err(e);
            }
        };

        if mode == Mode::ErrorTraining {
            return self.begin_training(Some((operation, level)), ui);
        }

        let round = Round::new(operation, level, mode, self.accessibility);
        tracing::info!(
            %operation,
            %level,
            mode = mode.as_str(),
            time_max = ?round.time_max(),
            "round started"
        );
        self.phase = Phase::Active(round);

        if mode == Mode::Rapid {
            ui.show_time_bar(100.0, TimeBand::Plenty);
            ui.set_low_time_cue(false);
        }
        self.advance(ui)?;
        Ok(())
    }

    /// Replay the saved mistakes, newest first.
    pub fn start_error_training(&mut self, ui: &mut dyn Frontend) -> Result<()> {
        self.discard_round();
        self.begin_training(None, ui)
    }

    fn begin_training(
        &mut self,
        selection: Option<(Operation, Level)>,
        ui: &mut dyn Frontend,
    ) -> Result<()> {
        if self.bank.is_empty() {
            ui.show_feedback("Nenhum erro salvo para treinar ainda.", FeedbackKind::Info);
            return Err(QuizError::NoMistakes);
        }

        let mut round = Round::error_training(self.bank.records().to_vec());
        if let Some((operation, level)) = selection {
            round = round.with_selection(operation, level);
        }
        tracing::info!(queued = self.bank.len(), "error training started");
        self.phase = Phase::Active(round);
        self.advance(ui)?;
        Ok(())
    }

    /// Show the next question, or end the round when none is left.
    pub fn advance(&mut self, ui: &mut dyn Frontend) -> Result<Advance> {
        let Phase::Active(round) = &mut self.phase else {
            return Err(QuizError::NoActiveRound);
        };

        if round.advance(&mut self.rng) {
            present_question(round, self.accessibility, ui);
            Ok(Advance::Question)
        } else {
            self.finish(ui, false).map(Advance::Ended)
        }
    }

    /// Evaluate an answer. `None` when there is no open question.
    pub fn submit_answer(
        &mut self,
        candidate: i64,
        ui: &mut dyn Frontend,
    ) -> Option<AnswerOutcome> {
        let Phase::Active(round) = &mut self.phase else {
            return None;
        };
        let mode = round.mode();
        let problem = round.current_problem().cloned();
        let verdict = round.submit(candidate)?;
        tracing::debug!(candidate, correct = verdict.correct, "answer evaluated");

        let advance_after = match mode {
            Mode::ErrorTraining => {
                if verdict.correct {
                    if let Some(recorded_at) = verdict.source_reference {
                        self.bank.remove(&mut self.store, recorded_at);
                    }
                    ui.show_feedback(
                        "Correto! Esse erro foi removido da sua lista ✅",
                        FeedbackKind::Success,
                    );
                } else {
                    ui.show_feedback("Ainda não. Vamos continuar treinando 🙂", FeedbackKind::Warning);
                }
                TRAINING_ANSWER_DELAY
            }
            Mode::Rapid | Mode::Study => {
                if verdict.correct {
                    self.xp.gain(&mut self.store, xp_gain(mode));
                    ui.show_feedback("RESPOSTA CORRETA!", FeedbackKind::Success);
                } else {
                    self.xp.penalize(&mut self.store, WRONG_PENALTY);
                    if let Some(problem) = problem {
                        let recorded_at = mistake_timestamp(&self.bank);
                        self.bank.record(
                            &mut self.store,
                            MistakeRecord::new(&problem, candidate, recorded_at),
                        );
                    }
                    ui.show_feedback("RESPOSTA INCORRETA!", FeedbackKind::Error);
                }
                ANSWER_DELAY
            }
        };

        Some(AnswerOutcome {
            correct: verdict.correct,
            correct_answer: verdict.correct_answer,
            score: round.score(),
            xp: self.xp.points(),
            advance_after,
        })
    }

    /// Show the answer of the open question. Returns the advance delay.
    ///
    /// Costs [`REVEAL_COST`] XP in Study mode; free in error training.
    pub fn reveal_answer(&mut self, ui: &mut dyn Frontend) -> Result<Duration> {
        let Phase::Active(round) = &mut self.phase else {
            return Err(QuizError::NoActiveRound);
        };
        let mode = round.mode();
        if mode == Mode::Rapid {
            return Err(QuizError::WrongMode(mode.as_str()));
        }
        if round.is_locked() || round.current_problem().is_none() {
            return Err(QuizError::AlreadyAnswered);
        }

        if mode == Mode::Study {
            if let Err(e) = self.xp.spend(&mut self.store, REVEAL_COST) {
                ui.show_feedback(
                    &format!("XP insuficiente. Você precisa de {REVEAL_COST} XP!"),
                    FeedbackKind::Error,
                );
                return Err(e);
            }
        }

        let answer = round.reveal().ok_or(QuizError::AlreadyAnswered)?;
        let message = match mode {
            Mode::Study => format!("A resposta correta era {answer}. Treine mais!"),
            _ => format!("A resposta correta é {answer}."),
        };
        ui.show_feedback(&message, FeedbackKind::Info);
        Ok(REVEAL_DELAY)
    }

    /// Buy extra time in a Rapid round. Returns the ticks added.
    pub fn extend_time(&mut self, amount: u32, ui: &mut dyn Frontend) -> Result<u32> {
        let Phase::Active(round) = &mut self.phase else {
            return Err(QuizError::NoActiveRound);
        };
        if round.mode() != Mode::Rapid {
            return Err(QuizError::WrongMode(round.mode().as_str()));
        }

        if let Err(e) = self.xp.spend(&mut self.store, EXTEND_TIME_COST) {
            ui.show_feedback(
                &format!("XP insuficiente. Você precisa de {EXTEND_TIME_COST} XP!"),
                FeedbackKind::Error,
            );
            return Err(e);
        }

        let added = round.extend_time(amount).unwrap_or(0);
        ui.show_feedback(
            &format!("Tempo estendido! +{} segundos!", added / TICKS_PER_SECOND),
            FeedbackKind::Success,
        );
        if let Some(countdown) = round.countdown() {
            let percent = countdown.percent();
            ui.show_time_bar(percent, TimeBand::for_percent(percent));
        }
        Ok(added)
    }

    /// Advance the countdown by one tick. Expiry ends the round.
    pub fn tick(&mut self, ui: &mut dyn Frontend) -> TickOutcome {
        let Phase::Active(round) = &mut self.phase else {
            return TickOutcome::Idle;
        };

        let outcome = round.tick();
        match outcome {
            TickOutcome::Running(report) => {
                ui.show_time_bar(report.percent, report.band);
                ui.set_low_time_cue(report.band == TimeBand::Low);
                if report.alert {
                    ui.play_alert();
                }
            }
            TickOutcome::Expired => {
                ui.show_time_bar(0.0, TimeBand::Low);
                ui.play_alert();
                ui.show_feedback("Tempo esgotado! Game Over!", FeedbackKind::Error);
                if let Err(e) = self.finish(ui, true) {
                    tracing::debug!(error = %e, "expired round already closed");
                }
            }
            TickOutcome::Idle => {}
        }
        outcome
    }

    /// End the active round early and show its summary.
    pub fn end(&mut self, ui: &mut dyn Frontend) -> Result<RoundSummary> {
        self.finish(ui, false)
    }

    fn finish(&mut self, ui: &mut dyn Frontend, timed_out: bool) -> Result<RoundSummary> {
        let mut round = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Active(round) => round,
            other => {
                self.phase = other;
                return Err(QuizError::NoActiveRound);
            }
        };
        round.stop_countdown();
        ui.set_low_time_cue(false);

        let mode = round.mode();
        let xp_delta = match mode {
            Mode::Rapid | Mode::Study => {
                i64::from(round.hits()) * i64::from(xp_gain(mode))
                    - i64::from(round.misses()) * i64::from(WRONG_PENALTY)
            }
            Mode::ErrorTraining => 0,
        };

        let high_score = match (mode, round.operation(), round.level()) {
            (Mode::Rapid, Some(operation), Some(level)) => self.high_scores.try_submit(
                &mut self.store,
                round.score(),
                operation,
                level,
                || ui.prompt_name(),
            ),
            _ => false,
        };

        let summary = RoundSummary {
            mode,
            operation: round.operation(),
            level: round.level(),
            score: round.score(),
            hits: round.hits(),
            misses: round.misses(),
            xp_delta,
            xp_total: self.xp.points(),
            suggestion: Suggestion::for_round(&round),
            timed_out,
            high_score,
        };
        tracing::info!(
            mode = mode.as_str(),
            score = summary.score,
            hits = summary.hits,
            misses = summary.misses,
            timed_out,
            "round ended"
        );

        ui.show_summary(&summary);
        self.phase = Phase::Ended(summary.clone());
        Ok(summary)
    }

    /// Abandon the active round. Returns `false` when none was running.
    ///
    /// Nothing about the partial round is persisted.
    pub fn quit(&mut self, ui: &mut dyn Frontend) -> bool {
        let was_active = matches!(self.phase, Phase::Active(_));
        self.discard_round();
        if was_active {
            ui.set_low_time_cue(false);
            ui.show_feedback("Rodada cancelada.", FeedbackKind::Warning);
        }
        was_active
    }

    /// Leave the summary screen.
    pub fn return_to_menu(&mut self) {
        if matches!(self.phase, Phase::Ended(_)) {
            self.phase = Phase::Idle;
        }
    }

    fn discard_round(&mut self) {
        if let Phase::Active(round) = &mut self.phase {
            round.stop_countdown();
            tracing::debug!(mode = round.mode().as_str(), "round discarded");
        }
        self.phase = Phase::Idle;
    }

    pub fn clear_mistakes(&mut self) {
        self.bank.clear(&mut self.store);
    }

    pub fn clear_high_scores(&mut self) {
        self.high_scores.clear(&mut self.store);
    }

    pub fn set_voice_narration(&mut self, on: bool) {
        self.accessibility.voice_narration = on;
    }

    pub fn set_sign_language_mode(&mut self, on: bool) {
        self.accessibility.sign_language_mode = on;
    }

    pub fn accessibility(&self) -> Accessibility {
        self.accessibility
    }

    pub fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Active(round) => SessionState::Active(round.mode()),
            Phase::Ended(_) => SessionState::Ended,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        match &self.phase {
            Phase::Active(round) => Some(round),
            _ => None,
        }
    }

    pub fn last_summary(&self) -> Option<&RoundSummary> {
        match &self.phase {
            Phase::Ended(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    /// Whether the tick source should be running.
    pub fn timer_running(&self) -> bool {
        self.round().is_some_and(Round::is_timer_running)
    }

    pub fn xp(&self) -> u32 {
        self.xp.points()
    }

    pub fn mistakes(&self) -> &ErrorBank {
        &self.bank
    }

    pub fn high_scores(&self) -> &HighScoreTable {
        &self.high_scores
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn parse_selection(operation: &str, level: &str) -> Result<(Operation, Level)> {
    if operation.trim().is_empty() || level.trim().is_empty() {
        return Err(QuizError::Configuration);
    }
    Ok((operation.parse()?, level.parse()?))
}

fn selection_message(error: &QuizError) -> String {
    match error {
        QuizError::UnknownOperation(name) => format!("Erro: operação desconhecida '{name}'!"),
        QuizError::UnknownLevel(name) => format!("Erro: nível desconhecido '{name}'!"),
        _ => "Erro: Operação ou Nível não selecionados!".to_string(),
    }
}

fn present_question(round: &Round, accessibility: Accessibility, ui: &mut dyn Frontend) {
    let Some(problem) = round.current_problem() else {
        return;
    };
    ui.show_question(&problem.prompt, &problem.options, &round.counter_text());
    if accessibility.voice_narration {
        ui.speak(&narration::announce(round.question_index(), &problem.prompt));
    }
}

fn xp_gain(mode: Mode) -> u32 {
    match mode {
        Mode::Study => STUDY_GAIN,
        Mode::Rapid | Mode::ErrorTraining => RAPID_GAIN,
    }
}

/// Timestamps identify mistakes, so two recorded within the clock's
/// resolution must still differ.
fn mistake_timestamp(bank: &ErrorBank) -> DateTime<Utc> {
    let now = Utc::now();
    match bank.records().first() {
        Some(latest) if latest.recorded_at >= now => {
            latest.recorded_at + TimeDelta::microseconds(1)
        }
        _ => now,
    }
}
