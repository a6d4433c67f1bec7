//! Presentation seam.
//!
//! The session pushes everything the learner sees or hears through this
//! trait. Rendering, audio and speech are fire-and-forget; the only call
//! that returns data is the high-score name prompt.

use crate::session::RoundSummary;
use crate::timer::TimeBand;

/// Tone of a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Warning,
    Error,
    Info,
}

pub trait Frontend {
    /// Show a new question with its four options.
    fn show_question(&mut self, prompt: &str, options: &[i64; 4], counter: &str);

    /// Update the time bar.
    fn show_time_bar(&mut self, percent: f64, band: TimeBand);

    /// Turn the sustained low-time cue on or off.
    fn set_low_time_cue(&mut self, on: bool);

    fn play_alert(&mut self);

    /// Speak a sentence. Only called while voice narration is on.
    fn speak(&mut self, text: &str);

    fn show_feedback(&mut self, message: &str, kind: FeedbackKind);

    fn show_summary(&mut self, summary: &RoundSummary);

    /// Ask for a leaderboard name. `None` or blank means anonymous.
    fn prompt_name(&mut self) -> Option<String>;
}

/// Everything a [`RecordingFrontend`] saw.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Question {
        prompt: String,
        options: [i64; 4],
        counter: String,
    },
    TimeBar(f64, TimeBand),
    LowTimeCue(bool),
    Alert,
    Speech(String),
    Feedback(String, FeedbackKind),
    Summary(RoundSummary),
    NamePrompt,
}

/// Frontend that records calls (for testing and headless use).
#[derive(Debug, Default)]
pub struct RecordingFrontend {
    pub events: Vec<UiEvent>,
    /// Name returned by the next prompt.
    pub name: Option<String>,
}

impl RecordingFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> usize {
        self.events.iter().filter(|e| **e == UiEvent::Alert).count()
    }

    pub fn feedback_messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Feedback(message, _) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn spoken(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Speech(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Frontend for RecordingFrontend {
    fn show_question(&mut self, prompt: &str, options: &[i64; 4], counter: &str) {
        self.events.push(UiEvent::Question {
            prompt: prompt.to_string(),
            options: *options,
            counter: counter.to_string(),
        });
    }

    fn show_time_bar(&mut self, percent: f64, band: TimeBand) {
        self.events.push(UiEvent::TimeBar(percent, band));
    }

    fn set_low_time_cue(&mut self, on: bool) {
        self.events.push(UiEvent::LowTimeCue(on));
    }

    fn play_alert(&mut self) {
        self.events.push(UiEvent::Alert);
    }

    fn speak(&mut self, text: &str) {
        self.events.push(UiEvent::Speech(text.to_string()));
    }

    fn show_feedback(&mut self, message: &str, kind: FeedbackKind) {
        self.events.push(UiEvent::Feedback(message.to_string(), kind));
    }

    fn show_summary(&mut self, summary: &RoundSummary) {
        self.events.push(UiEvent::Summary(summary.clone()));
    }

    fn prompt_name(&mut self) -> Option<String> {
        self.events.push(UiEvent::NamePrompt);
        self.name.take()
    }
}
