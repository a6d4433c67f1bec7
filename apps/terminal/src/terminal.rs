//! Line-oriented terminal front-end.

use matemagica_core::{FeedbackKind, Frontend, Mode, RoundSummary, TimeBand};
use std::fmt;
use std::io::Write;
use tokio::sync::mpsc;

/// Width of the time bar in cells.
const BAR_WIDTH: usize = 20;

/// Renders quiz output and hands out input lines.
///
/// Lines arrive through a channel fed by the stdin reader, so the event
/// loop and the blocking name prompt share one source.
///
/// The name prompt waits through `block_in_place`, so the frontend must be
/// driven from a multi-threaded tokio runtime. On a current-thread runtime
/// a qualifying score panics at the prompt.
pub struct TerminalFrontend<W: Write> {
    out: W,
    lines: mpsc::UnboundedReceiver<String>,
    /// Last time-bar decile drawn; the bar is redrawn only when it changes.
    last_decile: Option<u32>,
    low_time: bool,
    sign_language: bool,
}

impl<W: Write> TerminalFrontend<W> {
    pub fn new(out: W, lines: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            out,
            lines,
            last_decile: None,
            low_time: false,
            sign_language: false,
        }
    }

    /// Next input line, `None` once stdin is closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Read one line from inside a synchronous call.
    pub fn read_line_blocking(&mut self) -> Option<String> {
        tokio::task::block_in_place(|| self.lines.blocking_recv())
    }

    /// Highlight questions for the sign-language visual mode.
    pub fn set_sign_language(&mut self, on: bool) {
        self.sign_language = on;
    }

    pub fn print(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    pub fn prompt(&mut self, text: &str) {
        if let Err(e) = write!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Frontend for TerminalFrontend<W> {
    fn show_question(&mut self, prompt: &str, options: &[i64; 4], counter: &str) {
        self.last_decile = None;
        self.print(format_args!("\n{counter}"));
        if self.sign_language {
            self.print(format_args!("  🤟 ┃ {prompt} ┃"));
        } else {
            self.print(format_args!("  {prompt}"));
        }
        let choices: Vec<String> = options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("[#{}] {option}", i + 1))
            .collect();
        self.print(format_args!("  {}", choices.join("   ")));
    }

    fn show_time_bar(&mut self, percent: f64, band: TimeBand) {
        let decile = (percent / 10.0).ceil() as u32;
        if self.last_decile == Some(decile) {
            return;
        }
        self.last_decile = Some(decile);
        self.print(format_args!("  ⏱ {}", render_bar(percent, band)));
    }

    fn set_low_time_cue(&mut self, on: bool) {
        if on && !self.low_time {
            self.print(format_args!("  ⚠ Pouco tempo!"));
        }
        self.low_time = on;
    }

    fn play_alert(&mut self) {
        self.prompt("\x07");
    }

    fn speak(&mut self, text: &str) {
        self.print(format_args!("  🔊 {text}"));
    }

    fn show_feedback(&mut self, message: &str, kind: FeedbackKind) {
        let marker = match kind {
            FeedbackKind::Success => "✔",
            FeedbackKind::Warning => "!",
            FeedbackKind::Error => "✖",
            FeedbackKind::Info => "ℹ",
        };
        self.print(format_args!("{marker} {message}"));
    }

    fn show_summary(&mut self, summary: &RoundSummary) {
        self.print(format_args!("\n=== Fim da rodada ==="));
        if summary.mode != Mode::ErrorTraining {
            self.print(format_args!("Pontuação: {}", summary.score));
        }
        self.print(format_args!(
            "Acertos: {} | Erros: {}",
            summary.hits, summary.misses
        ));
        if summary.mode != Mode::ErrorTraining {
            self.print(format_args!(
                "XP da rodada: {:+} | XP total: {}",
                summary.xp_delta, summary.xp_total
            ));
        }
        if summary.high_score {
            self.print(format_args!("🏆 Você entrou no ranking!"));
        }
        self.print(format_args!("{}", summary.suggestion.message()));
        self.print(format_args!("(Enter para voltar ao menu)"));
    }

    fn prompt_name(&mut self) -> Option<String> {
        self.prompt("🏆 Novo recorde! Digite seu nome: ");
        self.read_line_blocking()
    }
}

/// Text bar such as `[██████░░░░] 60%`.
pub fn render_bar(percent: f64, band: TimeBand) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let cell = match band {
        TimeBand::Plenty => '█',
        TimeBand::Warning => '▓',
        TimeBand::Low => '▒',
    };
    format!(
        "[{}{}] {:.0}%",
        cell.to_string().repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        percent
    )
}
