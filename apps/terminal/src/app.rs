//! Terminal event loop.

use crate::command::{self, Command, EXTEND_TICKS, HELP};
use crate::terminal::TerminalFrontend;
use crate::ticker::Ticker;
use chrono::Local;
use matemagica_core::{
    FeedbackKind, Frontend, KeyValueStore, Mode, QuizError, Session, SessionState, TickOutcome,
};
use std::io::Write;
use std::time::Duration;
use tokio::time::Instant;

/// Mistakes listed by `erros`.
const LISTED_MISTAKES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    ClearMistakes,
    ClearRanking,
}

/// Single owner of the session. Every input, tick and deferred advance is
/// handled here, one at a time.
pub struct App<S: KeyValueStore, W: Write> {
    session: Session<S>,
    ui: TerminalFrontend<W>,
    ticker: Ticker,
    mode: Mode,
    advance_at: Option<Instant>,
    awaiting: Option<Confirm>,
}

impl<S: KeyValueStore, W: Write> App<S, W> {
    pub fn new(session: Session<S>, ui: TerminalFrontend<W>, mode: Mode) -> Self {
        Self {
            session,
            ui,
            ticker: Ticker::new(),
            mode,
            advance_at: None,
            awaiting: None,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.ui.into_inner()
    }

    pub fn greet(&mut self) {
        self.ui.print(format_args!("🧮 Matemágica"));
        self.ui.print(format_args!(
            "XP: {} | Modo: {}",
            self.session.xp(),
            mode_label(self.mode)
        ));
        self.ui
            .print(format_args!("Digite 'ajuda' para ver os comandos."));
    }

    /// Run until `sair` or end of input.
    pub async fn run(&mut self) {
        loop {
            let deadline = self.advance_at;
            let flow = tokio::select! {
                line = self.ui.next_line() => match line {
                    Some(line) => self.handle_line(&line),
                    None => Flow::Exit,
                },
                () = self.ticker.tick() => {
                    self.on_tick();
                    Flow::Continue
                }
                () = wait_until(deadline) => {
                    self.on_deferred();
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
            self.sync_ticker();
        }

        self.ticker.stop();
        self.session.quit(&mut self.ui);
        self.ui.print(format_args!("Até logo!"));
    }

    pub fn handle_line(&mut self, line: &str) -> Flow {
        if let Some(confirm) = self.awaiting.take() {
            self.confirm(confirm, command::is_yes(line));
            return Flow::Continue;
        }

        if self.session.state() == SessionState::Ended {
            self.session.return_to_menu();
            self.ui
                .print(format_args!("\nMenu (modo {}).", mode_label(self.mode)));
        }

        let command = command::parse(line);
        tracing::debug!(?command, "command received");
        if self.session.is_active() {
            self.handle_round(command)
        } else {
            self.handle_menu(command)
        }
    }

    fn handle_menu(&mut self, command: Command) -> Flow {
        match command {
            Command::SelectMode(mode) => {
                self.mode = mode;
                self.ui
                    .print(format_args!("Modo selecionado: {}", mode_label(mode)));
            }
            Command::Play { operation, level } => {
                // Failures are already reported through the frontend.
                let _ = self
                    .session
                    .start(&operation, &level, self.mode, &mut self.ui);
            }
            Command::ToggleVoice => {
                let on = !self.session.accessibility().voice_narration;
                self.session.set_voice_narration(on);
                let message = if on {
                    "Leitura de Voz ativada!"
                } else {
                    "Leitura de Voz desativada!"
                };
                self.ui.show_feedback(message, FeedbackKind::Info);
                if on {
                    self.ui.speak(message);
                }
            }
            Command::ToggleLibras => {
                let on = !self.session.accessibility().sign_language_mode;
                self.session.set_sign_language_mode(on);
                self.ui.set_sign_language(on);
                let message = if on {
                    "Modo Libras ativado!"
                } else {
                    "Modo Libras desativado!"
                };
                self.ui.show_feedback(message, FeedbackKind::Info);
            }
            Command::ListMistakes => self.list_mistakes(),
            Command::Train => {
                let _ = self.session.start_error_training(&mut self.ui);
            }
            Command::ClearMistakes => {
                self.awaiting = Some(Confirm::ClearMistakes);
                self.ui.prompt("Apagar todos os erros salvos? (s/n) ");
            }
            Command::Ranking => self.list_ranking(),
            Command::ClearRanking => {
                self.awaiting = Some(Confirm::ClearRanking);
                self.ui.prompt("Apagar o ranking? (s/n) ");
            }
            Command::Xp => {
                self.ui
                    .print(format_args!("XP: {}", self.session.xp()));
            }
            Command::Help => self.ui.print(format_args!("{HELP}")),
            Command::Exit => return Flow::Exit,
            Command::Answer(_)
            | Command::Choose(_)
            | Command::ExtendTime
            | Command::Reveal
            | Command::GiveUp => {
                self.ui.print(format_args!(
                    "Nenhuma rodada em andamento. Use 'jogar <operação> <nível>'."
                ));
            }
            Command::Empty => {}
            Command::Unknown(text) => {
                self.ui.print(format_args!(
                    "Comando desconhecido: {text}. Digite 'ajuda'."
                ));
            }
        }
        Flow::Continue
    }

    fn handle_round(&mut self, command: Command) -> Flow {
        match command {
            Command::Answer(value) => self.submit(value),
            Command::Choose(position) => {
                let option = self
                    .session
                    .round()
                    .and_then(|round| round.current_problem())
                    .map(|problem| problem.options[position - 1]);
                if let Some(value) = option {
                    self.submit(value);
                }
            }
            Command::ExtendTime => match self.session.extend_time(EXTEND_TICKS, &mut self.ui) {
                Err(QuizError::WrongMode(_)) => {
                    self.ui
                        .print(format_args!("Disponível apenas no modo rápido."));
                }
                Ok(_) | Err(_) => {}
            },
            Command::Reveal => match self.session.reveal_answer(&mut self.ui) {
                Ok(delay) => self.schedule_advance(delay),
                Err(QuizError::WrongMode(_)) => {
                    self.ui.print(format_args!(
                        "Disponível apenas no modo estudo e no treino de erros."
                    ));
                }
                Err(_) => {}
            },
            Command::GiveUp => {
                self.advance_at = None;
                self.session.quit(&mut self.ui);
            }
            Command::Exit => return Flow::Exit,
            Command::Help => self.ui.print(format_args!("{HELP}")),
            Command::Empty => {}
            _ => {
                self.ui.print(format_args!(
                    "Comando indisponível durante a rodada. Digite 'desistir' para sair."
                ));
            }
        }
        Flow::Continue
    }

    fn submit(&mut self, value: i64) {
        match self.session.submit_answer(value, &mut self.ui) {
            Some(outcome) => {
                if !outcome.correct {
                    self.ui
                        .print(format_args!("  Resposta certa: {}", outcome.correct_answer));
                }
                self.schedule_advance(outcome.advance_after);
            }
            None => self.ui.print(format_args!("Aguarde a próxima questão.")),
        }
    }

    fn confirm(&mut self, confirm: Confirm, yes: bool) {
        if !yes {
            self.ui.print(format_args!("Cancelado."));
            return;
        }
        match confirm {
            Confirm::ClearMistakes => {
                self.session.clear_mistakes();
                self.ui
                    .show_feedback("Erros apagados.", FeedbackKind::Success);
            }
            Confirm::ClearRanking => {
                self.session.clear_high_scores();
                self.ui
                    .show_feedback("Ranking apagado.", FeedbackKind::Success);
            }
        }
    }

    fn list_mistakes(&mut self) {
        let lines: Vec<String> = self
            .session
            .mistakes()
            .recent(LISTED_MISTAKES)
            .iter()
            .map(|record| {
                format!(
                    "  {} | sua resposta: {} | correta: {} ({})",
                    record.prompt,
                    record.given_answer,
                    record.correct_answer,
                    record.recorded_at.with_timezone(&Local).format("%d/%m %H:%M")
                )
            })
            .collect();

        if lines.is_empty() {
            self.ui.print(format_args!("Nenhum erro salvo ainda."));
            return;
        }
        self.ui.print(format_args!(
            "Últimos erros ({} salvos):",
            self.session.mistakes().len()
        ));
        for line in lines {
            self.ui.print(format_args!("{line}"));
        }
    }

    fn list_ranking(&mut self) {
        let lines: Vec<String> = self
            .session
            .high_scores()
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "  {:>2}. {} - {} pts ({}, {}) {}",
                    i + 1,
                    entry.display_name,
                    entry.score,
                    entry.operation.label(),
                    entry.level.label(),
                    entry.achieved_at.with_timezone(&Local).format("%d/%m/%Y")
                )
            })
            .collect();

        if lines.is_empty() {
            self.ui.print(format_args!("Ranking vazio."));
            return;
        }
        self.ui.print(format_args!("🏆 Ranking"));
        for line in lines {
            self.ui.print(format_args!("{line}"));
        }
    }

    fn schedule_advance(&mut self, delay: Duration) {
        self.advance_at = Some(Instant::now() + delay);
    }

    fn on_deferred(&mut self) {
        self.advance_at = None;
        if let Err(e) = self.session.advance(&mut self.ui) {
            tracing::debug!(error = %e, "deferred advance skipped");
        }
    }

    fn on_tick(&mut self) {
        if self.session.tick(&mut self.ui) == TickOutcome::Expired {
            self.advance_at = None;
        }
    }

    /// Run the ticker exactly while the countdown is running.
    fn sync_ticker(&mut self) {
        match (self.session.timer_running(), self.ticker.is_running()) {
            (true, false) => self.ticker.start(),
            (false, true) => self.ticker.stop(),
            _ => {}
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Rapid => "Rápido",
        Mode::Study => "Estudo",
        Mode::ErrorTraining => "Treino de erros",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matemagica_core::store::{HIGH_SCORES_KEY, XP_KEY};
    use matemagica_core::{HighScoreEntry, Level, MemoryStore, Operation};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::mpsc;

    type TestApp = App<MemoryStore, Vec<u8>>;

    fn app_with_store(store: MemoryStore) -> (TestApp, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session::with_rng(store, StdRng::seed_from_u64(5));
        let ui = TerminalFrontend::new(Vec::new(), rx);
        (App::new(session, ui, Mode::Rapid), tx)
    }

    fn app() -> (TestApp, mpsc::UnboundedSender<String>) {
        app_with_store(MemoryStore::new())
    }

    fn output(app: TestApp) -> String {
        String::from_utf8(app.into_output()).unwrap()
    }

    fn answer(app: &TestApp) -> i64 {
        app.session
            .round()
            .unwrap()
            .current_problem()
            .unwrap()
            .correct_answer
    }

    /// Store whose high-score table no low score can enter.
    fn full_ranking() -> MemoryStore {
        let entries: Vec<HighScoreEntry> = (0..10)
            .map(|i| HighScoreEntry {
                display_name: format!("p{i}"),
                score: 10_000 + i,
                operation: Operation::Addition,
                level: Level::Easy,
                achieved_at: chrono::Utc::now(),
            })
            .collect();
        let mut store = MemoryStore::new();
        store
            .set(HIGH_SCORES_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();
        store
    }

    #[test]
    fn test_play_starts_round_in_selected_mode() {
        let (mut app, _tx) = app();
        app.handle_line("estudo");
        app.handle_line("jogar division medium");

        assert_eq!(app.session.state(), SessionState::Active(Mode::Study));
        assert!(!app.session.timer_running());
    }

    #[test]
    fn test_play_without_arguments_reports_error() {
        let (mut app, _tx) = app();
        app.handle_line("jogar");

        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(output(app).contains("Erro: Operação ou Nível não selecionados!"));
    }

    #[test]
    fn test_answer_by_position_schedules_advance() {
        let (mut app, _tx) = app();
        app.handle_line("estudo");
        app.handle_line("jogar addition easy");

        let correct = answer(&app);
        let options = app.session.round().unwrap().current_problem().unwrap().options;
        let position = options.iter().position(|&o| o == correct).unwrap() + 1;
        app.handle_line(&format!("#{position}"));

        assert_eq!(app.session.xp(), 2);
        assert!(app.advance_at.is_some());

        app.handle_line(&correct.to_string());
        app.on_deferred();
        assert_eq!(app.session.round().unwrap().question_index(), 2);
        assert!(app.advance_at.is_none());

        let text = output(app);
        assert!(text.contains("RESPOSTA CORRETA!"));
        assert!(text.contains("Aguarde a próxima questão."));
    }

    #[test]
    fn test_wrong_answer_shows_correct_one() {
        let (mut app, _tx) = app();
        app.handle_line("jogar subtraction easy");
        let correct = answer(&app);
        app.handle_line(&(correct + 1).to_string());

        assert_eq!(app.session.mistakes().len(), 1);
        assert!(output(app).contains(&format!("Resposta certa: {correct}")));
    }

    #[test]
    fn test_menu_commands_are_rejected_during_round() {
        let (mut app, _tx) = app();
        app.handle_line("jogar addition easy");
        app.handle_line("ranking");
        app.handle_line("resposta");
        app.handle_line("desistir");

        assert_eq!(app.session.state(), SessionState::Idle);
        let text = output(app);
        assert!(text.contains("Comando indisponível durante a rodada."));
        assert!(text.contains("Disponível apenas no modo estudo e no treino de erros."));
        assert!(text.contains("Rodada cancelada."));
    }

    #[test]
    fn test_clear_mistakes_asks_for_confirmation() {
        let (mut app, _tx) = app();
        app.handle_line("jogar addition easy");
        let wrong = answer(&app) + 1;
        app.handle_line(&wrong.to_string());
        app.handle_line("desistir");

        app.handle_line("limpar-erros");
        app.handle_line("n");
        assert_eq!(app.session.mistakes().len(), 1);

        app.handle_line("limpar-erros");
        app.handle_line("s");
        assert!(app.session.mistakes().is_empty());
    }

    #[test]
    fn test_toggles_affect_round_time() {
        let (mut app, _tx) = app();
        app.handle_line("libras");
        app.handle_line("jogar addition easy");

        assert_eq!(app.session.round().unwrap().time_max(), Some(300));
        assert!(output(app).contains("Modo Libras ativado!"));
    }

    #[test]
    fn test_extend_time_without_xp() {
        let mut store = MemoryStore::new();
        store.set(XP_KEY, "120").unwrap();
        let (mut app, _tx) = app_with_store(store);
        app.handle_line("jogar addition easy");
        for _ in 0..30 {
            app.on_tick();
        }
        app.handle_line("tempo");
        app.handle_line("tempo");

        assert_eq!(app.session.xp(), 20);
        assert_eq!(app.session.round().unwrap().time_remaining(), Some(150));
        let text = output(app);
        assert!(text.contains("Tempo estendido! +3 segundos!"));
        assert!(text.contains("XP insuficiente. Você precisa de 100 XP!"));
    }

    #[test]
    fn test_lists_empty_collections() {
        let (mut app, _tx) = app();
        app.handle_line("erros");
        app.handle_line("ranking");
        app.handle_line("xp");

        let text = output(app);
        assert!(text.contains("Nenhum erro salvo ainda."));
        assert!(text.contains("Ranking vazio."));
        assert!(text.contains("XP: 0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_exits_on_command() {
        let (mut app, tx) = app();
        for line in ["estudo", "jogar addition easy", "xp", "sair"] {
            tx.send(line.to_string()).unwrap();
        }
        app.run().await;

        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(output(app).contains("Até logo!"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_expires_rapid_round() {
        let (mut app, tx) = app_with_store(full_ranking());
        tx.send("jogar addition easy".to_string()).unwrap();

        let finished = tokio::time::timeout(Duration::from_secs(20), app.run()).await;
        assert!(finished.is_err());
        assert_eq!(app.session.state(), SessionState::Ended);
        assert!(app.session.last_summary().unwrap().timed_out);
        assert!(!app.ticker.is_running());
        assert!(output(app).contains("Tempo esgotado! Game Over!"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_qualifying_round_prompts_for_name() {
        let (mut app, tx) = app();
        tx.send("Ana".to_string()).unwrap();
        app.handle_line("jogar addition easy");
        for _ in 0..20 {
            let correct = answer(&app);
            app.handle_line(&correct.to_string());
            app.on_deferred();
        }

        assert_eq!(app.session.state(), SessionState::Ended);
        let entries = app.session.high_scores().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Ana");
        assert_eq!(entries[0].score, app.session.last_summary().unwrap().score);
        assert!(app.session.last_summary().unwrap().high_score);
        assert!(output(app).contains("Novo recorde! Digite seu nome:"));
    }
}
