//! Command-line arguments.

use clap::{Parser, ValueEnum};
use matemagica_core::Mode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Quiz de aritmética no terminal", long_about = None)]
pub struct Cli {
    /// SQLite file holding XP, mistakes and high scores.
    #[arg(long, env = "MATEMAGICA_DB")]
    pub db: Option<PathBuf>,

    /// Start with voice narration on.
    #[arg(long, default_value_t = false)]
    pub voice: bool,

    /// Start with the sign-language visual mode on.
    #[arg(long, default_value_t = false)]
    pub libras: bool,

    /// Initially selected mode.
    #[arg(long, value_enum, default_value_t = StartMode::Rapid)]
    pub mode: StartMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StartMode {
    Rapid,
    Study,
}

impl From<StartMode> for Mode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Rapid => Mode::Rapid,
            StartMode::Study => Mode::Study,
        }
    }
}

impl Cli {
    /// Database path, defaulting to the user's local data directory.
    pub fn db_path(&self) -> PathBuf {
        self.db.clone().unwrap_or_else(default_db_path)
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matemagica")
        .join("matemagica.db")
}
