//! Core types for the arithmetic quiz.

use crate::error::QuizError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Arithmetic operation a round is played with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    #[serde(alias = "potenciacao")]
    Exponentiation,
    #[serde(alias = "radiciacao")]
    SquareRoot,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
        Self::Exponentiation,
        Self::SquareRoot,
    ];

    /// Get the operation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Exponentiation => "exponentiation",
            Self::SquareRoot => "square-root",
        }
    }

    /// Name shown to the learner.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Addition => "adição",
            Self::Subtraction => "subtração",
            Self::Multiplication => "multiplicação",
            Self::Division => "divisão",
            Self::Exponentiation => "potenciação",
            Self::SquareRoot => "radiciação",
        }
    }
}

impl FromStr for Operation {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "addition" => Ok(Self::Addition),
            "subtraction" => Ok(Self::Subtraction),
            "multiplication" => Ok(Self::Multiplication),
            "division" => Ok(Self::Division),
            "exponentiation" | "potenciacao" => Ok(Self::Exponentiation),
            "square-root" | "radiciacao" => Ok(Self::SquareRoot),
            _ => Err(QuizError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Easy,
    Medium,
    Advanced,
}

impl Level {
    /// Scaling factor applied to operand ranges.
    pub fn multiplier(self) -> i64 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Advanced => 3,
        }
    }

    /// Rapid-mode time budget in ticks (10 ticks per second).
    pub fn base_time(self) -> u32 {
        match self {
            Self::Easy => 150,
            Self::Medium => 300,
            Self::Advanced => 450,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Advanced => "advanced",
        }
    }

    /// Name shown to the learner.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "fácil",
            Self::Medium => "médio",
            Self::Advanced => "avançado",
        }
    }
}

impl FromStr for Level {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "advanced" => Ok(Self::Advanced),
            _ => Err(QuizError::UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// 20 timed questions, eligible for the high-score table.
    #[default]
    Rapid,
    /// Untimed and unbounded, with paid answer reveal.
    Study,
    /// Replay of saved mistakes.
    ErrorTraining,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rapid => "rapid",
            Self::Study => "study",
            Self::ErrorTraining => "error_training",
        }
    }
}

/// A multiple-choice problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub prompt: String,
    pub correct_answer: i64,
    /// Four distinct non-negative options, one of them the correct answer.
    pub options: [i64; 4],
    pub operation: Operation,
    /// Operands as generated (`num1`, `num2`). For square roots the second
    /// operand is unused and set to 2.
    pub operands: (i64, i64),
    /// Timestamp of the mistake this problem was rebuilt from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<DateTime<Utc>>,
}

impl Problem {
    /// Whether a candidate answer is correct.
    pub fn is_correct(&self, candidate: i64) -> bool {
        candidate == self.correct_answer
    }
}

/// A wrong answer saved for later retraining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakeRecord {
    pub prompt: String,
    pub correct_answer: i64,
    pub given_answer: i64,
    pub operation: Operation,
    pub recorded_at: DateTime<Utc>,
}

impl MistakeRecord {
    /// Build a record for a wrong answer to `problem`.
    pub fn new(problem: &Problem, given_answer: i64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            prompt: problem.prompt.clone(),
            correct_answer: problem.correct_answer,
            given_answer,
            operation: problem.operation,
            recorded_at,
        }
    }
}

/// A completed Rapid run on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub display_name: String,
    pub score: u32,
    pub operation: Operation,
    pub level: Level,
    pub achieved_at: DateTime<Utc>,
}

/// Accessibility toggles that affect timing and narration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessibility {
    pub voice_narration: bool,
    pub sign_language_mode: bool,
}

impl Accessibility {
    /// Whether any accessibility mode is on (doubles Rapid time).
    pub fn is_active(&self) -> bool {
        self.voice_narration || self.sign_language_mode
    }
}
