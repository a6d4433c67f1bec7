//! Question generation.
//!
//! Operand ranges widen with the level multiplier. Division and square
//! roots are built backwards from the answer so results are always exact
//! integers.

use crate::types::{Level, MistakeRecord, Operation, Problem};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of answer options per problem.
pub const OPTION_COUNT: usize = 4;

/// Guard against windows that cannot yield enough non-negative candidates.
const MAX_DRAWS: usize = 1_000;

/// Generate a problem for an operation and level.
pub fn generate<R: Rng + ?Sized>(operation: Operation, level: Level, rng: &mut R) -> Problem {
    let d = level.multiplier();
    let advanced = level == Level::Advanced;

    let (num1, num2, answer, prompt) = match operation {
        Operation::Addition => {
            let a = rng.random_range(10 * d..=50 * d);
            let b = rng.random_range(5 * d..=25 * d);
            (a, b, a + b, format!("{a} + {b}"))
        }
        Operation::Subtraction => {
            let a = rng.random_range(20 * d..=80 * d);
            let b = rng.random_range(5 * d..=a - 10 * d);
            (a, b, a - b, format!("{a} - {b}"))
        }
        Operation::Multiplication => {
            let a = rng.random_range(2..=if advanced { 25 } else { 12 });
            let b = rng.random_range(2..=if advanced { 15 } else { 10 });
            (a, b, a * b, format!("{a} x {b}"))
        }
        Operation::Division => {
            let divisor = rng.random_range(2..=if advanced { 12 } else { 8 });
            let quotient = rng.random_range(2..=if advanced { 20 } else { 10 });
            let dividend = divisor * quotient;
            (dividend, divisor, quotient, format!("{dividend} ÷ {divisor}"))
        }
        Operation::Exponentiation => {
            let base: i64 = rng.random_range(2..=if advanced { 8 } else { 5 });
            let exponent: u32 = rng.random_range(2..=if advanced { 5 } else { 4 });
            (
                base,
                i64::from(exponent),
                base.pow(exponent),
                format!("{base}{}", to_superscript(i64::from(exponent))),
            )
        }
        Operation::SquareRoot => {
            let root = rng.random_range(2..=if advanced { 15 } else { 12 });
            let radicand = root * root;
            (radicand, 2, root, format!("√{radicand}"))
        }
    };

    Problem {
        prompt: format!("{prompt} = ?"),
        correct_answer: answer,
        options: distractor_options(answer, normal_spread(answer), rng),
        operation,
        operands: (num1, num2),
        source_reference: None,
    }
}

/// Rebuild a problem from a saved mistake for error training.
///
/// Uses a wider distractor spread than fresh problems and keeps a
/// back-reference to the record so a correct answer can delete it.
pub fn build_from_mistake<R: Rng + ?Sized>(record: &MistakeRecord, rng: &mut R) -> Problem {
    let answer = record.correct_answer;
    Problem {
        prompt: record.prompt.trim().to_string(),
        correct_answer: answer,
        options: distractor_options(answer, training_spread(answer), rng),
        operation: record.operation,
        operands: (answer, 0),
        source_reference: Some(record.recorded_at),
    }
}

/// Spread for fresh problems: `max(1, round(0.1·|answer|))`.
pub fn normal_spread(answer: i64) -> i64 {
    ((answer.abs() + 5) / 10).max(1)
}

/// Spread for training problems: `max(2, round(0.15·|answer|))`.
pub fn training_spread(answer: i64) -> i64 {
    ((answer.abs() * 15 + 50) / 100).max(2)
}

/// Build four shuffled options around `answer`.
///
/// Candidates are drawn from `answer ± 5·spread` and must be non-negative,
/// unique and different from the answer.
pub fn distractor_options<R: Rng + ?Sized>(answer: i64, spread: i64, rng: &mut R) -> [i64; 4] {
    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(answer);

    let mut draws = 0;
    while options.len() < OPTION_COUNT && draws < MAX_DRAWS {
        draws += 1;
        let candidate = answer + rng.random_range(-5 * spread..=5 * spread);
        if candidate >= 0 && candidate != answer && !options.contains(&candidate) {
            options.push(candidate);
        }
    }

    // Only reachable for a negative answer read back from a damaged record.
    let mut filler = 0;
    while options.len() < OPTION_COUNT {
        if !options.contains(&filler) {
            options.push(filler);
        }
        filler += 1;
    }

    options.shuffle(rng);
    [options[0], options[1], options[2], options[3]]
}

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Render a non-negative number with superscript digits.
pub fn to_superscript(n: i64) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(digit) => SUPERSCRIPT_DIGITS[digit as usize],
            None => c,
        })
        .collect()
}

/// Convert superscript digits back to ASCII digits.
pub fn from_superscript(text: &str) -> String {
    text.chars()
        .map(|c| match SUPERSCRIPT_DIGITS.iter().position(|&s| s == c) {
            Some(digit) => char::from(b'0' + digit as u8),
            None => c,
        })
        .collect()
}
