//! Spoken form of problem prompts for the speech collaborator.

use crate::generator::from_superscript;

const SUPERSCRIPTS: &str = "⁰¹²³⁴⁵⁶⁷⁸⁹";

/// Turn a displayed prompt such as `2³ = ?` into a pt-BR sentence.
pub fn narrate(prompt: &str) -> String {
    let expression = prompt.replace("= ?", "");
    let expression = expression.trim();
    if expression.is_empty() {
        return String::new();
    }

    let spoken = match expression.strip_prefix('√') {
        Some(radicand) => format!("raiz quadrada de {}", radicand.trim()),
        None => speak_operators(&speak_exponents(expression)),
    };

    format!("Qual é o resultado de {spoken}?")
}

/// Announcement for a new question.
pub fn announce(question_index: u32, prompt: &str) -> String {
    format!("Questão {question_index}. {}", narrate(prompt))
}

fn speak_exponents(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len() + 16);
    let mut exponent = String::new();

    for c in expression.chars() {
        if SUPERSCRIPTS.contains(c) {
            exponent.push(c);
            continue;
        }
        if !exponent.is_empty() {
            out.push_str(" elevado a ");
            out.push_str(&from_superscript(&exponent));
            exponent.clear();
        }
        out.push(c);
    }
    if !exponent.is_empty() {
        out.push_str(" elevado a ");
        out.push_str(&from_superscript(&exponent));
    }

    out
}

fn speak_operators(expression: &str) -> String {
    expression
        .split_whitespace()
        .map(|token| match token {
            "x" => "vezes",
            "+" => "mais",
            "-" => "menos",
            "÷" => "dividido por",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operators() {
        assert_eq!(narrate("12 + 7 = ?"), "Qual é o resultado de 12 mais 7?");
        assert_eq!(narrate("30 - 9 = ?"), "Qual é o resultado de 30 menos 9?");
        assert_eq!(narrate("6 x 7 = ?"), "Qual é o resultado de 6 vezes 7?");
        assert_eq!(
            narrate("56 ÷ 8 = ?"),
            "Qual é o resultado de 56 dividido por 8?"
        );
    }

    #[test]
    fn test_exponent_and_root() {
        assert_eq!(narrate("2³ = ?"), "Qual é o resultado de 2 elevado a 3?");
        assert_eq!(
            narrate("√144 = ?"),
            "Qual é o resultado de raiz quadrada de 144?"
        );
    }

    #[test]
    fn test_empty_prompt() {
        assert_eq!(narrate(""), "");
    }

    #[test]
    fn test_announce() {
        assert_eq!(
            announce(3, "4 + 4 = ?"),
            "Questão 3. Qual é o resultado de 4 mais 4?"
        );
    }
}
