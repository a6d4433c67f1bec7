//! Parsing of typed commands.

use matemagica_core::Mode;

/// Seconds bought by `tempo`, in ticks.
pub const EXTEND_TICKS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectMode(Mode),
    Play { operation: String, level: String },
    ToggleVoice,
    ToggleLibras,
    ListMistakes,
    Train,
    ClearMistakes,
    Ranking,
    ClearRanking,
    Xp,
    Help,
    Exit,
    /// Answer by value.
    Answer(i64),
    /// Answer by option position, 1-based.
    Choose(usize),
    ExtendTime,
    Reveal,
    GiveUp,
    Empty,
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Command::Empty;
    };

    if let Some(position) = head.strip_prefix('#') {
        return match position.parse::<usize>() {
            Ok(n @ 1..=4) => Command::Choose(n),
            _ => Command::Unknown(line.trim().to_string()),
        };
    }
    if let Ok(value) = head.parse::<i64>() {
        return Command::Answer(value);
    }

    match head.to_lowercase().as_str() {
        "rapido" | "rápido" => Command::SelectMode(Mode::Rapid),
        "estudo" => Command::SelectMode(Mode::Study),
        "jogar" => Command::Play {
            operation: words.next().unwrap_or_default().to_string(),
            level: words.next().unwrap_or_default().to_string(),
        },
        "voz" => Command::ToggleVoice,
        "libras" => Command::ToggleLibras,
        "erros" => Command::ListMistakes,
        "treinar" => Command::Train,
        "limpar-erros" => Command::ClearMistakes,
        "ranking" => Command::Ranking,
        "limpar-ranking" => Command::ClearRanking,
        "xp" => Command::Xp,
        "ajuda" | "?" => Command::Help,
        "sair" => Command::Exit,
        "tempo" => Command::ExtendTime,
        "resposta" => Command::Reveal,
        "desistir" => Command::GiveUp,
        _ => Command::Unknown(line.trim().to_string()),
    }
}

/// Whether a confirmation answer means yes.
pub fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}

pub const HELP: &str = "\
Menu:
  rapido | estudo            escolher o modo
  jogar <operação> <nível>   iniciar (ex.: jogar addition easy)
  voz | libras               alternar acessibilidade
  erros | treinar            ver ou treinar os últimos erros
  limpar-erros               apagar os erros salvos
  ranking | limpar-ranking   ver ou apagar o ranking
  xp                         ver sua experiência
  sair                       encerrar
Durante a rodada:
  <número> ou #1..#4         responder
  tempo                      +5 segundos (100 XP, modo rápido)
  resposta                   ver a resposta (250 XP no modo estudo)
  desistir                   cancelar a rodada
Operações: addition, subtraction, multiplication, division, potenciacao, radiciacao
Níveis: easy, medium, advanced";
