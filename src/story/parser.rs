//! Tolerant line scanner for decision points embedded in generated prose.
//!
//! The generator is asked to end a chapter with
//!
//! ```text
//! [DECISIÓN: ¿Qué decide el héroe?]
//! A) Luchar
//! B) Huir
//! ```
//!
//! but it follows that format loosely, so several interchangeable cues are
//! accepted. Only the first decision point of a chapter is honored and at most
//! [`MAX_OPTIONS`] options are surfaced. Text with no recognizable decision
//! point yields no options, which is how a finished story is signalled.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_OPTIONS: usize = 2;

/// Uppercased prefix of the bracketed marker; matches `[DECISIÓN:` and `[DECISION]`.
const DECISION_MARKER: &str = "[DECISI";

const QUESTION_OPENERS: &[&str] = &[
    "¿Qué decide",
    "¿Qué hace",
    "¿Qué debe",
    "¿Qué elige",
    "¿Qué camino",
    "¿Cuál es",
    "¿Cómo deben",
];

/// The generator sometimes resolves its own decision ("Supongamos que se elige A").
const ASSUMED_CHOICE: &str = "(Supongamos que";

const COMPLETION_BOILERPLATE: &str = "Historia interactiva completada";

static LETTER_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])\)\s*(\S.*)$").expect("valid option regex"));

static KEYWORD_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:opci[oó]n)\s+([A-Z])\s*:\s*(\S.*)$").expect("valid option regex")
});

/// One selectable branch of a decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    pub label: char,
    pub text: String,
}

impl DecisionOption {
    pub fn new(label: char, text: impl Into<String>) -> Self {
        Self { label, text: text.into() }
    }
}

impl fmt::Display for DecisionOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}) {}", self.label, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Prose,
    /// Generator leakage that never reaches the reader.
    Filtered,
    Question,
    Option(DecisionOption),
}

/// Returns the options of the first decision point in `text`, at most two.
pub fn extract_options(text: &str) -> Vec<DecisionOption> {
    let mut options: Vec<DecisionOption> = Vec::with_capacity(MAX_OPTIONS);
    let mut in_block = false;

    for kind in classify(text) {
        match kind {
            LineKind::Question if !in_block => in_block = true,
            // a second decision point is ignored
            LineKind::Question => break,
            LineKind::Option(option) if in_block => {
                if options.iter().any(|o| o.label == option.label) {
                    continue;
                }
                options.push(option);
                if options.len() == MAX_OPTIONS {
                    break;
                }
            }
            _ => {}
        }
    }

    options
}

/// Returns the prose preceding the first decision point, without generator
/// leakage, trimmed. Idempotent.
pub fn strip_decision_block(text: &str) -> String {
    let mut kept = Vec::new();

    for (line, kind) in text.split('\n').zip(classify(text)) {
        match kind {
            LineKind::Question | LineKind::Option(_) => break,
            LineKind::Filtered => continue,
            LineKind::Prose => kept.push(line),
        }
    }

    kept.join("\n").trim().to_string()
}

fn classify(text: &str) -> Vec<LineKind> {
    let lines: Vec<&str> = text.split('\n').map(normalize).collect();
    let mut kinds: Vec<LineKind> = lines.iter().map(|line| classify_line(line)).collect();

    // A generic question directly followed by an option line also opens a block.
    for i in 0..lines.len() {
        if kinds[i] != LineKind::Prose || !ends_with_question(lines[i]) {
            continue;
        }
        let next = (i + 1..lines.len())
            .find(|&j| !lines[j].is_empty() && kinds[j] != LineKind::Filtered);
        if matches!(next.map(|j| &kinds[j]), Some(LineKind::Option(_))) {
            kinds[i] = LineKind::Question;
        }
    }

    kinds
}

fn classify_line(line: &str) -> LineKind {
    if line.contains(ASSUMED_CHOICE) || line.contains(COMPLETION_BOILERPLATE) {
        return LineKind::Filtered;
    }
    if is_question_cue(line) {
        return LineKind::Question;
    }
    match parse_option(line) {
        Some(option) => LineKind::Option(option),
        None => LineKind::Prose,
    }
}

fn is_question_cue(line: &str) -> bool {
    line.to_uppercase().contains(DECISION_MARKER)
        || (ends_with_question(line) && QUESTION_OPENERS.iter().any(|opener| line.contains(opener)))
}

fn ends_with_question(line: &str) -> bool {
    line.trim_end_matches(|c: char| matches!(c, ']' | '"' | '»' | '*') || c.is_whitespace())
        .ends_with('?')
}

fn parse_option(line: &str) -> Option<DecisionOption> {
    let caps = LETTER_OPTION
        .captures(line)
        .or_else(|| KEYWORD_OPTION.captures(line))?;
    let label = caps.get(1)?.as_str().chars().next()?;
    let text = caps.get(2)?.as_str().trim().trim_end_matches('*').trim();
    if text.is_empty() {
        return None;
    }
    Some(DecisionOption::new(label, text))
}

/// Drops surrounding whitespace and markdown emphasis the generator likes to add.
fn normalize(line: &str) -> &str {
    line.trim().trim_start_matches(['*', '_']).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_letter_options_after_question() {
        let text = "Había una vez...\n¿Qué decide el héroe?\nA) Luchar\nB) Huir\nOtro texto";
        assert_eq!(
            extract_options(text),
            vec![DecisionOption::new('A', "Luchar"), DecisionOption::new('B', "Huir")]
        );
        assert_eq!(strip_decision_block(text), "Había una vez...");
    }

    #[test]
    fn keyword_options_parse_like_letter_options() {
        let letters = "El río crece.\n[DECISIÓN: ¿Qué hace Itzel?]\nA) Esperar\nB) Atacar";
        let keywords = "El río crece.\n[DECISIÓN: ¿Qué hace Itzel?]\nOpción A: Esperar\nOpción B: Atacar";
        assert_eq!(extract_options(letters), extract_options(keywords));
        assert_eq!(strip_decision_block(letters), strip_decision_block(keywords));
        assert_eq!(extract_options(keywords).len(), 2);
    }

    #[test]
    fn option_formats_may_be_mixed_per_line() {
        let text = "¿Qué decide Akbal?\nOpción A: Bajar al cenote\nB) Volver a Tikal";
        assert_eq!(
            extract_options(text),
            vec![
                DecisionOption::new('A', "Bajar al cenote"),
                DecisionOption::new('B', "Volver a Tikal"),
            ]
        );
    }

    #[test]
    fn assumed_choice_lines_are_filtered() {
        let text = "El jaguar ruge.\n(Supongamos que se elige X)\nLa selva calla.";
        assert_eq!(strip_decision_block(text), "El jaguar ruge.\nLa selva calla.");
        assert!(extract_options(text).is_empty());

        let leaked = "(Supongamos que se elige ¿Qué decide el héroe?)\nA) Luchar\nB) Huir";
        assert!(extract_options(leaked).is_empty());
    }

    #[test]
    fn assumed_choice_inside_block_is_not_an_option() {
        let text = "¿Qué decide el héroe?\nA) Luchar\n(Supongamos que se elige A)\nB) Huir";
        assert_eq!(
            extract_options(text),
            vec![DecisionOption::new('A', "Luchar"), DecisionOption::new('B', "Huir")]
        );
    }

    #[test]
    fn plain_text_has_no_options_and_is_only_trimmed() {
        let text = "  El sol se pone sobre Monte Albán.\n\n—¿Quién anda ahí? —preguntó.\nFin.  \n";
        assert!(extract_options(text).is_empty());
        assert_eq!(strip_decision_block(text), text.trim());
    }

    #[test]
    fn completion_boilerplate_is_filtered_without_a_block() {
        let text = "Y así terminó el viaje.\n\nHistoria interactiva completada.";
        assert_eq!(strip_decision_block(text), "Y así terminó el viaje.");
        assert!(extract_options(text).is_empty());
    }

    #[test]
    fn only_first_decision_point_is_honored() {
        let text = "Inicio.\n¿Qué decide el héroe?\nA) Luchar\n¿Qué hace la princesa?\nA) Cantar\nB) Correr";
        assert_eq!(extract_options(text), vec![DecisionOption::new('A', "Luchar")]);
    }

    #[test]
    fn extra_options_are_truncated() {
        let text = "[DECISIÓN: ¿Qué debe hacer el protagonista?]\nOpción A: Uno\nOpción B: Dos\nOpción C: Tres";
        let options = extract_options(text);
        assert_eq!(options.len(), 2);
        assert_eq!(options[1], DecisionOption::new('B', "Dos"));
    }

    #[test]
    fn options_without_question_cut_prose_but_offer_nothing() {
        let text = "Prosa.\nA) Luchar\nB) Huir";
        assert!(extract_options(text).is_empty());
        assert_eq!(strip_decision_block(text), "Prosa.");
    }

    #[test]
    fn generic_question_followed_by_options_opens_a_block() {
        let text = "Prosa.\n\n**¿Debe Akbal entrar al templo?**\n\n**A) Entrar**\n**B) Esperar**";
        assert_eq!(
            extract_options(text),
            vec![DecisionOption::new('A', "Entrar"), DecisionOption::new('B', "Esperar")]
        );
        assert_eq!(strip_decision_block(text), "Prosa.");
    }

    #[test]
    fn opener_without_question_mark_is_prose() {
        let text = "¿Qué decide el consejo, se preguntaba, mientras caminaba.\nFin.";
        assert_eq!(strip_decision_block(text), text);
    }

    #[test]
    fn stripping_is_idempotent_on_scenarios() {
        let text = "Había una vez...\r\n¿Qué decide el héroe?\r\nA) Luchar\r\nB) Huir";
        let once = strip_decision_block(text);
        assert_eq!(strip_decision_block(&once), once);
        assert!(extract_options(&once).is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn story_line() -> impl Strategy<Value = String> {
            prop_oneof![
                "[a-zA-Záéíóú ,.]{0,30}",
                Just("¿Qué decide el héroe?".to_string()),
                Just("[DECISIÓN: ¿Qué hace Itzel?]".to_string()),
                Just("¿Entrará al cenote?".to_string()),
                Just("A) Luchar".to_string()),
                Just("B) Huir".to_string()),
                Just("C) Esconderse".to_string()),
                Just("Opción A: Esperar".to_string()),
                Just("**B) Atacar**".to_string()),
                Just("(Supongamos que se elige A)".to_string()),
                Just("Historia interactiva completada".to_string()),
                Just(String::new()),
                Just("   ".to_string()),
            ]
        }

        proptest! {
            #[test]
            fn prop_strip_is_idempotent(lines in prop::collection::vec(story_line(), 0..12)) {
                let text = lines.join("\n");
                let once = strip_decision_block(&text);
                prop_assert_eq!(strip_decision_block(&once), once.clone());
                prop_assert!(extract_options(&once).is_empty());
            }

            #[test]
            fn prop_strip_is_idempotent_on_any_text(text in "\\PC*") {
                let once = strip_decision_block(&text);
                prop_assert_eq!(strip_decision_block(&once), once);
            }

            #[test]
            fn prop_options_are_bounded(lines in prop::collection::vec(story_line(), 0..16)) {
                let options = extract_options(&lines.join("\n"));
                prop_assert!(options.len() <= MAX_OPTIONS);
            }
        }
    }
}
