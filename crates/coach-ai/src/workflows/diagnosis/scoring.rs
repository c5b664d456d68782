//! Answer scoring policy. Every malformed or missing input degrades to the
//! neutral midpoint instead of failing: a diagnosis must always complete,
//! even over partial data.

use super::battery::{AnswerKind, Question};
use serde::{Deserialize, Serialize};

/// Raw submitted value for one question. The untagged representation accepts
/// the three JSON shapes the survey client sends: a number for sliders, a
/// string for single choices, and an array for multi-selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Scale(f64),
    Choice(String),
    Selections(Vec<String>),
}

/// Score awarded per zero-based choice index.
pub const SCORE_TIERS: [f64; 4] = [15.0, 40.0, 70.0, 100.0];

/// Fallback for missing or malformed answers.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Multi-select option meaning "no concerns apply".
pub const NO_CONCERN_SENTINEL: &str = "None of the above";

/// Score granted when the no-concern sentinel is selected.
pub const NO_CONCERN_SCORE: f64 = 90.0;

/// Map one answer against its question's policy to a score in [0, 100].
/// Pure; no error cases.
pub fn score(question: &Question, answer: Option<&AnswerValue>) -> f64 {
    match (question.kind, answer) {
        (AnswerKind::SingleChoice, Some(AnswerValue::Choice(label))) => {
            if question.choices.len() > SCORE_TIERS.len() {
                return NEUTRAL_SCORE;
            }
            question
                .choices
                .iter()
                .position(|choice| choice == label)
                .and_then(|index| SCORE_TIERS.get(index).copied())
                .unwrap_or(NEUTRAL_SCORE)
        }
        (AnswerKind::ScalarSlider, Some(AnswerValue::Scale(value))) => {
            (value * 10.0).clamp(0.0, 100.0)
        }
        (AnswerKind::MultiSelect, Some(AnswerValue::Selections(selected))) => {
            if selected.iter().any(|item| item == NO_CONCERN_SENTINEL) {
                return NO_CONCERN_SCORE;
            }
            let concerns = selected
                .iter()
                .filter(|item| item.as_str() != NO_CONCERN_SENTINEL)
                .count();
            if concerns == 0 {
                NEUTRAL_SCORE
            } else {
                (80.0 - 20.0 * concerns as f64).max(10.0)
            }
        }
        _ => NEUTRAL_SCORE,
    }
}
