// src/assessment/scorer.rs

use serde::Serialize;
use thiserror::Error;

use super::item::{AssessmentItem, AssessmentItemType};

/// Precondition violations when scoring an assessment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Assessment has no items")]
    Empty,

    #[error("Got {answers} answers for {items} items")]
    LengthMismatch { items: usize, answers: usize },

    #[error("Item {index} is {found}, expected {expected}")]
    KindMismatch {
        index: usize,
        expected: AssessmentItemType,
        found: AssessmentItemType,
    },
}

/// Outcome of one scored attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u32,
    pub items: u32,
    pub evaluator: f64,
}

/// Scores `answers` against `items` position by position.
///
/// `items` and `answers` must be the same non-zero length and every item
/// must be of `kind`; anything else is rejected rather than truncated.
pub fn score(
    items: &[AssessmentItem],
    answers: &[String],
    kind: AssessmentItemType,
) -> Result<ScoreResult, ScoreError> {
    if items.len() != answers.len() {
        return Err(ScoreError::LengthMismatch {
            items: items.len(),
            answers: answers.len(),
        });
    }
    if items.is_empty() {
        return Err(ScoreError::Empty);
    }

    let mut correct = 0u32;
    for (index, (item, answer)) in items.iter().zip(answers).enumerate() {
        if item.kind() != kind {
            return Err(ScoreError::KindMismatch {
                index,
                expected: kind,
                found: item.kind(),
            });
        }
        if item.is_correct(answer) {
            correct += 1;
        }
    }

    Ok(ScoreResult {
        score: correct,
        items: items.len() as u32,
        evaluator: kind.evaluator(),
    })
}
