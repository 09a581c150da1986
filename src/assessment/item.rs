// src/assessment/item.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of an assessment. Selects the passing threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentItemType {
    MultipleChoice,
    Identification,
    TrueOrFalse,
}

impl AssessmentItemType {
    /// Passing ratio a user's `score / items` must meet or exceed.
    pub fn evaluator(self) -> f64 {
        match self {
            AssessmentItemType::MultipleChoice => 0.75,
            AssessmentItemType::Identification => 0.60,
            AssessmentItemType::TrueOrFalse => 0.90,
        }
    }

    /// Database / query-string representation.
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentItemType::MultipleChoice => "multiple_choice",
            AssessmentItemType::Identification => "identification",
            AssessmentItemType::TrueOrFalse => "true_or_false",
        }
    }
}

impl fmt::Display for AssessmentItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssessmentItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(AssessmentItemType::MultipleChoice),
            "identification" => Ok(AssessmentItemType::Identification),
            "true_or_false" => Ok(AssessmentItemType::TrueOrFalse),
            other => Err(format!("Unknown assessment type '{}'", other)),
        }
    }
}

/// One question together with its authoritative answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssessmentItem {
    MultipleChoice {
        question: String,
        choices: [String; 4],
        answer: String,
    },
    Identification {
        question: String,
        answer: String,
    },
    TrueOrFalse {
        question: String,
        answer: String,
    },
}

impl AssessmentItem {
    pub fn kind(&self) -> AssessmentItemType {
        match self {
            AssessmentItem::MultipleChoice { .. } => AssessmentItemType::MultipleChoice,
            AssessmentItem::Identification { .. } => AssessmentItemType::Identification,
            AssessmentItem::TrueOrFalse { .. } => AssessmentItemType::TrueOrFalse,
        }
    }

    pub fn correct_answer(&self) -> &str {
        match self {
            AssessmentItem::MultipleChoice { answer, .. }
            | AssessmentItem::Identification { answer, .. }
            | AssessmentItem::TrueOrFalse { answer, .. } => answer,
        }
    }

    /// Case-insensitive match. An empty submission never matches.
    pub fn is_correct(&self, submitted: &str) -> bool {
        !submitted.is_empty() && submitted.to_lowercase() == self.correct_answer().to_lowercase()
    }
}
