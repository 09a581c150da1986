// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::assessment::{AssessmentItem, AssessmentItemType};

/// Represents the 'assessment_items' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: i64,

    pub course_id: i64,

    /// 'multiple_choice', 'identification' or 'true_or_false'.
    /// Mapped from the database column 'type' since `type` is a reserved keyword in Rust.
    #[sqlx(rename = "type")]
    pub item_type: String,

    pub question: String,

    /// The four options of a multiple-choice item, NULL otherwise.
    pub choices: Option<Json<Vec<String>>>,

    /// The correct answer.
    pub answer: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl StoredItem {
    pub fn kind(&self) -> Result<AssessmentItemType, String> {
        self.item_type.parse()
    }
}

impl TryFrom<&StoredItem> for AssessmentItem {
    type Error = String;

    fn try_from(row: &StoredItem) -> Result<Self, Self::Error> {
        let question = row.question.clone();
        let answer = row.answer.clone();

        match row.kind()? {
            AssessmentItemType::MultipleChoice => {
                let choices = row
                    .choices
                    .as_ref()
                    .map(|c| c.0.clone())
                    .unwrap_or_default();
                let choices: [String; 4] = choices.try_into().map_err(|c: Vec<String>| {
                    format!("Item {} has {} choices, expected 4", row.id, c.len())
                })?;
                Ok(AssessmentItem::MultipleChoice { question, choices, answer })
            }
            AssessmentItemType::Identification => {
                Ok(AssessmentItem::Identification { question, answer })
            }
            AssessmentItemType::TrueOrFalse => Ok(AssessmentItem::TrueOrFalse { question, answer }),
        }
    }
}

/// DTO for sending an item to the client (excludes answer).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub item_type: String,
    pub question: String,
    pub choices: Option<Vec<String>>,
}

impl From<StoredItem> for PublicItem {
    fn from(row: StoredItem) -> Self {
        Self {
            id: row.id,
            item_type: row.item_type,
            question: row.question,
            choices: row.choices.map(|c| c.0),
        }
    }
}

/// DTO for creating a new item.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    pub course_id: i64,
    #[serde(rename = "type")]
    pub item_type: AssessmentItemType,
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_choices))]
    pub choices: Option<Vec<String>>,
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
}

impl CreateItemRequest {
    /// Checks the fields that depend on the item type.
    pub fn check_shape(&self) -> Result<(), String> {
        match self.item_type {
            AssessmentItemType::MultipleChoice => {
                let choices = self
                    .choices
                    .as_ref()
                    .ok_or("Multiple-choice items need choices")?;
                if choices.len() != 4 {
                    return Err("Multiple-choice items need exactly 4 choices".to_string());
                }
                if !choices.iter().any(|c| c.eq_ignore_ascii_case(&self.answer)) {
                    return Err("Answer must be one of the choices".to_string());
                }
            }
            AssessmentItemType::TrueOrFalse => {
                if self.choices.is_some() {
                    return Err("True/false items take no choices".to_string());
                }
                let answer = self.answer.to_lowercase();
                if answer != "true" && answer != "false" {
                    return Err("True/false answer must be 'True' or 'False'".to_string());
                }
            }
            AssessmentItemType::Identification => {
                if self.choices.is_some() {
                    return Err("Identification items take no choices".to_string());
                }
            }
        }
        Ok(())
    }
}

fn validate_choices(choices: &[String]) -> Result<(), validator::ValidationError> {
    for choice in choices {
        if choice.is_empty() || choice.len() > 500 {
            return Err(validator::ValidationError::new("invalid_choice_length"));
        }
    }
    Ok(())
}
