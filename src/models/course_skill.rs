// src/models/course_skill.rs

use serde::Serialize;
use sqlx::FromRow;

use crate::assessment::{CourseSkillRecord, Role};

/// Represents a 'course_skills' row joined with its course name.
#[derive(Debug, Clone, FromRow)]
pub struct CourseSkillRow {
    pub user_id: i64,
    pub course_id: i64,
    pub course_name: String,
    pub taken: i32,
    pub total_score: i64,
    pub total_items: i64,
    pub total_evaluator: f64,
    pub role: String,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CourseSkillRow {
    /// Rebuilds the record from its totals; the stored role column is only a
    /// denormalized copy for queries.
    pub fn record(&self) -> CourseSkillRecord {
        CourseSkillRecord::from_totals(
            self.taken.max(0) as u32,
            self.total_score.max(0) as u64,
            self.total_items.max(0) as u64,
            self.total_evaluator,
        )
    }
}

/// Course-skill record as shown to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CourseSkillResponse {
    pub course_id: i64,
    pub course_name: String,
    pub taken: u32,
    pub total_score: u64,
    pub total_items: u64,
    pub total_evaluator: f64,
    pub average_evaluator: f64,
    pub role: Role,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&CourseSkillRow> for CourseSkillResponse {
    fn from(row: &CourseSkillRow) -> Self {
        let record = row.record();
        Self {
            course_id: row.course_id,
            course_name: row.course_name.clone(),
            taken: record.taken(),
            total_score: record.total_score(),
            total_items: record.total_items(),
            total_evaluator: record.total_evaluator(),
            average_evaluator: record.average_evaluator(),
            role: record.role(),
            updated_at: row.updated_at,
        }
    }
}
