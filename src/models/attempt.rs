// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::assessment::{AssessmentItemType, Role, ScoreResult};

use super::course_skill::CourseSkillResponse;

/// Aggregated struct for displaying the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub points: i64,
}

/// Query string of `GET /api/courses/{id}/assessment`.
#[derive(Debug, Deserialize)]
pub struct AssessmentQuery {
    #[serde(rename = "type")]
    pub item_type: AssessmentItemType,
}

/// One answer in a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswer {
    pub item_id: i64,
    /// Empty means unanswered.
    #[serde(default)]
    pub answer: String,
}

/// DTO for submitting an assessment attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAssessmentRequest {
    #[serde(rename = "type")]
    pub item_type: AssessmentItemType,
    pub answers: Vec<SubmittedAnswer>,
}

/// Returned after a submission has been scored and recorded.
#[derive(Debug, Serialize)]
pub struct SubmitAssessmentResponse {
    pub result: ScoreResult,
    /// Classification of this attempt alone.
    pub attempt_role: Role,
    /// Cumulative record after this attempt.
    pub skill: CourseSkillResponse,
    pub points_awarded: u32,
}
