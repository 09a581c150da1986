// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::assessment::{AchievementProgress, Role};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("username pattern is valid"));

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Account role: 'user' or 'admin'. Unrelated to tutor eligibility.
    pub role: String,

    /// Sum of every assessment score this user has submitted.
    pub points: i64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregated profile data for the current user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub points: i64,
    pub assessments_taken: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub achievements: Vec<AchievementProgress>,
}

/// Result of an assessment taken before the account existed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreSignupAssessment {
    pub course_id: i64,
    pub score: u32,
    #[validate(range(min = 1))]
    pub items: u32,
    /// Absent when the client has no evaluator for the attempt.
    #[validate(range(min = 0.0, max = 1.0))]
    pub evaluator: Option<f64>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(
            min = 3,
            max = 50,
            message = "Username length must be between 3 and 50 characters."
        ),
        custom(function = validate_username_chars)
    )]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[serde(default)]
    pub assessment: Option<PreSignupAssessment>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Returned by registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub user: User,
    /// Present when the request carried a pre-signup assessment.
    pub eligibility: Option<Role>,
}

fn validate_username_chars(username: &str) -> Result<(), validator::ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(validator::ValidationError::new("invalid_username_chars"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            password: "password123".to_string(),
            assessment: None,
        }
    }

    #[test]
    fn test_username_rules() {
        assert!(request("ally_01").validate().is_ok());
        assert!(request("yo").validate().is_err());
        assert!(request("no spaces").validate().is_err());
        assert!(request("semi;colon").validate().is_err());
    }

    #[test]
    fn test_pre_signup_assessment_needs_items() {
        let ok = PreSignupAssessment { course_id: 1, score: 0, items: 4, evaluator: None };
        let empty = PreSignupAssessment { course_id: 1, score: 0, items: 0, evaluator: None };
        assert!(ok.validate().is_ok());
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_pre_signup_evaluator_is_a_ratio() {
        let with = |evaluator| PreSignupAssessment { course_id: 1, score: 0, items: 10, evaluator };
        assert!(with(None).validate().is_ok());
        assert!(with(Some(0.0)).validate().is_ok());
        assert!(with(Some(1.0)).validate().is_ok());
        assert!(with(Some(-5.0)).validate().is_err());
        assert!(with(Some(1.5)).validate().is_err());
    }
}
