// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    assessment::{CourseSkillRecord, classify},
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest, RegisterResponse},
    repository::DynRepository,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it. An assessment taken
/// before signing up is classified and stored as the user's first record for
/// that course. Returns 201 Created.
pub async fn register(
    State(repo): State<DynRepository>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(assessment) = &payload.assessment {
        assessment.validate()?;
        if assessment.score > assessment.items {
            return Err(AppError::BadRequest(
                "Assessment score cannot exceed its item count".to_string(),
            ));
        }
        repo.find_course(assessment.course_id)
            .await?
            .ok_or(AppError::NotFound("Course not found".to_string()))?;
    }

    let hashed_password = hash_password(&payload.password)?;

    let (user, eligibility) = match &payload.assessment {
        Some(assessment) => {
            // No evaluator on record reads as NaN, which classifies against 0.0.
            let evaluator = assessment.evaluator.unwrap_or(f64::NAN);
            let role = classify(assessment.score, assessment.items, evaluator);
            let record =
                CourseSkillRecord::first_attempt(assessment.score, assessment.items, evaluator);
            let user = repo
                .create_user_with_skill(
                    &payload.username,
                    &hashed_password,
                    "user",
                    assessment.course_id,
                    &record,
                )
                .await?;

            tracing::info!(
                user_id = user.id,
                course_id = assessment.course_id,
                %role,
                "Stored pre-signup assessment"
            );
            (user, Some(role))
        }
        None => {
            let user = repo
                .create_user(&payload.username, &hashed_password, "user")
                .await?;
            (user, None)
        }
    };

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user, eligibility })))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(repo): State<DynRepository>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = repo
        .find_user_by_username(&payload.username)
        .await?
        .ok_or(AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError(
            "Invalid username or password".to_string(),
        ));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": user.role,
    })))
}
