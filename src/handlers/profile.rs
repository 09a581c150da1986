// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    assessment::{LearnerStats, achievement},
    error::AppError,
    models::user::MeResponse,
    repository::DynRepository,
    utils::jwt::Claims,
};

/// Get current user's profile, points and achievement progress.
pub async fn get_me(
    State(repo): State<DynRepository>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = repo
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;
    let assessments_taken = repo.count_attempts(user_id).await?;

    let stats = LearnerStats {
        points: user.points.max(0) as u64,
        assessments_taken: assessments_taken.max(0) as u64,
    };

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        points: user.points,
        assessments_taken,
        created_at: user.created_at,
        achievements: achievement::progress(&stats),
    }))
}
