// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        course::CreateCourseRequest,
        question::{CreateItemRequest, PublicItem},
    },
    repository::DynRepository,
    utils::html::sanitize_text,
};

/// Creates a course.
/// Admin only.
pub async fn create_course(
    State(repo): State<DynRepository>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = sanitize_text(&payload.name);
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Course name is empty".to_string()));
    }
    let description = payload.description.as_deref().map(sanitize_text);

    let course = repo.create_course(&name, description.as_deref()).await?;
    tracing::info!(course_id = course.id, name = %course.name, "Course created");

    Ok((StatusCode::CREATED, Json(course)))
}

/// Creates an assessment item.
/// Admin only.
pub async fn create_item(
    State(repo): State<DynRepository>,
    Json(mut payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    payload.check_shape().map_err(AppError::BadRequest)?;

    repo.find_course(payload.course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    // Choices and answer are compared verbatim against submissions, so only
    // the question text is cleaned.
    payload.question = sanitize_text(&payload.question);
    if payload.question.trim().is_empty() {
        return Err(AppError::BadRequest("Question is empty".to_string()));
    }

    let item = repo.create_item(&payload).await?;
    tracing::info!(
        item_id = item.id,
        course_id = item.course_id,
        item_type = %item.item_type,
        "Assessment item created"
    );

    Ok((StatusCode::CREATED, Json(PublicItem::from(item))))
}

/// Deletes an assessment item.
/// Admin only.
pub async fn delete_item(
    State(repo): State<DynRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !repo.delete_item(id).await? {
        return Err(AppError::NotFound("Item not found".to_string()));
    }

    tracing::info!(item_id = id, "Assessment item deleted");
    Ok(StatusCode::NO_CONTENT)
}
