// src/handlers/course.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, repository::DynRepository};

/// Lists every course an assessment can be taken for.
pub async fn list_courses(State(repo): State<DynRepository>) -> Result<impl IntoResponse, AppError> {
    let courses = repo.list_courses().await?;
    Ok(Json(courses))
}
