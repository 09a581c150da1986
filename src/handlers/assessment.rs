// src/handlers/assessment.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    assessment::{AssessmentItem, classify, score},
    config::Config,
    error::AppError,
    models::{
        attempt::{AssessmentQuery, SubmitAssessmentRequest, SubmitAssessmentResponse, SubmittedAnswer},
        course_skill::CourseSkillResponse,
        question::{PublicItem, StoredItem},
    },
    repository::DynRepository,
    utils::jwt::Claims,
};

/// Lines the submitted answers up with `items`, by item id.
///
/// Items without an answer get an empty (unanswered) entry. Answers for
/// unknown items, or several answers for one item, reject the submission.
fn align_answers(items: &[StoredItem], submitted: &[SubmittedAnswer]) -> Result<Vec<String>, AppError> {
    let mut by_id: HashMap<i64, &str> = HashMap::with_capacity(submitted.len());
    for entry in submitted {
        if by_id.insert(entry.item_id, entry.answer.as_str()).is_some() {
            return Err(AppError::BadRequest(format!(
                "Item {} answered more than once",
                entry.item_id
            )));
        }
    }

    let aligned: Vec<String> = items
        .iter()
        .map(|item| by_id.remove(&item.id).unwrap_or_default().to_string())
        .collect();

    if let Some(stray) = by_id.keys().next() {
        return Err(AppError::BadRequest(format!(
            "Item {} is not part of this assessment",
            stray
        )));
    }

    Ok(aligned)
}

async fn load_items(
    repo: &DynRepository,
    course_id: i64,
    query: &AssessmentQuery,
) -> Result<Vec<StoredItem>, AppError> {
    repo.find_course(course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    repo.list_items(course_id, query.item_type).await
}

/// Returns the items of a course's assessment without their answers.
pub async fn get_assessment(
    State(repo): State<DynRepository>,
    Path(course_id): Path<i64>,
    Query(query): Query<AssessmentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = load_items(&repo, course_id, &query).await?;
    if items.is_empty() {
        return Err(AppError::NotFound(format!(
            "No {} items for this course",
            query.item_type
        )));
    }

    let public: Vec<PublicItem> = items.into_iter().map(PublicItem::from).collect();
    Ok(Json(public))
}

/// Scores a submission and folds it into the caller's course-skill record.
///
/// * Every item of the requested type counts; missing answers score zero.
/// * The returned record is the persisted one, role included.
/// * Points equal to the score are added to the user's total.
pub async fn submit_assessment(
    State(repo): State<DynRepository>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let query = AssessmentQuery { item_type: req.item_type };

    let stored = load_items(&repo, course_id, &query).await?;
    let answers = align_answers(&stored, &req.answers)?;

    let items = stored
        .iter()
        .map(AssessmentItem::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!("Corrupt assessment item in course {}: {}", course_id, e);
            AppError::InternalServerError(e)
        })?;

    let result = score(&items, &answers, req.item_type)?;
    let attempt_role = classify(result.score, result.items, result.evaluator);

    let row = repo
        .record_attempt(user_id, course_id, req.item_type, &result)
        .await?;

    tracing::info!(
        user_id,
        course_id,
        score = result.score,
        items = result.items,
        %attempt_role,
        "Assessment submitted"
    );

    Ok(Json(SubmitAssessmentResponse {
        result,
        attempt_role,
        skill: CourseSkillResponse::from(&row),
        points_awarded: result.score,
    }))
}

/// Lists the caller's course-skill records.
pub async fn list_my_skills(
    State(repo): State<DynRepository>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let rows = repo.list_course_skills(user_id).await?;

    let skills: Vec<CourseSkillResponse> = rows.iter().map(CourseSkillResponse::from).collect();
    Ok(Json(skills))
}

/// The caller's record for one course.
pub async fn get_my_skill(
    State(repo): State<DynRepository>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let row = repo
        .find_course_skill(user_id, course_id)
        .await?
        .ok_or(AppError::NotFound("No assessment history for this course".to_string()))?;

    Ok(Json(CourseSkillResponse::from(&row)))
}

/// Retrieves the users with the most points.
pub async fn get_leaderboard(
    State(repo): State<DynRepository>,
    State(config): State<Config>,
) -> Result<impl IntoResponse, AppError> {
    let leaderboard = repo.leaderboard(config.leaderboard_limit).await?;
    Ok(Json(leaderboard))
}
