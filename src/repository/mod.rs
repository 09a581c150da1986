// src/repository/mod.rs

//! Persistence seam. Handlers only ever talk to `dyn Repository`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    assessment::{AssessmentItemType, CourseSkillRecord, ScoreResult},
    error::AppError,
    models::{
        attempt::LeaderboardEntry,
        course::Course,
        course_skill::CourseSkillRow,
        question::{CreateItemRequest, StoredItem},
        user::User,
    },
};

pub mod postgres;

pub use postgres::PgRepository;

pub type DynRepository = Arc<dyn Repository>;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;

    /// Fails with `Conflict` when the name is taken.
    async fn create_course(&self, name: &str, description: Option<&str>)
    -> Result<Course, AppError>;

    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError>;

    /// Items of one type for a course, ordered by id.
    async fn list_items(
        &self,
        course_id: i64,
        kind: AssessmentItemType,
    ) -> Result<Vec<StoredItem>, AppError>;

    async fn create_item(&self, item: &CreateItemRequest) -> Result<StoredItem, AppError>;

    /// Returns false when nothing was deleted.
    async fn delete_item(&self, id: i64) -> Result<bool, AppError>;

    async fn find_course_skill(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseSkillRow>, AppError>;

    async fn list_course_skills(&self, user_id: i64) -> Result<Vec<CourseSkillRow>, AppError>;

    /// Creates a user together with their first record for `course_id`, e.g.
    /// from an assessment taken before signing up. Either both rows are
    /// written or neither is.
    async fn create_user_with_skill(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
        course_id: i64,
        record: &CourseSkillRecord,
    ) -> Result<User, AppError>;

    /// Folds one scored attempt into the user's record for the course,
    /// logs the attempt and awards `result.score` points, all atomically.
    async fn record_attempt(
        &self,
        user_id: i64,
        course_id: i64,
        kind: AssessmentItemType,
        result: &ScoreResult,
    ) -> Result<CourseSkillRow, AppError>;

    async fn count_attempts(&self, user_id: i64) -> Result<i64, AppError>;

    /// Users ordered by points, highest first.
    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_is_object_safe() {
        fn _takes_boxed(_: Box<dyn Repository>) {}
    }
}
