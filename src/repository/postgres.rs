// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction, types::Json};

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

use super::Repository;

const USER_COLUMNS: &str = "id, username, password, role, points, created_at";

const ITEM_COLUMNS: &str = "id, course_id, type, question, choices, answer, created_at";

const SKILL_SELECT: &str = r#"
    SELECT
        cs.user_id, cs.course_id, c.name AS course_name,
        cs.taken, cs.total_score, cs.total_items, cs.total_evaluator,
        cs.role, cs.updated_at
    FROM course_skills cs
    JOIN courses c ON c.id = cs.course_id
"#;

/// `Repository` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps unique violations to `Conflict`, everything else to a 500.
fn conflict_or_internal(err: sqlx::Error, conflict: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(conflict());
        }
    }
    AppError::from(err)
}

async fn insert_user<'e, E>(
    executor: E,
    username: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, password, role) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_one(executor)
    .await
    .map_err(|e| conflict_or_internal(e, || format!("Username '{}' already exists", username)))
}

async fn fetch_skill(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    course_id: i64,
) -> Result<CourseSkillRow, AppError> {
    let row = sqlx::query_as::<_, CourseSkillRow>(&format!(
        "{} WHERE cs.user_id = $1 AND cs.course_id = $2",
        SKILL_SELECT
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

async fn write_skill(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    course_id: i64,
    record: &CourseSkillRecord,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE course_skills SET
            taken = $3,
            total_score = $4,
            total_items = $5,
            total_evaluator = $6,
            role = $7,
            updated_at = CURRENT_TIMESTAMP
        WHERE user_id = $1 AND course_id = $2
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .bind(record.taken() as i32)
    .bind(record.total_score() as i64)
    .bind(record.total_items() as i64)
    .bind(record.total_evaluator())
    .bind(record.role().as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Makes sure a row exists (taken = 0 means no history) and locks it.
async fn lock_skill(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    course_id: i64,
) -> Result<Option<CourseSkillRecord>, AppError> {
    sqlx::query(
        r#"
        INSERT INTO course_skills (user_id, course_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .execute(&mut **tx)
    .await?;

    let row = sqlx::query_as::<_, CourseSkillRow>(&format!(
        "{} WHERE cs.user_id = $1 AND cs.course_id = $2 FOR UPDATE OF cs",
        SKILL_SELECT
    ))
    .bind(user_id)
    .bind(course_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok((row.taken > 0).then(|| row.record()))
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError> {
        insert_user(&self.pool, username, password_hash, role).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT id, name, description, created_at FROM courses ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn create_course(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_internal(e, || format!("Course '{}' already exists", name)))
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        let course = sqlx::query_as::<_, Course>(
            "SELECT id, name, description, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn list_items(
        &self,
        course_id: i64,
        kind: AssessmentItemType,
    ) -> Result<Vec<StoredItem>, AppError> {
        let items = sqlx::query_as::<_, StoredItem>(&format!(
            "SELECT {} FROM assessment_items WHERE course_id = $1 AND type = $2 ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(course_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_item(&self, item: &CreateItemRequest) -> Result<StoredItem, AppError> {
        let stored = sqlx::query_as::<_, StoredItem>(&format!(
            r#"
            INSERT INTO assessment_items (course_id, type, question, choices, answer)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.course_id)
        .bind(item.item_type.as_str())
        .bind(&item.question)
        .bind(item.choices.clone().map(Json))
        .bind(&item.answer)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn delete_item(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM assessment_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_course_skill(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseSkillRow>, AppError> {
        let row = sqlx::query_as::<_, CourseSkillRow>(&format!(
            "{} WHERE cs.user_id = $1 AND cs.course_id = $2 AND cs.taken > 0",
            SKILL_SELECT
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_course_skills(&self, user_id: i64) -> Result<Vec<CourseSkillRow>, AppError> {
        let rows = sqlx::query_as::<_, CourseSkillRow>(&format!(
            "{} WHERE cs.user_id = $1 AND cs.taken > 0 ORDER BY c.name",
            SKILL_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_user_with_skill(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
        course_id: i64,
        record: &CourseSkillRecord,
    ) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let user = insert_user(&mut *tx, username, password_hash, role).await?;

        sqlx::query(
            r#"
            INSERT INTO course_skills
                (user_id, course_id, taken, total_score, total_items, total_evaluator, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(course_id)
        .bind(record.taken() as i32)
        .bind(record.total_score() as i64)
        .bind(record.total_items() as i64)
        .bind(record.total_evaluator())
        .bind(record.role().as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn record_attempt(
        &self,
        user_id: i64,
        course_id: i64,
        kind: AssessmentItemType,
        result: &ScoreResult,
    ) -> Result<CourseSkillRow, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = lock_skill(&mut tx, user_id, course_id).await?;
        let updated = CourseSkillRecord::record(
            existing.as_ref(),
            result.score,
            result.items,
            result.evaluator,
        );
        write_skill(&mut tx, user_id, course_id, &updated).await?;

        sqlx::query(
            r#"
            INSERT INTO assessment_attempts (user_id, course_id, type, score, items, evaluator)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(kind.as_str())
        .bind(result.score as i32)
        .bind(result.items as i32)
        .bind(result.evaluator)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET points = points + $1 WHERE id = $2")
            .bind(result.score as i64)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = fetch_skill(&mut tx, user_id, course_id).await?;
        tx.commit().await?;

        tracing::debug!(
            user_id,
            course_id,
            taken = updated.taken(),
            role = %updated.role(),
            "Recorded assessment attempt"
        );
        Ok(row)
    }

    async fn count_attempts(&self, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM assessment_attempts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT username, points
            FROM users
            ORDER BY points DESC, username ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
