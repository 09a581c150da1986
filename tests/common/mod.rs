// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use academically::{
    assessment::{AssessmentItemType, CourseSkillRecord, ScoreResult},
    config::Config,
    error::AppError,
    models::{
        attempt::LeaderboardEntry,
        course::Course,
        course_skill::CourseSkillRow,
        question::{CreateItemRequest, StoredItem},
        user::User,
    },
    repository::Repository,
    routes,
    state::AppState,
    utils::hash::hash_password,
};
use async_trait::async_trait;
use sqlx::types::Json;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    items: Vec<StoredItem>,
    skills: HashMap<(i64, i64), CourseSkillRecord>,
    attempts: Vec<i64>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn skill_row(&self, user_id: i64, course_id: i64) -> Option<CourseSkillRow> {
        let record = self.skills.get(&(user_id, course_id))?;
        let course = self.courses.iter().find(|c| c.id == course_id)?;
        Some(CourseSkillRow {
            user_id,
            course_id,
            course_name: course.name.clone(),
            taken: record.taken() as i32,
            total_score: record.total_score() as i64,
            total_items: record.total_items() as i64,
            total_evaluator: record.total_evaluator(),
            role: record.role().to_string(),
            updated_at: Some(chrono::Utc::now()),
        })
    }
}

/// In-memory stand-in for the Postgres repository.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
    /// Makes every course-skill write fail with a 500, to exercise rollback.
    pub fail_skill_writes: AtomicBool,
}

impl MemoryRepository {
    fn check_skill_writes(&self) -> Result<(), AppError> {
        if self.fail_skill_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(
                "course_skills unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, AppError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
        let user = User {
            id: t.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.to_string(),
            points: 0,
            created_at: Some(chrono::Utc::now()),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut courses = t.courses.clone();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn create_course(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Course, AppError> {
        let mut t = self.tables.lock().unwrap();
        if t.courses.iter().any(|c| c.name == name) {
            return Err(AppError::Conflict(format!("Course '{}' already exists", name)));
        }
        let course = Course {
            id: t.next_id(),
            name: name.to_string(),
            description: description.map(String::from),
            created_at: Some(chrono::Utc::now()),
        };
        t.courses.push(course.clone());
        Ok(course)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn list_items(
        &self,
        course_id: i64,
        kind: AssessmentItemType,
    ) -> Result<Vec<StoredItem>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.items
            .iter()
            .filter(|i| i.course_id == course_id && i.item_type == kind.as_str())
            .cloned()
            .collect())
    }

    async fn create_item(&self, item: &CreateItemRequest) -> Result<StoredItem, AppError> {
        let mut t = self.tables.lock().unwrap();
        let stored = StoredItem {
            id: t.next_id(),
            course_id: item.course_id,
            item_type: item.item_type.as_str().to_string(),
            question: item.question.clone(),
            choices: item.choices.clone().map(Json),
            answer: item.answer.clone(),
            created_at: Some(chrono::Utc::now()),
        };
        t.items.push(stored.clone());
        Ok(stored)
    }

    async fn delete_item(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.items.len();
        t.items.retain(|i| i.id != id);
        Ok(t.items.len() < before)
    }

    async fn find_course_skill(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseSkillRow>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.skill_row(user_id, course_id))
    }

    async fn list_course_skills(&self, user_id: i64) -> Result<Vec<CourseSkillRow>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<CourseSkillRow> = t
            .skills
            .keys()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(u, c)| t.skill_row(*u, *c))
            .collect();
        rows.sort_by(|a, b| a.course_name.cmp(&b.course_name));
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
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
        if !t.courses.iter().any(|c| c.id == course_id) {
            return Err(AppError::NotFound("Course not found".to_string()));
        }
        self.check_skill_writes()?;

        let user = User {
            id: t.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            role: role.to_string(),
            points: 0,
            created_at: Some(chrono::Utc::now()),
        };
        t.users.push(user.clone());
        t.skills.insert((user.id, course_id), *record);
        Ok(user)
    }

    async fn record_attempt(
        &self,
        user_id: i64,
        course_id: i64,
        _kind: AssessmentItemType,
        result: &ScoreResult,
    ) -> Result<CourseSkillRow, AppError> {
        self.check_skill_writes()?;
        let mut t = self.tables.lock().unwrap();
        let existing = t.skills.get(&(user_id, course_id)).copied();
        let updated = CourseSkillRecord::record(
            existing.as_ref(),
            result.score,
            result.items,
            result.evaluator,
        );
        t.skills.insert((user_id, course_id), updated);
        t.attempts.push(user_id);
        if let Some(user) = t.users.iter_mut().find(|u| u.id == user_id) {
            user.points += result.score as i64;
        }
        t.skill_row(user_id, course_id)
            .ok_or(AppError::NotFound("Course not found".to_string()))
    }

    async fn count_attempts(&self, user_id: i64) -> Result<i64, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.attempts.iter().filter(|u| **u == user_id).count() as i64)
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut entries: Vec<LeaderboardEntry> = t
            .users
            .iter()
            .map(|u| LeaderboardEntry {
                username: u.username.clone(),
                points: u.points,
            })
            .collect();
        entries.sort_by(|a, b| b.points.cmp(&a.points).then(a.username.cmp(&b.username)));
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }
}

pub struct TestApp {
    pub address: String,
    pub repo: Arc<MemoryRepository>,
    pub client: reqwest::Client,
}

/// Spawns the app on a random port, backed by a fresh in-memory repository.
pub async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::default());

    let config = Config {
        database_url: "unused".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        port: 0,
        leaderboard_limit: 3,
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        repo: repo.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        repo,
        client: reqwest::Client::new(),
    }
}

pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let body: serde_json::Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");
        body["token"].as_str().expect("Token not found").to_string()
    }

    /// Registers a fresh user and returns its bearer token.
    pub async fn signed_in_user(&self) -> (String, String) {
        let username = unique_name("u");
        let response = self.register(&username, "password123").await;
        assert_eq!(response.status().as_u16(), 201);
        let token = self.login(&username, "password123").await;
        (username, token)
    }

    /// Creates an admin directly in the repository and returns its token.
    pub async fn signed_in_admin(&self) -> String {
        let username = unique_name("admin");
        let hash = hash_password("password123").unwrap();
        self.repo
            .create_user(&username, &hash, "admin")
            .await
            .unwrap();
        self.login(&username, "password123").await
    }

    /// Seeds a course with one multiple-choice item per entry of `key`.
    pub async fn seed_multiple_choice(&self, name: &str, key: &[&str]) -> i64 {
        let course = self.repo.create_course(name, None).await.unwrap();
        for (i, answer) in key.iter().enumerate() {
            self.repo
                .create_item(&CreateItemRequest {
                    course_id: course.id,
                    item_type: AssessmentItemType::MultipleChoice,
                    question: format!("Question {}", i),
                    choices: Some(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
                    answer: answer.to_string(),
                })
                .await
                .unwrap();
        }
        course.id
    }
}
