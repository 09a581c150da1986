// src/assessment/mod.rs

//! Assessment scoring and tutor/student eligibility.
//!
//! Everything in this module is pure: no I/O, no shared state. The HTTP
//! handlers and the repository call into it and persist whatever it returns.

pub mod achievement;
pub mod eligibility;
pub mod item;
pub mod scorer;

pub use achievement::{Achievement, AchievementProgress, LearnerStats};
pub use eligibility::{CourseSkillRecord, Role, classify, normalize_evaluator};
pub use item::{AssessmentItem, AssessmentItemType};
pub use scorer::{ScoreError, ScoreResult, score};
