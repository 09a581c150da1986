// src/models/mod.rs

pub mod attempt;
pub mod course;
pub mod course_skill;
pub mod question;
pub mod user;
