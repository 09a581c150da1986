// src/assessment/eligibility.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Eligibility of a user for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tutor,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Tutor => "tutor",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tutor" => Ok(Role::Tutor),
            "student" => Ok(Role::Student),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Non-finite evaluators (no prior assessment yields NaN) count as 0.0.
pub fn normalize_evaluator(evaluator: f64) -> f64 {
    if evaluator.is_finite() { evaluator } else { 0.0 }
}

/// Single-attempt classification.
///
/// `Tutor` iff `items > 0` and `score / items >= evaluator`. The boundary is
/// inclusive.
pub fn classify(score: u32, items: u32, evaluator: f64) -> Role {
    if items == 0 {
        return Role::Student;
    }
    if score as f64 / items as f64 >= normalize_evaluator(evaluator) {
        Role::Tutor
    } else {
        Role::Student
    }
}

/// Cumulative assessment history of one user for one subject.
///
/// Fields are read-only outside this module so `role` can only ever be the
/// one derived from the totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CourseSkillRecord {
    taken: u32,
    total_score: u64,
    total_items: u64,
    total_evaluator: f64,
    role: Role,
}

impl CourseSkillRecord {
    /// Record for a user's first attempt at a subject.
    pub fn first_attempt(score: u32, items: u32, evaluator: f64) -> Self {
        Self::derive(1, score as u64, items as u64, normalize_evaluator(evaluator))
    }

    /// Folds one more attempt into the totals. Every call counts as a new
    /// attempt.
    pub fn accumulate(&self, score: u32, items: u32, evaluator: f64) -> Self {
        Self::derive(
            self.taken + 1,
            self.total_score + score as u64,
            self.total_items + items as u64,
            self.total_evaluator + normalize_evaluator(evaluator),
        )
    }

    /// `first_attempt` when there is no history yet, `accumulate` otherwise.
    pub fn record(existing: Option<&Self>, score: u32, items: u32, evaluator: f64) -> Self {
        match existing {
            Some(record) => record.accumulate(score, items, evaluator),
            None => Self::first_attempt(score, items, evaluator),
        }
    }

    /// Rebuilds a record from persisted totals. The stored role is ignored
    /// and derived again.
    pub fn from_totals(taken: u32, total_score: u64, total_items: u64, total_evaluator: f64) -> Self {
        Self::derive(taken, total_score, total_items, total_evaluator)
    }

    fn derive(taken: u32, total_score: u64, total_items: u64, total_evaluator: f64) -> Self {
        let role = if taken == 0 || total_items == 0 {
            Role::Student
        } else {
            let achieved = total_score as f64 / total_items as f64;
            let required = normalize_evaluator(total_evaluator / taken as f64);
            if achieved >= required { Role::Tutor } else { Role::Student }
        };

        Self {
            taken,
            total_score,
            total_items,
            total_evaluator,
            role,
        }
    }

    pub fn taken(&self) -> u32 {
        self.taken
    }

    pub fn total_score(&self) -> u64 {
        self.total_score
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_evaluator(&self) -> f64 {
        self.total_evaluator
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Average passing ratio across all attempts.
    pub fn average_evaluator(&self) -> f64 {
        if self.taken == 0 {
            return 0.0;
        }
        self.total_evaluator / self.taken as f64
    }
}
