// src/assessment/achievement.rs

use serde::Serialize;

/// What an achievement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Points,
    AssessmentsTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub key: &'static str,
    pub metric: Metric,
    pub target: u64,
}

/// Fixed breakpoints, checked in order.
pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement { key: "first_assessment", metric: Metric::AssessmentsTaken, target: 1 },
    Achievement { key: "regular_learner", metric: Metric::AssessmentsTaken, target: 5 },
    Achievement { key: "dedicated_learner", metric: Metric::AssessmentsTaken, target: 20 },
    Achievement { key: "rising_star", metric: Metric::Points, target: 50 },
    Achievement { key: "scholar", metric: Metric::Points, target: 200 },
    Achievement { key: "luminary", metric: Metric::Points, target: 500 },
];

/// Counters an achievement can be measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LearnerStats {
    pub points: u64,
    pub assessments_taken: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementProgress {
    pub key: &'static str,
    pub metric: Metric,
    pub current: u64,
    pub target: u64,
    pub unlocked: bool,
}

impl Achievement {
    pub fn progress(&self, stats: &LearnerStats) -> AchievementProgress {
        let value = match self.metric {
            Metric::Points => stats.points,
            Metric::AssessmentsTaken => stats.assessments_taken,
        };

        AchievementProgress {
            key: self.key,
            metric: self.metric,
            current: value.min(self.target),
            target: self.target,
            unlocked: value >= self.target,
        }
    }
}

pub fn progress(stats: &LearnerStats) -> Vec<AchievementProgress> {
    ACHIEVEMENTS.iter().map(|a| a.progress(stats)).collect()
}
