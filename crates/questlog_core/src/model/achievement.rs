//! Achievement domain model.
//!
//! # Responsibility
//! - Define global achievement reference data and per-user unlock records.
//!
//! # Invariants
//! - Achievement names are globally unique.
//! - At most one unlock record exists per (user, achievement) pair.
//! - An unrecognized stored condition tag never satisfies; such achievements
//!   stay locked for this build.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an achievement definition.
pub type AchievementId = Uuid;

/// Aggregate the unlock condition is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Lifetime count of tasks completed.
    TasksCount,
    /// Progression level reached.
    Level,
    /// Lifetime count of important tasks completed.
    ImportantTasks,
}

impl ConditionType {
    /// Parses the stable storage tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "tasks_count" => Some(Self::TasksCount),
            "level" => Some(Self::Level),
            "important_tasks" => Some(Self::ImportantTasks),
            _ => None,
        }
    }

    /// Stable storage tag.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::TasksCount => "tasks_count",
            Self::Level => "level",
            Self::ImportantTasks => "important_tasks",
        }
    }
}

/// A global, named condition granting a one-time experience bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub uuid: AchievementId,
    /// Globally unique; also the identity used by idempotent seeding.
    pub name: String,
    pub description: String,
    /// `None` when the stored tag is not recognized by this build.
    pub condition_type: Option<ConditionType>,
    /// Threshold the condition aggregate is compared against.
    pub condition_value: i64,
    /// Bonus experience granted on unlock.
    pub xp_reward: i64,
}

/// Records that a user unlocked an achievement at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievement {
    pub user_uuid: UserId,
    pub achievement_uuid: AchievementId,
    /// Epoch milliseconds.
    pub unlocked_at: i64,
}

/// Seed definition for the starter achievement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub condition_type: ConditionType,
    pub condition_value: i64,
    pub xp_reward: i64,
}

#[cfg(test)]
mod tests {
    use super::ConditionType;

    #[test]
    fn condition_tags_roundtrip() {
        for condition in [
            ConditionType::TasksCount,
            ConditionType::Level,
            ConditionType::ImportantTasks,
        ] {
            assert_eq!(ConditionType::parse(condition.as_tag()), Some(condition));
        }
    }

    #[test]
    fn unknown_condition_tag_parses_to_none() {
        assert_eq!(ConditionType::parse("streak_days"), None);
    }
}
