//! Core domain logic for Questlog, a gamified task tracker.
//! This crate is the single source of truth for business invariants:
//! task lifecycle, experience/level progression, achievement unlocks, and
//! category management.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging};
pub use model::achievement::{
    Achievement, AchievementId, AchievementSeed, ConditionType, UserAchievement,
};
pub use model::category::{Category, CategoryId, DEFAULT_CATEGORY_COLOR};
pub use model::task::{Task, TaskId, TaskPriority, TaskStatus};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::achievement_repo::{
    AchievementRepository, SqliteAchievementRepository, UnlockOutcome,
};
pub use repo::category_repo::{CategoryRepository, CategoryStat, SqliteCategoryRepository};
pub use repo::task_repo::{CategoryFilter, SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::achievement_service::{AchievementService, DEFAULT_ACHIEVEMENTS};
pub use service::category_service::{CategoryPatch, CategoryService};
pub use service::completion::{complete_task_with_rewards, CompletionOutcome};
pub use service::progression_service::{next_level_xp, ProgressSnapshot, ProgressionService};
pub use service::task_service::{TaskDraft, TaskPatch, TaskService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
