//! Achievement evaluator: condition checks and unlock orchestration.
//!
//! # Responsibility
//! - Scan achievement definitions against a user's aggregate state.
//! - Unlock satisfied achievements exactly once and credit their bonus
//!   through the progression engine.
//!
//! # Invariants
//! - Re-checking a satisfied condition never double-grants; the unlock
//!   insert is idempotent against the (user, achievement) key.
//! - An unrecognized condition tag never satisfies.
//! - Returned lists preserve definition order.

use crate::model::achievement::{
    Achievement, AchievementSeed, ConditionType, UserAchievement,
};
use crate::model::user::UserId;
use crate::repo::achievement_repo::{AchievementRepository, UnlockOutcome};
use crate::repo::user_repo::UserRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::progression_service::ProgressionService;
use log::info;

/// Starter achievements seeded at process startup, matched by unique name.
pub const DEFAULT_ACHIEVEMENTS: &[AchievementSeed] = &[
    AchievementSeed {
        name: "Первые шаги",
        description: "Выполнить первую задачу",
        condition_type: ConditionType::TasksCount,
        condition_value: 1,
        xp_reward: 50,
    },
    AchievementSeed {
        name: "Продуктивность растет",
        description: "Выполнить 10 задач",
        condition_type: ConditionType::TasksCount,
        condition_value: 10,
        xp_reward: 100,
    },
    AchievementSeed {
        name: "Мастер дел",
        description: "Выполнить 50 задач",
        condition_type: ConditionType::TasksCount,
        condition_value: 50,
        xp_reward: 200,
    },
    AchievementSeed {
        name: "Уровень 5",
        description: "Достичь 5 уровня",
        condition_type: ConditionType::Level,
        condition_value: 5,
        xp_reward: 300,
    },
    AchievementSeed {
        name: "Приоритеты на месте",
        description: "Выполнить 5 важных задач",
        condition_type: ConditionType::ImportantTasks,
        condition_value: 5,
        xp_reward: 150,
    },
];

/// Use-case service for achievement evaluation.
pub struct AchievementService<A: AchievementRepository, U: UserRepository> {
    repo: A,
    progression: ProgressionService<U>,
}

impl<A: AchievementRepository, U: UserRepository> AchievementService<A, U> {
    pub fn new(repo: A, progression: ProgressionService<U>) -> Self {
        Self { repo, progression }
    }

    /// Inserts the starter achievements that are not present yet.
    ///
    /// Idempotent across restarts; returns how many rows were written.
    pub fn seed_defaults(&self) -> RepoResult<usize> {
        let mut inserted = 0;
        for seed in DEFAULT_ACHIEVEMENTS {
            if self.repo.insert_achievement(seed)? {
                inserted += 1;
            }
        }

        info!("event=achievements_seeded module=achievements status=ok inserted={inserted}");
        Ok(inserted)
    }

    /// All achievement definitions in definition order.
    pub fn list_achievements(&self) -> RepoResult<Vec<Achievement>> {
        self.repo.list_achievements()
    }

    /// The user's unlock records, oldest first.
    pub fn user_achievements(&self, user: UserId) -> RepoResult<Vec<UserAchievement>> {
        self.repo.list_user_achievements(user)
    }

    /// Evaluates every locked achievement against the user's current state
    /// and unlocks the satisfied ones, crediting each bonus.
    ///
    /// Returns only the achievements newly unlocked by this call; a repeat
    /// call with no intervening state change returns an empty list.
    pub fn check_achievements(&self, user: UserId) -> RepoResult<Vec<Achievement>> {
        let definitions = self.repo.list_achievements()?;
        let unlocked = self.repo.unlocked_ids(user)?;

        let mut newly_unlocked = Vec::new();
        for achievement in definitions {
            if unlocked.contains(&achievement.uuid) {
                continue;
            }
            if !self.condition_met(user, &achievement)? {
                continue;
            }

            // The composite key absorbs a concurrent unlock of the same pair.
            match self.repo.insert_unlock(user, achievement.uuid)? {
                UnlockOutcome::AlreadyUnlocked => continue,
                UnlockOutcome::Unlocked => {}
            }

            self.progression
                .add_experience(user, achievement.xp_reward)?
                .ok_or(RepoError::NotFound {
                    entity: "user",
                    id: user,
                })?;
            info!(
                "event=achievement_unlocked module=achievements status=ok user={user} achievement={} xp={}",
                achievement.uuid, achievement.xp_reward
            );
            newly_unlocked.push(achievement);
        }

        Ok(newly_unlocked)
    }

    fn condition_met(&self, user: UserId, achievement: &Achievement) -> RepoResult<bool> {
        let Some(condition_type) = achievement.condition_type else {
            return Ok(false);
        };

        let met = match condition_type {
            ConditionType::TasksCount => {
                self.repo.done_task_count(user)? >= achievement.condition_value
            }
            ConditionType::Level => self
                .progression
                .stats(user)?
                .is_some_and(|stats| stats.level >= achievement.condition_value),
            ConditionType::ImportantTasks => {
                self.repo.important_done_task_count(user)? >= achievement.condition_value
            }
        };

        Ok(met)
    }
}
