//! Achievement repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist global achievement definitions and per-user unlock records.
//! - Own the aggregate reads that unlock conditions are checked against.
//!
//! # Invariants
//! - Definition order is insertion order (`rowid`).
//! - The composite primary key on `user_achievements` backstops the
//!   check-then-act unlock race; a duplicate insert changes zero rows and is
//!   reported as `AlreadyUnlocked`, never as an error.

use crate::model::achievement::{
    Achievement, AchievementId, AchievementSeed, ConditionType, UserAchievement,
};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use uuid::Uuid;

const ACHIEVEMENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    condition_type,
    condition_value,
    xp_reward
FROM achievements";

/// Result of an unlock insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// A new unlock row was written; the bonus reward is due.
    Unlocked,
    /// The (user, achievement) pair already existed; grant nothing twice.
    AlreadyUnlocked,
}

/// Repository interface for achievement definitions and unlocks.
pub trait AchievementRepository {
    /// Inserts a seed definition unless its name is already present.
    /// Returns whether a row was written.
    fn insert_achievement(&self, seed: &AchievementSeed) -> RepoResult<bool>;
    /// All definitions in definition order.
    fn list_achievements(&self) -> RepoResult<Vec<Achievement>>;
    fn unlocked_ids(&self, user: UserId) -> RepoResult<HashSet<AchievementId>>;
    fn list_user_achievements(&self, user: UserId) -> RepoResult<Vec<UserAchievement>>;
    /// Idempotent unlock insert guarded by the composite primary key.
    fn insert_unlock(&self, user: UserId, achievement: AchievementId)
        -> RepoResult<UnlockOutcome>;
    /// Count of the user's tasks with status `done`.
    fn done_task_count(&self, user: UserId) -> RepoResult<i64>;
    /// Count of the user's done tasks flagged important.
    fn important_done_task_count(&self, user: UserId) -> RepoResult<i64>;
}

/// SQLite-backed achievement repository.
pub struct SqliteAchievementRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAchievementRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AchievementRepository for SqliteAchievementRepository<'_> {
    fn insert_achievement(&self, seed: &AchievementSeed) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO achievements (
                uuid,
                name,
                description,
                condition_type,
                condition_value,
                xp_reward
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                Uuid::new_v4().to_string(),
                seed.name,
                seed.description,
                seed.condition_type.as_tag(),
                seed.condition_value,
                seed.xp_reward,
            ],
        )?;

        Ok(changed > 0)
    }

    fn list_achievements(&self) -> RepoResult<Vec<Achievement>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACHIEVEMENT_SELECT_SQL} ORDER BY rowid ASC;"))?;

        let mut rows = stmt.query([])?;
        let mut achievements = Vec::new();
        while let Some(row) = rows.next()? {
            achievements.push(parse_achievement_row(row)?);
        }

        Ok(achievements)
    }

    fn unlocked_ids(&self, user: UserId) -> RepoResult<HashSet<AchievementId>> {
        let mut stmt = self.conn.prepare(
            "SELECT achievement_uuid FROM user_achievements WHERE user_uuid = ?1;",
        )?;

        let mut rows = stmt.query([user.to_string()])?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.insert(parse_uuid(&value, "user_achievements.achievement_uuid")?);
        }

        Ok(ids)
    }

    fn list_user_achievements(&self, user: UserId) -> RepoResult<Vec<UserAchievement>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_uuid, achievement_uuid, unlocked_at
             FROM user_achievements
             WHERE user_uuid = ?1
             ORDER BY unlocked_at ASC;",
        )?;

        let mut rows = stmt.query([user.to_string()])?;
        let mut unlocks = Vec::new();
        while let Some(row) = rows.next()? {
            let user_text: String = row.get("user_uuid")?;
            let achievement_text: String = row.get("achievement_uuid")?;
            unlocks.push(UserAchievement {
                user_uuid: parse_uuid(&user_text, "user_achievements.user_uuid")?,
                achievement_uuid: parse_uuid(
                    &achievement_text,
                    "user_achievements.achievement_uuid",
                )?,
                unlocked_at: row.get("unlocked_at")?,
            });
        }

        Ok(unlocks)
    }

    fn insert_unlock(
        &self,
        user: UserId,
        achievement: AchievementId,
    ) -> RepoResult<UnlockOutcome> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO user_achievements (user_uuid, achievement_uuid)
             VALUES (?1, ?2);",
            params![user.to_string(), achievement.to_string()],
        )?;

        if changed > 0 {
            Ok(UnlockOutcome::Unlocked)
        } else {
            Ok(UnlockOutcome::AlreadyUnlocked)
        }
    }

    fn done_task_count(&self, user: UserId) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE user_uuid = ?1 AND status = 'done';",
            [user.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn important_done_task_count(&self, user: UserId) -> RepoResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*)
             FROM tasks
             WHERE user_uuid = ?1
               AND status = 'done'
               AND is_important = 1;",
            [user.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_achievement_row(row: &Row<'_>) -> RepoResult<Achievement> {
    let uuid_text: String = row.get("uuid")?;
    let condition_text: String = row.get("condition_type")?;

    Ok(Achievement {
        uuid: parse_uuid(&uuid_text, "achievements.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        // Unrecognized tags survive the read; they simply never satisfy.
        condition_type: ConditionType::parse(&condition_text),
        condition_value: row.get("condition_value")?,
        xp_reward: row.get("xp_reward")?,
    })
}
