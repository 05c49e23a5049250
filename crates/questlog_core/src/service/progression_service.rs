//! Progression engine: experience accounting and level-ups.
//!
//! # Responsibility
//! - Own all mutations of user progression counters.
//! - Apply the level-up rule on experience credits.
//!
//! # Invariants
//! - `experience` and `level` never decrease.
//! - One `add_experience` call raises the level by at most 1, even when the
//!   new total overshoots several thresholds.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoResult;
use log::info;
use serde::Serialize;

/// Experience required to leave the given level: `floor(100 * level^1.5)`.
pub fn next_level_xp(level: i64) -> i64 {
    (100.0 * (level as f64).powf(1.5)).floor() as i64
}

/// Read model for the stats view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub level: i64,
    pub experience: i64,
    pub next_level_xp: i64,
    pub completed_tasks: i64,
}

/// Use-case service for user progression.
pub struct ProgressionService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> ProgressionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the user mapped to a platform account, creating the record on
    /// first contact.
    pub fn ensure_user(&self, external_id: i64, display_name: &str) -> RepoResult<User> {
        if let Some(user) = self.repo.get_user_by_external_id(external_id)? {
            return Ok(user);
        }

        let user = User::new(external_id, display_name);
        self.repo.create_user(&user)?;
        info!(
            "event=user_registered module=progression status=ok external_id={external_id} user={}",
            user.uuid
        );
        Ok(user)
    }

    /// Credits experience and applies the level-up rule.
    ///
    /// # Contract
    /// - `xp` must be non-negative; non-positive values leave the user
    ///   untouched (still a valid call).
    /// - The level rises by at most 1 per call.
    ///
    /// Returns `None` when the user does not exist.
    pub fn add_experience(&self, user: UserId, xp: i64) -> RepoResult<Option<User>> {
        let Some(mut record) = self.repo.get_user(user)? else {
            return Ok(None);
        };

        if xp <= 0 {
            return Ok(Some(record));
        }

        record.experience += xp;
        if record.experience >= next_level_xp(record.level) {
            record.level += 1;
            info!(
                "event=level_up module=progression status=ok user={user} level={}",
                record.level
            );
        }
        self.repo.update_progress(&record)?;

        Ok(Some(record))
    }

    /// Bumps the lifetime completed-task counter.
    ///
    /// Returns `None` when the user does not exist.
    pub fn increment_completed_tasks(&self, user: UserId) -> RepoResult<Option<User>> {
        let Some(mut record) = self.repo.get_user(user)? else {
            return Ok(None);
        };

        record.completed_tasks += 1;
        self.repo.update_progress(&record)?;

        Ok(Some(record))
    }

    /// Progression counters plus the next level threshold.
    pub fn stats(&self, user: UserId) -> RepoResult<Option<ProgressSnapshot>> {
        let Some(record) = self.repo.get_user(user)? else {
            return Ok(None);
        };

        Ok(Some(ProgressSnapshot {
            level: record.level,
            experience: record.experience,
            next_level_xp: next_level_xp(record.level),
            completed_tasks: record.completed_tasks,
        }))
    }

    /// All known users, oldest registration first.
    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }
}

#[cfg(test)]
mod tests {
    use super::next_level_xp;

    #[test]
    fn threshold_follows_power_curve() {
        assert_eq!(next_level_xp(1), 100);
        assert_eq!(next_level_xp(2), 282);
        assert_eq!(next_level_xp(3), 519);
        assert_eq!(next_level_xp(4), 800);
        assert_eq!(next_level_xp(5), 1118);
    }
}
