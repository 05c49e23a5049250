//! Transactional task-completion flow.
//!
//! # Responsibility
//! - Run the fixed reward sequence inside one unit of work:
//!   complete -> credit task XP -> bump completed count -> check achievements.
//!
//! # Invariants
//! - A mid-sequence failure rolls the whole unit back; experience is never
//!   credited without the status change, nor the other way around.
//! - Achievement conditions read the just-updated counters and level.

use crate::model::achievement::Achievement;
use crate::model::task::{Task, TaskId};
use crate::model::user::{User, UserId};
use crate::repo::achievement_repo::SqliteAchievementRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::achievement_service::AchievementService;
use crate::service::progression_service::ProgressionService;
use crate::service::task_service::TaskService;
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// Everything a caller needs to present a completion: the finished task, the
/// user's post-reward state, and the achievements unlocked along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub task: Task,
    pub user: User,
    pub unlocked: Vec<Achievement>,
}

/// Completes a task and applies the full reward sequence in one immediate
/// transaction.
///
/// Returns `None` (and leaves no trace) when the task is missing, foreign,
/// or already terminal.
pub fn complete_task_with_rewards(
    conn: &mut Connection,
    task_id: TaskId,
    user: UserId,
) -> RepoResult<Option<CompletionOutcome>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let Some(outcome) = run_reward_sequence(&tx, task_id, user)? else {
        return Ok(None);
    };

    tx.commit()?;
    info!(
        "event=task_rewarded module=completion status=ok user={user} task={task_id} xp={} unlocked={}",
        outcome.task.xp_reward,
        outcome.unlocked.len()
    );
    Ok(Some(outcome))
}

fn run_reward_sequence(
    conn: &Connection,
    task_id: TaskId,
    user: UserId,
) -> RepoResult<Option<CompletionOutcome>> {
    let tasks = TaskService::new(SqliteTaskRepository::new(conn));
    let Some(task) = tasks.complete_task(task_id, user)? else {
        return Ok(None);
    };

    let progression = ProgressionService::new(SqliteUserRepository::new(conn));
    progression
        .add_experience(user, task.xp_reward)?
        .ok_or(RepoError::NotFound {
            entity: "user",
            id: user,
        })?;
    progression
        .increment_completed_tasks(user)?
        .ok_or(RepoError::NotFound {
            entity: "user",
            id: user,
        })?;

    let achievements = AchievementService::new(
        SqliteAchievementRepository::new(conn),
        ProgressionService::new(SqliteUserRepository::new(conn)),
    );
    let unlocked = achievements.check_achievements(user)?;

    let snapshot = SqliteUserRepository::new(conn)
        .get_user(user)?
        .ok_or(RepoError::NotFound {
            entity: "user",
            id: user,
        })?;

    Ok(Some(CompletionOutcome {
        task,
        user: snapshot,
        unlocked,
    }))
}
