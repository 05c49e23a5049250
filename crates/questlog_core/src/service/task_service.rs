//! Task lifecycle manager.
//!
//! # Responsibility
//! - Validate task input and drive the status state machine.
//! - Keep derived reward fields consistent with priority on every edit.
//!
//! # Invariants
//! - `todo -> in_progress -> done`; `todo|in_progress -> cancelled`.
//! - Terminal tasks never transition again; such attempts read as not-found.
//! - A patch carrying a priority always recomputes `xp_reward` and
//!   `is_important`.

use crate::model::category::CategoryId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::user::UserId;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::info;

/// Input for task creation.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub category_uuid: Option<CategoryId>,
}

/// Partial update for an existing task.
///
/// Outer `None` leaves a field unchanged; the inner `Option` of nullable
/// fields distinguishes "set" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub category_uuid: Option<Option<CategoryId>>,
}

/// Use-case service for the task lifecycle.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a `todo` task with reward fields derived from priority.
    ///
    /// # Errors
    /// - `RepoError::Validation` when the title is blank or oversize.
    pub fn create_task(&self, user: UserId, draft: TaskDraft) -> RepoResult<Task> {
        let mut task = Task::new(user, draft.title, draft.priority);
        task.description = draft.description;
        task.due_date = draft.due_date;
        task.category_uuid = draft.category_uuid;

        self.repo.create_task(&task)?;
        info!(
            "event=task_created module=tasks status=ok user={user} task={} priority={}",
            task.uuid,
            task.priority.as_tag()
        );
        Ok(task)
    }

    /// Fetches one task; `None` when missing or owned by someone else.
    pub fn get_task(&self, id: TaskId, user: UserId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id, user)
    }

    /// Lists the user's tasks by deadline, then urgency.
    pub fn list_tasks(&self, user: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(user, query)
    }

    /// Applies a partial update. A priority change recomputes the derived
    /// reward fields before the write.
    pub fn update_task(
        &self,
        id: TaskId,
        user: UserId,
        patch: TaskPatch,
    ) -> RepoResult<Option<Task>> {
        let Some(mut task) = self.repo.get_task(id, user)? else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(category_uuid) = patch.category_uuid {
            task.category_uuid = category_uuid;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
            task.recompute_reward();
        }

        self.repo.update_task(&task)?;
        Ok(Some(task))
    }

    /// Marks an open task done and stamps `completed_at`.
    ///
    /// Experience crediting is the caller's responsibility; see
    /// [`crate::service::completion`] for the full transactional flow.
    pub fn complete_task(&self, id: TaskId, user: UserId) -> RepoResult<Option<Task>> {
        let completed = self.repo.transition(id, user, TaskStatus::Done)?;
        if let Some(task) = completed.as_ref() {
            info!(
                "event=task_completed module=tasks status=ok user={user} task={} xp={}",
                task.uuid, task.xp_reward
            );
        }
        Ok(completed)
    }

    /// Moves an open task to `in_progress`.
    pub fn set_in_progress(&self, id: TaskId, user: UserId) -> RepoResult<Option<Task>> {
        self.repo.transition(id, user, TaskStatus::InProgress)
    }

    /// Cancels an open task.
    pub fn cancel_task(&self, id: TaskId, user: UserId) -> RepoResult<Option<Task>> {
        self.repo.transition(id, user, TaskStatus::Cancelled)
    }

    /// Hard-deletes a task. `false` when missing or owned by someone else.
    pub fn delete_task(&self, id: TaskId, user: UserId) -> RepoResult<bool> {
        let deleted = self.repo.delete_task(id, user)?;
        if deleted {
            info!("event=task_deleted module=tasks status=ok user={user} task={id}");
        }
        Ok(deleted)
    }

    /// Open tasks whose deadline has passed.
    pub fn overdue_tasks(&self, user: UserId) -> RepoResult<Vec<Task>> {
        self.repo.overdue_tasks(user, local_today())
    }

    /// Open tasks due today, most urgent first.
    pub fn tasks_due_today(&self, user: UserId) -> RepoResult<Vec<Task>> {
        self.repo.tasks_due_today(user, local_today())
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
