//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide ownership-scoped CRUD and lifecycle transitions over `tasks`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every query is constrained to the requesting user's rows.
//! - Status transitions only fire from non-terminal states; a transition
//!   against a terminal, missing, or foreign task changes zero rows.
//! - `completed_at` is written exactly when a task transitions to `done`.

use crate::model::category::CategoryId;
use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::model::user::UserId;
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    title,
    description,
    priority,
    status,
    due_date,
    category_uuid,
    xp_reward,
    is_important,
    created_at,
    completed_at
FROM tasks";

// Collates priority tags for descending-urgency ordering.
const PRIORITY_RANK_SQL: &str = "CASE priority
    WHEN 'critical' THEN 3
    WHEN 'high' THEN 2
    WHEN 'medium' THEN 1
    ELSE 0
END";

/// Category constraint for task list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category constraint.
    #[default]
    Any,
    /// Only tasks with no category reference.
    Uncategorized,
    /// Only tasks referencing the given category.
    In(CategoryId),
}

/// Query options for listing a user's tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    /// Restrict to these statuses. `None` means all statuses.
    pub statuses: Option<Vec<TaskStatus>>,
    pub category: CategoryFilter,
}

/// Repository interface for task lifecycle operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId, user: UserId) -> RepoResult<Option<Task>>;
    /// Persists all mutable fields of an already-loaded task.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Moves a non-terminal task to `to` and returns the updated row.
    /// Returns `None` when no owned, non-terminal row matched.
    fn transition(&self, id: TaskId, user: UserId, to: TaskStatus) -> RepoResult<Option<Task>>;
    fn delete_task(&self, id: TaskId, user: UserId) -> RepoResult<bool>;
    fn list_tasks(&self, user: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    /// Open tasks whose due date is strictly before `today`.
    fn overdue_tasks(&self, user: UserId, today: NaiveDate) -> RepoResult<Vec<Task>>;
    /// Open tasks due exactly on `today`, most urgent first.
    fn tasks_due_today(&self, user: UserId, today: NaiveDate) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                user_uuid,
                title,
                description,
                priority,
                status,
                due_date,
                category_uuid,
                xp_reward,
                is_important,
                created_at,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                task.uuid.to_string(),
                task.user_uuid.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_tag(),
                task.status.as_tag(),
                task.due_date.map(|date| date.to_string()),
                task.category_uuid.map(|id| id.to_string()),
                task.xp_reward,
                bool_to_int(task.is_important),
                task.created_at,
                task.completed_at,
            ],
        )?;

        Ok(task.uuid)
    }

    fn get_task(&self, id: TaskId, user: UserId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE uuid = ?1 AND user_uuid = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), user.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                description = ?2,
                priority = ?3,
                status = ?4,
                due_date = ?5,
                category_uuid = ?6,
                xp_reward = ?7,
                is_important = ?8,
                completed_at = ?9
             WHERE uuid = ?10
               AND user_uuid = ?11;",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                task.priority.as_tag(),
                task.status.as_tag(),
                task.due_date.map(|date| date.to_string()),
                task.category_uuid.map(|id| id.to_string()),
                task.xp_reward,
                bool_to_int(task.is_important),
                task.completed_at,
                task.uuid.to_string(),
                task.user_uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "task",
                id: task.uuid,
            });
        }

        Ok(())
    }

    fn transition(&self, id: TaskId, user: UserId, to: TaskStatus) -> RepoResult<Option<Task>> {
        let sql = if to == TaskStatus::Done {
            "UPDATE tasks
             SET
                status = ?1,
                completed_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2
               AND user_uuid = ?3
               AND status IN ('todo', 'in_progress');"
        } else {
            "UPDATE tasks
             SET status = ?1
             WHERE uuid = ?2
               AND user_uuid = ?3
               AND status IN ('todo', 'in_progress');"
        };

        let changed = self.conn.execute(
            sql,
            params![to.as_tag(), id.to_string(), user.to_string()],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        self.get_task(id, user)
    }

    fn delete_task(&self, id: TaskId, user: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE uuid = ?1 AND user_uuid = ?2;",
            params![id.to_string(), user.to_string()],
        )?;

        Ok(changed > 0)
    }

    fn list_tasks(&self, user: UserId, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE user_uuid = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(user.to_string())];

        if let Some(statuses) = query.statuses.as_ref() {
            if statuses.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; statuses.len()].join(", ");
            sql.push_str(&format!(" AND status IN ({placeholders})"));
            for status in statuses {
                bind_values.push(Value::Text(status.as_tag().to_string()));
            }
        }

        match query.category {
            CategoryFilter::Any => {}
            CategoryFilter::Uncategorized => sql.push_str(" AND category_uuid IS NULL"),
            CategoryFilter::In(category_uuid) => {
                sql.push_str(" AND category_uuid = ?");
                bind_values.push(Value::Text(category_uuid.to_string()));
            }
        }

        sql.push_str(&format!(
            " ORDER BY due_date IS NULL, due_date ASC, {PRIORITY_RANK_SQL} DESC, created_at ASC"
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn overdue_tasks(&self, user: UserId, today: NaiveDate) -> RepoResult<Vec<Task>> {
        self.open_tasks_by_due_date(user, today, "<")
    }

    fn tasks_due_today(&self, user: UserId, today: NaiveDate) -> RepoResult<Vec<Task>> {
        self.open_tasks_by_due_date(user, today, "=")
    }
}

impl SqliteTaskRepository<'_> {
    fn open_tasks_by_due_date(
        &self,
        user: UserId,
        today: NaiveDate,
        comparison: &str,
    ) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE user_uuid = ?1
               AND due_date {comparison} ?2
               AND status IN ('todo', 'in_progress')
             ORDER BY {PRIORITY_RANK_SQL} DESC, created_at ASC;"
        ))?;

        let mut rows = stmt.query(params![user.to_string(), today.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let user_uuid_text: String = row.get("user_uuid")?;

    let priority_text: String = row.get("priority")?;
    let priority = TaskPriority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in tasks.status"))
    })?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(value.parse::<NaiveDate>().map_err(|_| {
            RepoError::InvalidData(format!("invalid date `{value}` in tasks.due_date"))
        })?),
        None => None,
    };

    let category_uuid = match row.get::<_, Option<String>>("category_uuid")? {
        Some(value) => Some(parse_uuid(&value, "tasks.category_uuid")?),
        None => None,
    };

    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        user_uuid: parse_uuid(&user_uuid_text, "tasks.user_uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        status,
        due_date,
        category_uuid,
        xp_reward: row.get("xp_reward")?,
        is_important: int_to_bool(row.get("is_important")?, "tasks.is_important")?,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
    })
}
