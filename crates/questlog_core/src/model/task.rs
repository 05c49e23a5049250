//! Task domain model.
//!
//! # Responsibility
//! - Define the task record, its priority/status vocabularies, and the
//!   reward rules derived from priority.
//! - Provide lifecycle predicates for terminal-state handling.
//!
//! # Invariants
//! - `xp_reward` and `is_important` are pure functions of `priority`; any
//!   priority change must recompute both.
//! - `completed_at` is set only on the transition to `Done`.
//! - `done` and `cancelled` are terminal; no transition leads out of them.

use crate::model::category::CategoryId;
use crate::model::user::UserId;
use crate::model::{now_epoch_ms, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum task title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Task urgency tier. Drives the experience reward and importance flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TaskPriority {
    /// Experience credited when a task of this priority is completed.
    pub fn xp_reward(self) -> i64 {
        match self {
            Self::Low => 5,
            Self::Medium => 10,
            Self::High => 20,
            Self::Critical => 30,
        }
    }

    /// Whether tasks of this priority count as important for achievements.
    pub fn is_important(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    /// Parses the stable wire/storage tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Parses external input, normalizing unrecognized tags to `Medium`.
    pub fn parse_or_default(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_default()
    }

    /// Stable wire/storage tag.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    /// Whether this state has no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Parses the stable wire/storage tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Stable wire/storage tag.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A user-owned unit of work with a priority-derived experience reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable task id.
    pub uuid: TaskId,
    /// Owning user. Ownership is checked on every operation.
    pub user_uuid: UserId,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Optional calendar deadline.
    pub due_date: Option<NaiveDate>,
    /// Optional grouping label. A reference, not ownership.
    pub category_uuid: Option<CategoryId>,
    /// Derived from `priority` at creation/edit time.
    pub xp_reward: i64,
    /// Derived from `priority` at creation/edit time.
    pub is_important: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds. Set only on the transition to `Done`.
    pub completed_at: Option<i64>,
}

impl Task {
    /// Creates a new `todo` task with derived reward fields computed.
    pub fn new(user_uuid: UserId, title: impl Into<String>, priority: TaskPriority) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            user_uuid,
            title: title.into(),
            description: None,
            priority,
            status: TaskStatus::Todo,
            due_date: None,
            category_uuid: None,
            xp_reward: priority.xp_reward(),
            is_important: priority.is_important(),
            created_at: now_epoch_ms(),
            completed_at: None,
        }
    }

    /// Recomputes `xp_reward` and `is_important` from the current priority.
    pub fn recompute_reward(&mut self) {
        self.xp_reward = self.priority.xp_reward();
        self.is_important = self.priority.is_important();
    }

    /// Checks caller-supplied field constraints.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank after trim.
    /// - `TitleTooLong` when the title exceeds [`TITLE_MAX_CHARS`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)
    }
}

/// Validates a task title against length and emptiness constraints.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let length = title.chars().count();
    if length > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong { length });
    }
    Ok(())
}
