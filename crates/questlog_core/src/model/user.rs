//! User domain model.
//!
//! # Invariants
//! - `experience` reflects exactly the sum of all reward grants ever applied.
//! - `level` is derived by the progression rule, never set independently.
//! - Users are created on first contact and never deleted.

use crate::model::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user.
pub type UserId = Uuid;

/// A tracked user with progression counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable internal id.
    pub uuid: UserId,
    /// Stable platform account id, mapped 1:1 to this record.
    pub external_id: i64,
    pub display_name: String,
    /// Progression tier, >= 1. Monotonically non-decreasing.
    pub level: i64,
    /// Accumulated experience points. Monotonically non-decreasing.
    pub experience: i64,
    /// Lifetime count of completed tasks. Monotonically non-decreasing.
    pub completed_tasks: i64,
    /// Epoch milliseconds.
    pub registered_at: i64,
}

impl User {
    /// Creates a fresh level-1 user for a platform account.
    pub fn new(external_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            external_id,
            display_name: display_name.into(),
            level: 1,
            experience: 0,
            completed_tasks: 0,
            registered_at: now_epoch_ms(),
        }
    }
}
