//! Check-in receipt model.
//!
//! # Responsibility
//! - Define the immutable proof record produced by each successful check-in.
//!
//! # Invariants
//! - Receipts are never mutated after creation and never deleted by core.
//! - `date` is always a day id (start-of-day timestamp).
//! - `habit_id` is a back-reference only; deleting the habit does not touch
//!   its receipts.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::habit::{ActorId, HabitId};

/// Stable identifier for a check-in receipt.
pub type CheckInId = Uuid;

/// Immutable receipt proving one check-in happened.
///
/// Owned by the caller who performed the check-in; its disposal is that
/// owner's concern, not this crate's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Stable receipt id, lifecycle independent from the habit.
    pub id: CheckInId,
    /// Habit the check-in was recorded against.
    pub habit_id: HabitId,
    /// Caller who performed the check-in.
    pub owner: ActorId,
    /// Day id of the check-in.
    pub date: i64,
    /// Free-text note; `None` when the caller supplied none or empty text.
    pub notes: Option<String>,
}

impl CheckIn {
    /// Normalizes submitted notes: empty input is recorded as absent.
    pub fn normalize_notes(notes: Option<String>) -> Option<String> {
        notes.filter(|value| !value.is_empty())
    }
}
