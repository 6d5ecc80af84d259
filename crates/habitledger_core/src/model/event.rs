//! Ledger events emitted by habit transitions.
//!
//! # Responsibility
//! - Describe every successful mutation for external observers/indexers.
//!
//! # Invariants
//! - Events are an append-only output of transition functions, returned to
//!   the caller; nothing in this crate consumes them.
//! - Event payloads carry record metadata only, never free-form user text
//!   beyond the habit name announced at creation.

use serde::{Deserialize, Serialize};

use crate::model::habit::{ActorId, HabitId};

/// Notification describing one applied mutation.
///
/// Serialized with an `event` discriminator so a JSON sink can route on the
/// kind without inspecting payload fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HabitEvent {
    /// A new habit record exists.
    HabitCreated {
        habit_id: HabitId,
        owner: ActorId,
        name: String,
    },
    /// A check-in was applied. `new_streak` and `total_checkins` reflect the
    /// record state after the transition.
    CheckInRecorded {
        habit_id: HabitId,
        date: i64,
        new_streak: u32,
        total_checkins: u32,
    },
    /// A gap of at least one missed day ended the previous run.
    /// Emitted before the matching `CheckInRecorded`.
    StreakBroken {
        habit_id: HabitId,
        previous_streak: u32,
    },
    /// Owner edited one or more fields. Emitted even when the supplied
    /// values equal the stored ones.
    HabitUpdated { habit_id: HabitId },
    /// The record was permanently removed.
    HabitDeleted { habit_id: HabitId },
}

impl HabitEvent {
    /// Stable lowercase kind tag, matching the serialized discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HabitCreated { .. } => "habit_created",
            Self::CheckInRecorded { .. } => "check_in_recorded",
            Self::StreakBroken { .. } => "streak_broken",
            Self::HabitUpdated { .. } => "habit_updated",
            Self::HabitDeleted { .. } => "habit_deleted",
        }
    }

    /// The habit this event describes.
    pub fn habit_id(&self) -> HabitId {
        match self {
            Self::HabitCreated { habit_id, .. }
            | Self::CheckInRecorded { habit_id, .. }
            | Self::StreakBroken { habit_id, .. }
            | Self::HabitUpdated { habit_id }
            | Self::HabitDeleted { habit_id } => *habit_id,
        }
    }
}
