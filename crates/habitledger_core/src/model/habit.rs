//! Habit record and its state-transition engine.
//!
//! # Responsibility
//! - Define the canonical habit record and its goal taxonomy.
//! - Apply create/check-in/update/delete transitions with their events.
//! - Provide read-only projections (info, completion rate, day queries).
//!
//! # Invariants
//! - `current_streak <= longest_streak` after every completed transition.
//! - At most one check-in per day id; `total_checkins` grows by exactly 1
//!   per successful check-in and never decreases.
//! - `owner` and `created_at` are immutable once set.
//! - Failed transitions leave the record untouched.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use crate::model::checkin::{CheckIn, CheckInId};
use crate::model::day::{day_id, days_between, MS_PER_DAY};
use crate::model::event::HabitEvent;

/// Stable identifier for a habit record.
pub type HabitId = Uuid;

/// Host-attributed caller identity (the transaction sender).
pub type ActorId = Uuid;

/// Cadence a habit is tracked against.
///
/// External interfaces carry this as a numeric code (`0..=2`); anything
/// outside that range is a hard rejection, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Daily,
    Weekly,
    Monthly,
}

impl GoalType {
    /// Decodes a wire/storage code. Returns `None` for codes above 2.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Daily),
            1 => Some(Self::Weekly),
            2 => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Stable numeric code used by external interfaces.
    pub fn code(self) -> u8 {
        match self {
            Self::Daily => 0,
            Self::Weekly => 1,
            Self::Monthly => 2,
        }
    }
}

/// Rejection raised by a habit transition. Terminal for the attempted call;
/// the record keeps its prior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitTransitionError {
    /// Goal-type code outside `0..=2` on create or update.
    InvalidGoalType { code: u8 },
    /// A check-in for this day id was already recorded.
    AlreadyCheckedInToday { day: i64 },
    /// Recorded last check-in is chronologically ahead of the attempted day.
    /// Unreachable under a monotonic host clock.
    InvalidDate {
        last_checkin_date: i64,
        attempted: i64,
    },
    /// Update/delete attempted by a caller other than the stored owner.
    NotOwner { habit_id: HabitId, caller: ActorId },
}

impl Display for HabitTransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidGoalType { code } => {
                write!(f, "invalid goal type code {code}; expected 0..=2")
            }
            Self::AlreadyCheckedInToday { day } => {
                write!(f, "already checked in for day {day}")
            }
            Self::InvalidDate {
                last_checkin_date,
                attempted,
            } => write!(
                f,
                "last check-in day {last_checkin_date} is ahead of attempted day {attempted}"
            ),
            Self::NotOwner { habit_id, caller } => {
                write!(f, "caller {caller} does not own habit {habit_id}")
            }
        }
    }
}

impl Error for HabitTransitionError {}

/// Invariant breach detected on a persisted or constructed record.
///
/// Raised by [`Habit::validate`]; the repository refuses to store or return
/// records that fail it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitValidationError {
    /// `current_streak` exceeds `longest_streak`.
    StreakAboveLongest { current: u32, longest: u32 },
    /// `last_checkin_date` is not a day-bucket start or is negative.
    MisalignedCheckinDate { value: i64 },
    /// `created_at` precedes the epoch.
    NegativeCreatedAt { value: i64 },
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StreakAboveLongest { current, longest } => write!(
                f,
                "current streak {current} exceeds longest streak {longest}"
            ),
            Self::MisalignedCheckinDate { value } => {
                write!(f, "last_checkin_date {value} is not a day id")
            }
            Self::NegativeCreatedAt { value } => {
                write!(f, "created_at {value} precedes the epoch")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Creation request carrying the caller-supplied fields.
///
/// `goal_type` stays a raw code here so validation happens inside the
/// transition, mirroring how the fields arrive from a host transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub description: String,
    pub emoji: String,
    /// Goal-type code, validated against `0..=2`.
    pub goal_type: u8,
    /// Target count per period. `0` is accepted; see `completion_rate`.
    pub goal_count: u32,
    pub is_public: bool,
}

/// Partial-update request: supply a field to change it, omit to keep it.
///
/// Explicit tagged options, never sentinel values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    /// Goal-type code, revalidated against the same `0..=2` rule as create.
    pub goal_type: Option<u8>,
    pub goal_count: Option<u32>,
    pub is_public: Option<bool>,
}

/// Projection of every habit field except `last_checkin_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitInfo {
    pub id: HabitId,
    pub owner: ActorId,
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub created_at: i64,
    pub goal_type: GoalType,
    pub goal_count: u32,
    pub total_checkins: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub is_public: bool,
}

/// Canonical habit record.
///
/// Mutated in place by transitions; each transition either applies fully and
/// returns its events, or fails before touching any field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Stable record id, assigned at creation.
    pub id: HabitId,
    /// Creator identity; gates update/delete, never check-in.
    pub owner: ActorId,
    pub name: String,
    pub description: String,
    pub emoji: String,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    pub goal_type: GoalType,
    /// Target per period. `0` is accepted; the completion rate guards the
    /// division.
    pub goal_count: u32,
    /// Lifetime count of successful check-ins.
    pub total_checkins: u32,
    /// Consecutive-day run ending at `last_checkin_date`.
    pub current_streak: u32,
    /// Historical maximum of `current_streak`.
    pub longest_streak: u32,
    /// Day id of the most recent check-in; `None` before the first one.
    pub last_checkin_date: Option<i64>,
    /// Visibility flag; does not gate check-in.
    pub is_public: bool,
}

impl Habit {
    /// Creates a habit record from caller input.
    ///
    /// Rejects out-of-range goal-type codes with `InvalidGoalType`. All
    /// counters start at zero and `last_checkin_date` starts absent.
    ///
    /// Returns the record together with its `HabitCreated` event.
    pub fn create(
        id: HabitId,
        caller: ActorId,
        request: NewHabit,
        now_ms: i64,
    ) -> Result<(Self, Vec<HabitEvent>), HabitTransitionError> {
        let goal_type = GoalType::from_code(request.goal_type)
            .ok_or(HabitTransitionError::InvalidGoalType {
                code: request.goal_type,
            })?;

        let habit = Self {
            id,
            owner: caller,
            name: request.name,
            description: request.description,
            emoji: request.emoji,
            created_at: now_ms,
            goal_type,
            goal_count: request.goal_count,
            total_checkins: 0,
            current_streak: 0,
            longest_streak: 0,
            last_checkin_date: None,
            is_public: request.is_public,
        };

        let events = vec![HabitEvent::HabitCreated {
            habit_id: habit.id,
            owner: habit.owner,
            name: habit.name.clone(),
        }];

        Ok((habit, events))
    }

    /// Applies one check-in for the day bucket of `now_ms`.
    ///
    /// Not owner-restricted: any caller may check in on any habit. The
    /// receipt is owned by `caller`.
    ///
    /// # Errors
    /// - `AlreadyCheckedInToday` when a check-in for this day id exists.
    /// - `InvalidDate` when the recorded last check-in is ahead of `now_ms`.
    ///
    /// Both rejections happen before any field is written, so a failed call
    /// leaves the record exactly as it was.
    pub fn check_in(
        &mut self,
        checkin_id: CheckInId,
        caller: ActorId,
        notes: Option<String>,
        now_ms: i64,
    ) -> Result<(CheckIn, Vec<HabitEvent>), HabitTransitionError> {
        let today = day_id(now_ms);

        if let Some(last) = self.last_checkin_date {
            if last == today {
                return Err(HabitTransitionError::AlreadyCheckedInToday { day: today });
            }
            if last > today {
                return Err(HabitTransitionError::InvalidDate {
                    last_checkin_date: last,
                    attempted: today,
                });
            }
        }

        let mut events = Vec::new();
        let yesterday = today - MS_PER_DAY;

        match self.last_checkin_date {
            None => {
                self.current_streak = 1;
            }
            Some(last) if last == yesterday => {
                self.current_streak += 1;
            }
            Some(_) => {
                // Gap of at least one missed day: close out the old run.
                events.push(HabitEvent::StreakBroken {
                    habit_id: self.id,
                    previous_streak: self.current_streak,
                });
                if self.current_streak > self.longest_streak {
                    self.longest_streak = self.current_streak;
                }
                self.current_streak = 1;
            }
        }

        self.total_checkins += 1;
        self.last_checkin_date = Some(today);

        // Idempotent fold; also covers the first-check-in and
        // consecutive-day branches above.
        if self.current_streak > self.longest_streak {
            self.longest_streak = self.current_streak;
        }

        let receipt = CheckIn {
            id: checkin_id,
            habit_id: self.id,
            owner: caller,
            date: today,
            notes: CheckIn::normalize_notes(notes),
        };

        events.push(HabitEvent::CheckInRecorded {
            habit_id: self.id,
            date: today,
            new_streak: self.current_streak,
            total_checkins: self.total_checkins,
        });

        Ok((receipt, events))
    }

    /// Applies an owner-gated partial update.
    ///
    /// Every supplied field is validated before any field is written, so a
    /// late validation failure can never leave earlier fields applied.
    /// Emits `HabitUpdated` even when no supplied value differs from the
    /// stored one.
    pub fn apply_update(
        &mut self,
        caller: ActorId,
        changes: HabitChanges,
    ) -> Result<Vec<HabitEvent>, HabitTransitionError> {
        self.ensure_owner(caller)?;

        let goal_type = match changes.goal_type {
            Some(code) => Some(
                GoalType::from_code(code)
                    .ok_or(HabitTransitionError::InvalidGoalType { code })?,
            ),
            None => None,
        };

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(emoji) = changes.emoji {
            self.emoji = emoji;
        }
        if let Some(goal_type) = goal_type {
            self.goal_type = goal_type;
        }
        if let Some(goal_count) = changes.goal_count {
            self.goal_count = goal_count;
        }
        if let Some(is_public) = changes.is_public {
            self.is_public = is_public;
        }

        Ok(vec![HabitEvent::HabitUpdated { habit_id: self.id }])
    }

    /// Authorizes permanent removal and produces its event.
    ///
    /// The store performs the actual delete; previously issued receipts stay
    /// untouched.
    pub fn delete(&self, caller: ActorId) -> Result<Vec<HabitEvent>, HabitTransitionError> {
        self.ensure_owner(caller)?;
        Ok(vec![HabitEvent::HabitDeleted { habit_id: self.id }])
    }

    /// Checks record invariants.
    ///
    /// Store paths call this before every write and after every read, so a
    /// corrupt row is rejected instead of masked.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.current_streak > self.longest_streak {
            return Err(HabitValidationError::StreakAboveLongest {
                current: self.current_streak,
                longest: self.longest_streak,
            });
        }
        if let Some(value) = self.last_checkin_date {
            if value < 0 || value % MS_PER_DAY != 0 {
                return Err(HabitValidationError::MisalignedCheckinDate { value });
            }
        }
        if self.created_at < 0 {
            return Err(HabitValidationError::NegativeCreatedAt {
                value: self.created_at,
            });
        }
        Ok(())
    }

    /// Projects every field except `last_checkin_date`.
    pub fn info(&self) -> HabitInfo {
        HabitInfo {
            id: self.id,
            owner: self.owner,
            name: self.name.clone(),
            description: self.description.clone(),
            emoji: self.emoji.clone(),
            created_at: self.created_at,
            goal_type: self.goal_type,
            goal_count: self.goal_count,
            total_checkins: self.total_checkins,
            current_streak: self.current_streak,
            longest_streak: self.longest_streak,
            is_public: self.is_public,
        }
    }

    /// Lifetime completion percentage over a `period_days` window, in
    /// `[0, 100]`.
    ///
    /// `0` when there is nothing to measure (`total_checkins`, `period_days`
    /// or `goal_count` is zero); otherwise
    /// `min(100, total_checkins * 100 / (period_days * goal_count))`.
    /// Counts lifetime check-ins, not check-ins within the window; a coarse
    /// approximation kept for parity with the recorded counters.
    pub fn completion_rate(&self, period_days: u32) -> u8 {
        if self.total_checkins == 0 || period_days == 0 || self.goal_count == 0 {
            return 0;
        }
        let expected = u64::from(period_days) * u64::from(self.goal_count);
        let rate = u64::from(self.total_checkins) * 100 / expected;
        rate.min(100) as u8
    }

    /// Whether a check-in for the day bucket of `now_ms` would be accepted
    /// by the same-day rule.
    pub fn can_check_in_today(&self, now_ms: i64) -> bool {
        match self.last_checkin_date {
            None => true,
            Some(last) => last != day_id(now_ms),
        }
    }

    /// Whole day buckets since creation, clamped to 0 when `now_ms` buckets
    /// before `created_at`.
    pub fn days_since_creation(&self, now_ms: i64) -> u64 {
        days_between(self.created_at, now_ms)
    }

    fn ensure_owner(&self, caller: ActorId) -> Result<(), HabitTransitionError> {
        if caller != self.owner {
            return Err(HabitTransitionError::NotOwner {
                habit_id: self.id,
                caller,
            });
        }
        Ok(())
    }
}
