//! Habit use-case service.
//!
//! # Responsibility
//! - Run habit transitions against repository persistence.
//! - Allocate record ids and thread host-supplied clock/caller identity.
//! - Emit metadata-only diagnostic log lines per mutation.
//!
//! # Invariants
//! - `now` and caller identity always come from the hosting environment,
//!   never from record data.
//! - Transition failures are returned before any persistence happens;
//!   a failed call leaves the stored record unchanged.
//! - Mutating APIs take `&mut self`: one service instance is the single
//!   writer for its store handle.

use crate::model::checkin::{CheckIn, CheckInId};
use crate::model::event::HabitEvent;
use crate::model::habit::{
    ActorId, Habit, HabitChanges, HabitId, HabitInfo, HabitTransitionError, NewHabit,
};
use crate::repo::habit_repo::{CheckInListQuery, HabitRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum HabitServiceError {
    /// The transition itself rejected the call.
    Transition(HabitTransitionError),
    /// Target habit does not exist.
    HabitNotFound(HabitId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transition(err) => write!(f, "{err}"),
            Self::HabitNotFound(habit_id) => write!(f, "habit not found: {habit_id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            Self::HabitNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<HabitTransitionError> for HabitServiceError {
    fn from(value: HabitTransitionError) -> Self {
        Self::Transition(value)
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(habit_id) => Self::HabitNotFound(habit_id),
            other => Self::Repo(other),
        }
    }
}

/// Result envelope for a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInOutcome {
    /// The issued receipt, owned by the caller who checked in.
    pub receipt: CheckIn,
    /// Events describing the transition, in emission order.
    pub events: Vec<HabitEvent>,
}

/// Habit service facade over repository implementations.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new habit for `caller` and persists it.
    ///
    /// The returned id is the caller's handle for every later operation;
    /// there is no owner-to-habits reverse index in this core.
    pub fn create_habit(
        &mut self,
        caller: ActorId,
        request: NewHabit,
        now_ms: i64,
    ) -> Result<(HabitId, Vec<HabitEvent>), HabitServiceError> {
        let (habit, events) = Habit::create(Uuid::new_v4(), caller, request, now_ms)?;
        self.repo.create_habit(&habit)?;

        info!(
            "event=habit_create module=service status=ok habit_id={} goal_type={} public={}",
            habit.id,
            habit.goal_type.code(),
            habit.is_public
        );
        Ok((habit.id, events))
    }

    /// Records one check-in on behalf of `caller`.
    ///
    /// Not owner-gated: any caller may check in on any habit. The habit row
    /// and the receipt are persisted in one repository transaction.
    pub fn check_in(
        &mut self,
        habit_id: HabitId,
        caller: ActorId,
        notes: Option<String>,
        now_ms: i64,
    ) -> Result<CheckInOutcome, HabitServiceError> {
        let mut habit = self.load_habit(habit_id)?;

        let (receipt, events) = match habit.check_in(Uuid::new_v4(), caller, notes, now_ms) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    "event=habit_checkin module=service status=rejected habit_id={habit_id} error={err}"
                );
                return Err(err.into());
            }
        };
        self.repo.record_check_in(&habit, &receipt)?;

        info!(
            "event=habit_checkin module=service status=ok habit_id={} day={} streak={} total={}",
            habit_id, receipt.date, habit.current_streak, habit.total_checkins
        );
        Ok(CheckInOutcome { receipt, events })
    }

    /// Applies an owner-gated partial update and persists the result.
    pub fn update_habit(
        &mut self,
        habit_id: HabitId,
        caller: ActorId,
        changes: HabitChanges,
    ) -> Result<Vec<HabitEvent>, HabitServiceError> {
        let mut habit = self.load_habit(habit_id)?;

        let events = match habit.apply_update(caller, changes) {
            Ok(events) => events,
            Err(err) => {
                warn!(
                    "event=habit_update module=service status=rejected habit_id={habit_id} error={err}"
                );
                return Err(err.into());
            }
        };
        self.repo.update_habit(&habit)?;

        info!("event=habit_update module=service status=ok habit_id={habit_id}");
        Ok(events)
    }

    /// Permanently deletes an owner's habit. Issued receipts survive.
    pub fn delete_habit(
        &mut self,
        habit_id: HabitId,
        caller: ActorId,
    ) -> Result<Vec<HabitEvent>, HabitServiceError> {
        let habit = self.load_habit(habit_id)?;

        let events = match habit.delete(caller) {
            Ok(events) => events,
            Err(err) => {
                warn!(
                    "event=habit_delete module=service status=rejected habit_id={habit_id} error={err}"
                );
                return Err(err.into());
            }
        };
        self.repo.delete_habit(habit_id)?;

        info!("event=habit_delete module=service status=ok habit_id={habit_id}");
        Ok(events)
    }

    /// Gets one habit record by id.
    pub fn get_habit(&self, habit_id: HabitId) -> RepoResult<Option<Habit>> {
        self.repo.get_habit(habit_id)
    }

    /// Projects every habit field except `last_checkin_date`.
    pub fn habit_info(&self, habit_id: HabitId) -> Result<HabitInfo, HabitServiceError> {
        Ok(self.load_habit(habit_id)?.info())
    }

    /// Lifetime completion percentage over `period_days`, in `[0, 100]`.
    pub fn completion_rate(
        &self,
        habit_id: HabitId,
        period_days: u32,
    ) -> Result<u8, HabitServiceError> {
        Ok(self.load_habit(habit_id)?.completion_rate(period_days))
    }

    /// Whether the same-day rule would accept a check-in right now.
    pub fn can_check_in_today(
        &self,
        habit_id: HabitId,
        now_ms: i64,
    ) -> Result<bool, HabitServiceError> {
        Ok(self.load_habit(habit_id)?.can_check_in_today(now_ms))
    }

    /// Whole day buckets since the habit was created.
    pub fn days_since_creation(
        &self,
        habit_id: HabitId,
        now_ms: i64,
    ) -> Result<u64, HabitServiceError> {
        Ok(self.load_habit(habit_id)?.days_since_creation(now_ms))
    }

    /// Gets one receipt by id.
    pub fn get_check_in(&self, id: CheckInId) -> RepoResult<Option<CheckIn>> {
        self.repo.get_check_in(id)
    }

    /// Lists receipts using owner/habit filters + pagination.
    pub fn list_check_ins(&self, query: &CheckInListQuery) -> RepoResult<Vec<CheckIn>> {
        self.repo.list_check_ins(query)
    }

    fn load_habit(&self, habit_id: HabitId) -> Result<Habit, HabitServiceError> {
        self.repo
            .get_habit(habit_id)?
            .ok_or(HabitServiceError::HabitNotFound(habit_id))
    }
}
