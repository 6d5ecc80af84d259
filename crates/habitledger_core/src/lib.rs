//! Core domain logic for the habit ledger.
//! This crate is the single source of truth for streak/check-in invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::checkin::{CheckIn, CheckInId};
pub use model::day::{day_id, days_between, same_day, MS_PER_DAY};
pub use model::event::HabitEvent;
pub use model::habit::{
    ActorId, GoalType, Habit, HabitChanges, HabitId, HabitInfo, HabitTransitionError,
    HabitValidationError, NewHabit,
};
pub use repo::habit_repo::{
    CheckInListQuery, HabitRepository, RepoError, RepoResult, SqliteHabitRepository,
};
pub use service::habit_service::{CheckInOutcome, HabitService, HabitServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
