//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the transition engine runs against.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Habit::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - A repository instance is the single writer for its connection.

pub mod habit_repo;
