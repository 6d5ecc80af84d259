//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate transition + repository calls into host-facing APIs.
//! - Keep host/SDK layers decoupled from storage details.

pub mod habit_service;
