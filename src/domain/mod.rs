/// Domain module containing the recurrence engine and core data types
///
/// This module defines the core entities (Habit, Completion) and the pure
/// functions that interpret them: the recurrence evaluator, the per-date
/// completion aggregator and the statistics engine. Nothing in here touches
/// storage, the clock (beyond stamping creation times) or any other
/// external state.

pub mod completion;
pub mod habit;
pub mod recurrence;
pub mod stats;
pub mod types;

// Re-export public types for easy access
pub use completion::*;
pub use habit::*;
pub use recurrence::*;
pub use stats::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
