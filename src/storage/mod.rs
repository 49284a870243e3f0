/// Storage layer for persisting habits and completions
///
/// This module handles all database operations using SQLite. The engine in
/// `domain` never touches it - the tool layer reads a snapshot of records
/// out of here and hands it to the pure functions.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Completion, CompletionId, DomainError, Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Completion not found: {completion_id}")]
    CompletionNotFound { completion_id: String },

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Trait defining the storage interface for habits and completions
///
/// This keeps the tool layer generic over the backing store, which also
/// makes the tools testable against scratch databases.
pub trait HabitStore {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit (including recurrence edits, which apply
    /// retroactively by design)
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Archive a habit (soft - history is retained)
    fn archive_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// Delete a habit and its completion history (hard)
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits, newest first; optionally include archived ones
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError>;

    /// Create a new completion record
    fn create_completion(&self, completion: &Completion) -> Result<(), StorageError>;

    /// Update an existing completion record (count/notes adjustments)
    fn update_completion(&self, completion: &Completion) -> Result<(), StorageError>;

    /// Delete a single completion record
    fn delete_completion(&self, completion_id: &CompletionId) -> Result<(), StorageError>;

    /// All completions for one habit, optionally bounded to a date range
    fn completions_for_habit(
        &self,
        habit_id: &HabitId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Completion>, StorageError>;

    /// All completions (any habit) within a date range
    fn completions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Completion>, StorageError>;
}
