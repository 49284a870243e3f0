/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call to interact with the habit tracker. Each tool is a plain function
/// generic over the storage trait, so the whole layer is testable against a
/// scratch database.

pub mod create;
pub mod list;
pub mod log;
pub mod stats;
pub mod status;
pub mod update;

// Re-export tool functions for easy access
pub use create::*;
pub use list::*;
pub use log::*;
pub use stats::*;
pub use status::*;
pub use update::*;

use chrono::NaiveDate;

use crate::domain::{DomainError, HabitId};
use crate::storage::StorageError;

/// Parse a habit id argument, mapping bad input to a not-found error
pub(crate) fn parse_habit_id(s: &str) -> Result<HabitId, StorageError> {
    HabitId::from_string(s.trim()).map_err(|_| StorageError::HabitNotFound {
        habit_id: s.to_string(),
    })
}

/// Parse a YYYY-MM-DD date argument
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        StorageError::Domain(DomainError::InvalidDate(format!(
            "Expected YYYY-MM-DD, got '{}'",
            s
        )))
    })
}
