/// Core identifier and enum types used throughout the domain layer
///
/// This module defines the id newtypes and the small closed enums
/// (habit status, completion type) shared by the other domain entities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a habit ID where a completion ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Convert to string representation
    pub fn to_string(&self) -> String {
        self.0.to_string()
    }
}

/// Unique identifier for a completion record
///
/// Similar to HabitId but for individual completion records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompletionId(pub Uuid);

impl CompletionId {
    /// Generate a new random completion ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a completion ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Convert to string representation
    pub fn to_string(&self) -> String {
        self.0.to_string()
    }
}

/// Lifecycle state of a habit
///
/// Archived habits stop appearing in active views but keep their history.
/// Deleting a habit (a storage operation) discards the history instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    Active,
    Archived,
}

impl HabitStatus {
    /// String form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitStatus::Active => "active",
            HabitStatus::Archived => "archived",
        }
    }

    /// Parse the database string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(HabitStatus::Active),
            "archived" => Some(HabitStatus::Archived),
            _ => None,
        }
    }
}

/// How completion is judged for a single day
///
/// Simple habits are done/not-done; Count habits accumulate a count per day
/// against a target (e.g. 8 glasses of water).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionType {
    Simple,
    Count,
}

impl CompletionType {
    /// String form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionType::Simple => "simple",
            CompletionType::Count => "count",
        }
    }

    /// Parse the database string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(CompletionType::Simple),
            "count" => Some(CompletionType::Count),
            _ => None,
        }
    }
}
