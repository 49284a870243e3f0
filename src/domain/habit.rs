/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a recurring
/// habit being tracked, along with validation, the builder-style update
/// method, and the scheduling entry points that delegate to the recurrence
/// evaluator.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CompletionType, DomainError, HabitId, HabitStatus, RecurrenceRule};

/// A habit the user wants to perform on a recurring schedule
///
/// The engine only interprets `created_at` (the recurrence epoch),
/// `recurrence`, `completion_type` and `target_count`; name, category,
/// color, tags and description are opaque metadata carried for the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Free-form category label
    pub category: Option<String>,
    /// Display color for the UI
    pub color: Option<String>,
    /// Free-form tags
    pub tags: Option<Vec<String>>,
    /// Active habits appear in day-to-day views; archived ones keep history only
    pub status: HabitStatus,
    /// Creation date - the recurrence epoch. No date before this is ever active.
    pub created_at: NaiveDate,
    /// When and how often this habit repeats
    pub recurrence: RecurrenceRule,
    /// Whether a day is done/not-done or counted against a target
    pub completion_type: CompletionType,
    /// Per-day target for Count habits (e.g. 8 glasses)
    pub target_count: Option<u32>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// The creation date is stamped with today's date, which becomes the
    /// epoch all recurrence arithmetic is measured from.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        description: Option<String>,
        category: Option<String>,
        color: Option<String>,
        tags: Option<Vec<String>>,
        recurrence: RecurrenceRule,
        completion_type: CompletionType,
        target_count: Option<u32>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        Self::validate_tags(&tags)?;
        recurrence.validate()?;
        Self::validate_target(completion_type, &target_count)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            description,
            category,
            color,
            tags,
            status: HabitStatus::Active,
            created_at: Utc::now().date_naive(),
            recurrence,
            completion_type,
            target_count,
        })
    }

    /// Create a habit from existing data (used when loading from the database)
    ///
    /// Assumes the data was validated when it was first written.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        category: Option<String>,
        color: Option<String>,
        tags: Option<Vec<String>>,
        status: HabitStatus,
        created_at: NaiveDate,
        recurrence: RecurrenceRule,
        completion_type: CompletionType,
        target_count: Option<u32>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            color,
            tags,
            status,
            created_at,
            recurrence,
            completion_type,
            target_count,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// A recurrence change applies retroactively: the whole history is
    /// reinterpreted under the new rule the next time anything is computed.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        category: Option<Option<String>>,
        color: Option<Option<String>>,
        tags: Option<Option<Vec<String>>>,
        recurrence: Option<RecurrenceRule>,
        target_count: Option<Option<u32>>,
        status: Option<HabitStatus>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }
        if let Some(ref new_tags) = tags {
            Self::validate_tags(new_tags)?;
        }
        if let Some(ref new_rule) = recurrence {
            new_rule.validate()?;
        }
        let new_target = target_count.unwrap_or(self.target_count);
        Self::validate_target(self.completion_type, &new_target)?;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_category) = category {
            self.category = new_category;
        }
        if let Some(new_color) = color {
            self.color = new_color;
        }
        if let Some(new_tags) = tags {
            self.tags = new_tags;
        }
        if let Some(new_rule) = recurrence {
            self.recurrence = new_rule;
        }
        if let Some(new_target) = target_count {
            self.target_count = new_target;
        }
        if let Some(new_status) = status {
            self.status = new_status;
        }

        Ok(())
    }

    /// Is this habit scheduled on `date`?
    ///
    /// `history` carries this habit's completion dates; it is only consulted
    /// for `After` end rules and may be empty when no history is at hand.
    pub fn is_active_on(&self, date: NaiveDate, history: &[NaiveDate]) -> bool {
        self.recurrence.is_active_on(self.created_at, date, history)
    }

    /// Every date in `[start, end]` (inclusive) on which this habit is scheduled
    ///
    /// Walks the range one calendar day at a time, so cost is linear in the
    /// window length. Returns dates in ascending order.
    pub fn active_dates_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        history: &[NaiveDate],
    ) -> Vec<NaiveDate> {
        let mut active = Vec::new();
        let mut day = start;
        while day <= end {
            if self.is_active_on(day, history) {
                active.push(day);
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        active
    }

    /// The next scheduled date strictly after `date`, if one exists within a year
    ///
    /// Bounded scan so rules that have ended (or never fire again) return None
    /// instead of walking forever.
    pub fn next_active_date(&self, date: NaiveDate, history: &[NaiveDate]) -> Option<NaiveDate> {
        let mut day = date.succ_opt()?;
        let horizon = date + Duration::days(366);
        while day <= horizon {
            if self.is_active_on(day, history) {
                return Some(day);
            }
            day = day.succ_opt()?;
        }
        None
    }

    /// The per-day target used in completion math
    ///
    /// An unset (or zero) target on a Count habit resolves to 1, so a bare
    /// Count habit completes on its first count. Simple habits always
    /// resolve to 1.
    pub fn effective_target(&self) -> u32 {
        match self.completion_type {
            CompletionType::Simple => 1,
            CompletionType::Count => match self.target_count {
                Some(target) if target > 0 => target,
                _ => 1,
            },
        }
    }

    /// Check whether this habit should show up in active views
    pub fn is_archived(&self) -> bool {
        self.status == HabitStatus::Archived
    }

    // Validation helper methods

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.len() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_tags(tags: &Option<Vec<String>>) -> Result<(), DomainError> {
        if let Some(tag_list) = tags {
            for tag in tag_list {
                if tag.trim().is_empty() {
                    return Err(DomainError::Validation {
                        message: "Tags cannot be empty".to_string(),
                    });
                }
                if tag.len() > 50 {
                    return Err(DomainError::Validation {
                        message: "Tags cannot be longer than 50 characters".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_target(
        completion_type: CompletionType,
        target_count: &Option<u32>,
    ) -> Result<(), DomainError> {
        if let Some(target) = target_count {
            if completion_type == CompletionType::Simple {
                return Err(DomainError::InvalidValue {
                    message: "Simple habits do not take a target count".to_string(),
                });
            }
            if *target == 0 {
                return Err(DomainError::InvalidValue {
                    message: "Target count must be greater than 0".to_string(),
                });
            }
            if *target > 10000 {
                return Err(DomainError::InvalidValue {
                    message: "Target count cannot exceed 10000".to_string(),
                });
            }
        }
        Ok(())
    }
}
