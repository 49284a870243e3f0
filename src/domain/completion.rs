/// Completion records and per-date aggregation
///
/// A Completion is one logged instance of doing a habit on a calendar day.
/// Several records may exist for the same habit and day - the aggregation
/// functions here sum them, so deleting one record cleanly unwinds its
/// contribution. This module is the bridge between raw records and the
/// "was this day done?" questions the statistics engine asks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CompletionId, CompletionType, DomainError, Habit, HabitId};

/// A record of completing a habit on a specific day
///
/// `completed_date` is a calendar day, distinct from `logged_at` (when the
/// record was written) - completions can be logged retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Unique identifier for this record
    pub id: CompletionId,
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// Which day the completion counts toward
    pub completed_date: NaiveDate,
    /// Amount completed; Simple habits log 1
    pub count: u32,
    /// User's notes about this completion
    pub notes: Option<String>,
    /// When this record was created
    pub logged_at: DateTime<Utc>,
}

impl Completion {
    /// Create a new completion record with validation
    pub fn new(
        habit_id: HabitId,
        completed_date: NaiveDate,
        count: u32,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_completed_date(&completed_date)?;
        Self::validate_count(count)?;
        Self::validate_notes(&notes)?;

        Ok(Self {
            id: CompletionId::new(),
            habit_id,
            completed_date,
            count,
            notes,
            logged_at: Utc::now(),
        })
    }

    /// Create a completion from existing data (used when loading from the database)
    pub fn from_existing(
        id: CompletionId,
        habit_id: HabitId,
        completed_date: NaiveDate,
        count: u32,
        notes: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            habit_id,
            completed_date,
            count,
            notes,
            logged_at,
        }
    }

    /// Adjust the logged amount on an existing record
    pub fn set_count(&mut self, count: u32) -> Result<(), DomainError> {
        Self::validate_count(count)?;
        self.count = count;
        Ok(())
    }

    // Validation helper methods

    fn validate_completed_date(date: &NaiveDate) -> Result<(), DomainError> {
        let today = Utc::now().date_naive();
        if *date > today {
            return Err(DomainError::InvalidDate(
                "Cannot log completions for future dates".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_count(count: u32) -> Result<(), DomainError> {
        if count == 0 {
            return Err(DomainError::InvalidValue {
                message: "Completion count must be at least 1".to_string(),
            });
        }
        if count > 10000 {
            return Err(DomainError::InvalidValue {
                message: "Completion count cannot exceed 10000".to_string(),
            });
        }
        Ok(())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.len() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Notes cannot be longer than 500 characters".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// All records for one habit on one calendar day
pub fn completions_for_date<'a>(
    completions: &'a [Completion],
    habit_id: &HabitId,
    date: NaiveDate,
) -> Vec<&'a Completion> {
    completions
        .iter()
        .filter(|c| c.habit_id == *habit_id && c.completed_date == date)
        .collect()
}

/// Total amount logged for one habit on one day, summed across records
pub fn total_count_for_date(
    completions: &[Completion],
    habit_id: &HabitId,
    date: NaiveDate,
) -> u32 {
    completions
        .iter()
        .filter(|c| c.habit_id == *habit_id && c.completed_date == date)
        .map(|c| c.count)
        .sum()
}

/// Has the day's completion criterion been met?
///
/// Simple habits need any record at all; Count habits need the summed count
/// to reach the target (an unset target behaves as 1, see
/// `Habit::effective_target`).
pub fn is_fully_completed(habit: &Habit, completions: &[Completion], date: NaiveDate) -> bool {
    let total = total_count_for_date(completions, &habit.id, date);
    match habit.completion_type {
        CompletionType::Simple => total > 0,
        CompletionType::Count => total >= habit.effective_target(),
    }
}

/// Fraction of the day's target met, in [0, 1]
///
/// Simple habits report 0 or 1, mirroring `is_fully_completed`; Count
/// habits report `min(total / target, 1)`. Over-completion never pushes
/// progress past 1.
pub fn completion_progress(habit: &Habit, completions: &[Completion], date: NaiveDate) -> f64 {
    match habit.completion_type {
        CompletionType::Simple => {
            if is_fully_completed(habit, completions, date) {
                1.0
            } else {
                0.0
            }
        }
        CompletionType::Count => {
            let total = total_count_for_date(completions, &habit.id, date);
            let target = habit.effective_target();
            (total as f64 / target as f64).min(1.0)
        }
    }
}

/// The habit's completion dates, the history slice the evaluator's `After`
/// end rule consumes
///
/// Dates are returned in record order; `EndRule::allows` only counts
/// membership, so ordering does not matter.
pub fn completion_dates(completions: &[Completion], habit_id: &HabitId) -> Vec<NaiveDate> {
    completions
        .iter()
        .filter(|c| c.habit_id == *habit_id)
        .map(|c| c.completed_date)
        .collect()
}
