/// Tools for logging and un-logging habit completions
///
/// This module implements the habit_log and habit_unlog MCP tools. Logging
/// appends a completion record (several may land on the same day - they
/// sum); un-logging removes the most recently logged record for a day,
/// which restores the day's aggregate state to what it was before.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::stats::calculate_streak;
use crate::domain::{completion_progress, total_count_for_date, Completion, CompletionType};
use crate::storage::{HabitStore, StorageError};
use crate::tools::{parse_date, parse_habit_id};

/// Parameters for logging a habit completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogCompletionParams {
    /// ID of the habit to log
    pub habit_id: String,
    /// Date completed (YYYY-MM-DD); defaults to today
    pub date: Option<String>,
    /// Amount completed; defaults to 1
    pub count: Option<u32>,
    /// Optional notes about this completion
    pub notes: Option<String>,
}

/// Response from logging a habit completion
#[derive(Debug, Serialize)]
pub struct LogCompletionResponse {
    pub success: bool,
    pub message: String,
    pub current_streak: u32,
}

/// Log a habit completion using the provided storage
pub fn log_completion<S: HabitStore>(
    storage: &S,
    params: LogCompletionParams,
) -> Result<LogCompletionResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let completed_date = match params.date {
        Some(ref raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };
    let count = params.count.unwrap_or(1);

    let completion = Completion::new(habit_id.clone(), completed_date, count, params.notes)?;
    storage.create_completion(&completion)?;

    let completions = storage.completions_for_habit(&habit_id, None)?;
    let today = Utc::now().date_naive();
    let current_streak = calculate_streak(&habit, &completions, today);

    let progress_note = match habit.completion_type {
        CompletionType::Simple => String::new(),
        CompletionType::Count => {
            let total = total_count_for_date(&completions, &habit_id, completed_date);
            let target = habit.effective_target();
            let percent = completion_progress(&habit, &completions, completed_date) * 100.0;
            format!(" {} of {} on {} ({:.0}%).", total, target, completed_date, percent)
        }
    };

    Ok(LogCompletionResponse {
        success: true,
        message: format!(
            "🔥 Logged '{}'.{} Current streak: {} day{}",
            habit.name,
            progress_note,
            current_streak,
            if current_streak == 1 { "" } else { "s" }
        ),
        current_streak,
    })
}

/// Parameters for removing a logged completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UnlogCompletionParams {
    /// ID of the habit
    pub habit_id: String,
    /// Date to un-log (YYYY-MM-DD); defaults to today
    pub date: Option<String>,
}

/// Response from removing a completion
#[derive(Debug, Serialize)]
pub struct UnlogCompletionResponse {
    pub success: bool,
    pub message: String,
    pub current_streak: u32,
}

/// Remove the most recently logged completion record for a day
pub fn unlog_completion<S: HabitStore>(
    storage: &S,
    params: UnlogCompletionParams,
) -> Result<UnlogCompletionResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let date = match params.date {
        Some(ref raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let completions = storage.completions_for_habit(&habit_id, None)?;
    let target = completions
        .iter()
        .filter(|c| c.completed_date == date)
        .max_by_key(|c| c.logged_at)
        .ok_or_else(|| StorageError::CompletionNotFound {
            completion_id: format!("{} on {}", habit_id.to_string(), date),
        })?;

    storage.delete_completion(&target.id)?;

    let completions = storage.completions_for_habit(&habit_id, None)?;
    let today = Utc::now().date_naive();
    let current_streak = calculate_streak(&habit, &completions, today);

    Ok(UnlogCompletionResponse {
        success: true,
        message: format!("↩️ Removed a completion of '{}' on {}", habit.name, date),
        current_streak,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{is_fully_completed, EndRule, Habit, RecurrenceRule};
    use crate::storage::SqliteStore;
    use tempfile::NamedTempFile;

    fn scratch_store() -> (SqliteStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteStore::new(file.path().to_path_buf()).unwrap();
        (store, file)
    }

    fn seeded_habit(store: &SqliteStore, completion_type: CompletionType, target: Option<u32>) -> Habit {
        let habit = Habit::new(
            "Drink Water".to_string(),
            None,
            None,
            None,
            None,
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            completion_type,
            target,
        )
        .unwrap();
        store.create_habit(&habit).unwrap();
        habit
    }

    #[test]
    fn test_log_defaults_to_today_and_reports_streak() {
        let (store, _file) = scratch_store();
        let habit = seeded_habit(&store, CompletionType::Simple, None);

        let response = log_completion(
            &store,
            LogCompletionParams {
                habit_id: habit.id.to_string(),
                date: None,
                count: None,
                notes: None,
            },
        )
        .unwrap();

        assert!(response.success);
        assert_eq!(response.current_streak, 1);

        let completions = store.completions_for_habit(&habit.id, None).unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].completed_date, Utc::now().date_naive());
        assert_eq!(completions[0].count, 1);
    }

    #[test]
    fn test_log_unknown_habit_fails() {
        let (store, _file) = scratch_store();
        let result = log_completion(
            &store,
            LogCompletionParams {
                habit_id: crate::domain::HabitId::new().to_string(),
                date: None,
                count: None,
                notes: None,
            },
        );
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_repeated_logs_accumulate_for_count_habits() {
        let (store, _file) = scratch_store();
        let habit = seeded_habit(&store, CompletionType::Count, Some(3));
        let today = Utc::now().date_naive();

        for _ in 0..2 {
            log_completion(
                &store,
                LogCompletionParams {
                    habit_id: habit.id.to_string(),
                    date: None,
                    count: Some(1),
                    notes: None,
                },
            )
            .unwrap();
        }

        let completions = store.completions_for_habit(&habit.id, None).unwrap();
        assert_eq!(total_count_for_date(&completions, &habit.id, today), 2);
        assert!(!is_fully_completed(&habit, &completions, today));

        log_completion(
            &store,
            LogCompletionParams {
                habit_id: habit.id.to_string(),
                date: None,
                count: Some(1),
                notes: None,
            },
        )
        .unwrap();

        let completions = store.completions_for_habit(&habit.id, None).unwrap();
        assert!(is_fully_completed(&habit, &completions, today));
    }

    #[test]
    fn test_unlog_restores_previous_state() {
        let (store, _file) = scratch_store();
        let habit = seeded_habit(&store, CompletionType::Simple, None);
        let today = Utc::now().date_naive();

        log_completion(
            &store,
            LogCompletionParams {
                habit_id: habit.id.to_string(),
                date: None,
                count: None,
                notes: None,
            },
        )
        .unwrap();

        let response = unlog_completion(
            &store,
            UnlogCompletionParams { habit_id: habit.id.to_string(), date: None },
        )
        .unwrap();
        assert!(response.success);
        assert_eq!(response.current_streak, 0);

        let completions = store.completions_for_habit(&habit.id, None).unwrap();
        assert_eq!(total_count_for_date(&completions, &habit.id, today), 0);
        assert!(!is_fully_completed(&habit, &completions, today));
    }

    #[test]
    fn test_unlog_with_nothing_logged_fails() {
        let (store, _file) = scratch_store();
        let habit = seeded_habit(&store, CompletionType::Simple, None);

        let result = unlog_completion(
            &store,
            UnlogCompletionParams { habit_id: habit.id.to_string(), date: None },
        );
        assert!(matches!(result, Err(StorageError::CompletionNotFound { .. })));
    }
}
