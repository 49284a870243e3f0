/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{CompletionType, DomainError, EndRule, Habit, RecurrenceRule};
use crate::storage::{HabitStore, StorageError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit (e.g. "Morning Run")
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Free-form category label (e.g. "health")
    pub category: Option<String>,
    /// Display color for UIs (e.g. "#ff7043")
    pub color: Option<String>,
    /// Free-form tags
    pub tags: Option<Vec<String>>,
    /// "simple" (done/not-done) or "count" (accumulate toward a target).
    /// Defaults to simple.
    pub completion_type: Option<String>,
    /// Per-day target for count habits
    pub target_count: Option<u32>,
    /// Recurrence rule as tagged JSON, e.g.
    /// {"type":"weekly","interval":1,"days":["Mon","Wed"],"ends":{"type":"never"}}.
    /// Defaults to daily.
    pub recurrence: Option<serde_json::Value>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit_id: Option<String>,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStore>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, StorageError> {
    let completion_type = match params.completion_type.as_deref() {
        None => CompletionType::Simple,
        Some(raw) => CompletionType::parse(raw.trim()).ok_or_else(|| {
            StorageError::Domain(DomainError::InvalidValue {
                message: format!(
                    "Invalid completion type '{}'. Valid options: simple, count",
                    raw
                ),
            })
        })?,
    };

    let recurrence = match params.recurrence {
        Some(value) => serde_json::from_value::<RecurrenceRule>(value)?,
        None => RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
    };

    let habit = Habit::new(
        params.name.clone(),
        params.description,
        params.category,
        params.color,
        params.tags,
        recurrence,
        completion_type,
        params.target_count,
    )?;

    let habit_id = habit.id.to_string();
    let schedule = habit.recurrence.describe();

    storage.create_habit(&habit)?;

    Ok(CreateHabitResponse {
        success: true,
        habit_id: Some(habit_id),
        message: format!("✅ Created habit '{}' ({})", params.name, schedule),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn scratch_store() -> (SqliteStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteStore::new(file.path().to_path_buf()).unwrap();
        (store, file)
    }

    #[test]
    fn test_create_with_default_recurrence() {
        let (store, _file) = scratch_store();
        let params = CreateHabitParams {
            name: "Meditate".to_string(),
            description: None,
            category: None,
            color: None,
            tags: None,
            completion_type: None,
            target_count: None,
            recurrence: None,
        };

        let response = create_habit(&store, params).unwrap();
        assert!(response.success);
        assert!(response.message.contains("Daily"));

        let habits = store.list_habits(false).unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(
            habits[0].recurrence,
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never }
        );
    }

    #[test]
    fn test_create_with_weekly_recurrence_json() {
        let (store, _file) = scratch_store();
        let params = CreateHabitParams {
            name: "Gym".to_string(),
            description: None,
            category: Some("health".to_string()),
            color: None,
            tags: None,
            completion_type: Some("count".to_string()),
            target_count: Some(3),
            recurrence: Some(json!({
                "type": "weekly",
                "interval": 1,
                "days": ["Mon", "Wed", "Fri"],
                "ends": {"type": "never"}
            })),
        };

        let response = create_habit(&store, params).unwrap();
        assert!(response.success);

        let habits = store.list_habits(false).unwrap();
        assert_eq!(habits[0].completion_type, CompletionType::Count);
        assert_eq!(habits[0].target_count, Some(3));
    }

    #[test]
    fn test_create_rejects_bad_completion_type() {
        let (store, _file) = scratch_store();
        let params = CreateHabitParams {
            name: "Gym".to_string(),
            description: None,
            category: None,
            color: None,
            tags: None,
            completion_type: Some("timer".to_string()),
            target_count: None,
            recurrence: None,
        };

        assert!(create_habit(&store, params).is_err());
    }

    #[test]
    fn test_create_rejects_invalid_rule() {
        let (store, _file) = scratch_store();
        let params = CreateHabitParams {
            name: "Gym".to_string(),
            description: None,
            category: None,
            color: None,
            tags: None,
            completion_type: None,
            target_count: None,
            recurrence: Some(json!({
                "type": "weekly",
                "interval": 1,
                "days": [],
                "ends": {"type": "never"}
            })),
        };

        assert!(create_habit(&store, params).is_err());
        assert!(store.list_habits(true).unwrap().is_empty());
    }
}
