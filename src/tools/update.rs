/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify habit
/// properties - name, metadata, target, recurrence - and to archive or
/// restore a habit. A recurrence edit applies retroactively: the whole
/// completion history is reinterpreted under the new rule.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{HabitStatus, RecurrenceRule};
use crate::storage::{HabitStore, StorageError};
use crate::tools::parse_habit_id;

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub tags: Option<Vec<String>>,
    /// New recurrence rule as tagged JSON (applies retroactively)
    pub recurrence: Option<serde_json::Value>,
    /// New per-day target for count habits
    pub target_count: Option<u32>,
    /// true to archive, false to restore
    pub archived: Option<bool>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStore>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = storage.get_habit(&habit_id)?;

    let recurrence = match params.recurrence {
        Some(value) => Some(serde_json::from_value::<RecurrenceRule>(value)?),
        None => None,
    };
    let status = params.archived.map(|archived| {
        if archived {
            HabitStatus::Archived
        } else {
            HabitStatus::Active
        }
    });

    let rule_changed = recurrence.is_some();

    habit.update(
        params.name,
        params.description.map(Some),
        params.category.map(Some),
        params.color.map(Some),
        params.tags.map(Some),
        recurrence,
        params.target_count.map(Some),
        status,
    )?;

    storage.update_habit(&habit)?;

    let message = match params.archived {
        Some(true) => format!("🗄️ Archived habit '{}' (history retained)", habit.name),
        Some(false) => format!("▶️ Restored habit '{}'", habit.name),
        None if rule_changed => format!(
            "✅ Updated habit '{}' - now {}. Past activity is reinterpreted under the new schedule.",
            habit.name,
            habit.recurrence.describe()
        ),
        None => format!("✅ Updated habit '{}'", habit.name),
    };

    Ok(UpdateHabitResponse { success: true, message })
}
