/// Tool for listing habits with live statistics
///
/// This module implements the habit_list MCP tool. Streaks and rates are
/// recomputed from the completion records on every call - there is no
/// cached copy to drift out of date.

use chrono::{Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::stats::{calculate_streak, completion_rate};
use crate::storage::{HabitStore, StorageError};

/// How many days back the listing's completion rate looks
const LIST_RATE_WINDOW_DAYS: i64 = 30;

/// Parameters for listing habits
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Include archived habits (default: false)
    pub include_archived: Option<bool>,
    /// Sort by: "name", "streak" or "completion_rate" (default: name)
    pub sort_by: Option<String>,
}

/// One habit in the listing
#[derive(Debug, Serialize)]
pub struct HabitOverview {
    pub habit_id: String,
    pub name: String,
    pub category: Option<String>,
    pub schedule: String,
    pub status: String,
    pub current_streak: u32,
    /// Completion rate over the last 30 days
    pub completion_rate: f64,
    pub total_completions: u32,
}

/// Summary statistics across the listing
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub active_habits: u32,
    pub avg_completion_rate: f64,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitOverview>,
    pub summary: HabitListSummary,
}

/// List habits using the provided storage
pub fn list_habits<S: HabitStore>(
    storage: &S,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, StorageError> {
    let include_archived = params.include_archived.unwrap_or(false);
    let habits = storage.list_habits(include_archived)?;

    let today = Utc::now().date_naive();
    let window_start = today - Duration::days(LIST_RATE_WINDOW_DAYS - 1);

    let mut overviews = Vec::with_capacity(habits.len());
    for habit in &habits {
        let completions = storage.completions_for_habit(&habit.id, None)?;

        overviews.push(HabitOverview {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            category: habit.category.clone(),
            schedule: habit.recurrence.describe(),
            status: habit.status.as_str().to_string(),
            current_streak: calculate_streak(habit, &completions, today),
            completion_rate: completion_rate(habit, &completions, window_start, today),
            total_completions: completions.len() as u32,
        });
    }

    match params.sort_by.as_deref() {
        Some("streak") => {
            overviews.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
        }
        Some("completion_rate") => {
            overviews.sort_by(|a, b| {
                b.completion_rate
                    .partial_cmp(&a.completion_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        _ => {
            overviews.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
    }

    let total_habits = overviews.len() as u32;
    let active_habits = overviews.iter().filter(|h| h.status == "active").count() as u32;
    let avg_completion_rate = if overviews.is_empty() {
        0.0
    } else {
        overviews.iter().map(|h| h.completion_rate).sum::<f64>() / overviews.len() as f64
    };

    Ok(ListHabitsResponse {
        habits: overviews,
        summary: HabitListSummary {
            total_habits,
            active_habits,
            avg_completion_rate,
        },
    })
}
