/// Tool for checking day-to-day habit status
///
/// This module implements the habit_status MCP tool: is the habit scheduled
/// today, how far along is today's completion, what is the current streak
/// and when is the next scheduled date.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::stats::calculate_streak;
use crate::domain::{
    completion_dates, completion_progress, is_fully_completed, total_count_for_date, Habit,
};
use crate::storage::{HabitStore, StorageError};
use crate::tools::{parse_date, parse_habit_id};

/// Parameters for checking habit status
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatusParams {
    /// ID of a specific habit (optional - shows all active habits if omitted)
    pub habit_id: Option<String>,
    /// Reference date (YYYY-MM-DD); defaults to today
    pub date: Option<String>,
}

/// Status of a single habit on the reference date
#[derive(Debug, Serialize)]
pub struct HabitDayStatus {
    pub habit_id: String,
    pub name: String,
    pub schedule: String,
    /// Is the habit scheduled on the reference date?
    pub scheduled: bool,
    /// Summed count logged for the reference date
    pub count: u32,
    /// Fraction of the day's target met, 0..1
    pub progress: f64,
    pub fully_completed: bool,
    pub current_streak: u32,
    /// Next scheduled date strictly after the reference date, if any within a year
    pub next_active_date: Option<String>,
}

/// Response from checking habit status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub date: String,
    pub habits: Vec<HabitDayStatus>,
    pub message: String,
}

fn day_status<S: HabitStore>(
    storage: &S,
    habit: &Habit,
    date: chrono::NaiveDate,
) -> Result<HabitDayStatus, StorageError> {
    let completions = storage.completions_for_habit(&habit.id, None)?;
    let history = completion_dates(&completions, &habit.id);

    Ok(HabitDayStatus {
        habit_id: habit.id.to_string(),
        name: habit.name.clone(),
        schedule: habit.recurrence.describe(),
        scheduled: habit.is_active_on(date, &history),
        count: total_count_for_date(&completions, &habit.id, date),
        progress: completion_progress(habit, &completions, date),
        fully_completed: is_fully_completed(habit, &completions, date),
        current_streak: calculate_streak(habit, &completions, date),
        next_active_date: habit.next_active_date(date, &history).map(|d| d.to_string()),
    })
}

/// Get status for habits using the provided storage
pub fn habit_status<S: HabitStore>(
    storage: &S,
    params: StatusParams,
) -> Result<StatusResponse, StorageError> {
    let date = match params.date {
        Some(ref raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let statuses = match params.habit_id {
        Some(ref raw_id) => {
            let habit_id = parse_habit_id(raw_id)?;
            let habit = storage.get_habit(&habit_id)?;
            vec![day_status(storage, &habit, date)?]
        }
        None => {
            let habits = storage.list_habits(false)?;
            let mut statuses = Vec::with_capacity(habits.len());
            for habit in &habits {
                statuses.push(day_status(storage, habit, date)?);
            }
            statuses
        }
    };

    let message = if statuses.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let due_today: Vec<&HabitDayStatus> = statuses.iter().filter(|s| s.scheduled).collect();
        let done = due_today.iter().filter(|s| s.fully_completed).count();

        let summary = format!(
            "📅 {}: {} habit{} scheduled, {} completed",
            date,
            due_today.len(),
            if due_today.len() == 1 { "" } else { "s" },
            done
        );

        let details = statuses
            .iter()
            .map(|s| {
                let state = if !s.scheduled {
                    match &s.next_active_date {
                        Some(next) => format!("not scheduled (next: {})", next),
                        None => "not scheduled".to_string(),
                    }
                } else if s.fully_completed {
                    "✅ done".to_string()
                } else if s.count > 0 {
                    format!("{:.0}% done", s.progress * 100.0)
                } else {
                    "⬜ not yet".to_string()
                };
                format!(
                    "🎯 {} ({})\n   {} | 🔥 Streak: {} day{}",
                    s.name,
                    s.schedule,
                    state,
                    s.current_streak,
                    if s.current_streak == 1 { "" } else { "s" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\n{}", summary, details)
    };

    Ok(StatusResponse {
        date: date.to_string(),
        habits: statuses,
        message,
    })
}
