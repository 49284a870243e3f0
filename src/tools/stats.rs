/// Tool for windowed habit statistics and insights
///
/// This module implements the habit_stats MCP tool. It resolves a named
/// period into a date window ending today, computes the full statistics
/// through the engine and attaches generated insight lines.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, StatsPeriod};
use crate::domain::{CompletionType, DomainError, HabitStatistics};
use crate::storage::{HabitStore, StorageError};
use crate::tools::parse_habit_id;

/// Parameters for the statistics report
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StatsParams {
    /// ID of the habit to analyze
    pub habit_id: String,
    /// Analysis window: "week", "month", "quarter" or "year" (default: month)
    pub period: Option<String>,
}

/// Response carrying the full statistics for one habit
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub habit_id: String,
    pub name: String,
    pub period: String,
    pub start: String,
    pub end: String,
    pub statistics: HabitStatistics,
    pub insights: Vec<String>,
    pub message: String,
}

/// Compute windowed statistics for a habit using the provided storage
pub fn habit_stats<S: HabitStore>(
    storage: &S,
    analytics: &AnalyticsEngine,
    params: StatsParams,
) -> Result<StatsResponse, StorageError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let period = StatsPeriod::parse(params.period.as_deref()).ok_or_else(|| {
        StorageError::Domain(DomainError::InvalidValue {
            message: format!(
                "Invalid period '{}'. Valid options: week, month, quarter, year",
                params.period.unwrap_or_default()
            ),
        })
    })?;

    // The streak walk looks past the window start, so fetch the full history
    let completions = storage.completions_for_habit(&habit_id, None)?;
    let (statistics, start, end) = analytics.statistics_for_period(&habit, &completions, period);
    let insights = analytics.insights(&habit, &statistics, period);

    let rate_line = match habit.completion_type {
        CompletionType::Simple => format!(
            "✅ Completed {} of {} scheduled days ({:.1}%)",
            statistics.completed_days,
            statistics.total_active_days,
            statistics.completion_rate * 100.0
        ),
        CompletionType::Count => format!(
            "✅ {} logged across the window - {:.1}% of target ({} scheduled days, {} partial)",
            statistics.total_count,
            statistics.completion_rate * 100.0,
            statistics.total_active_days,
            statistics.partially_completed_days
        ),
    };

    let message = format!(
        "📊 **{}** ({} - {})\n{}\n🔥 Current streak: {} day{}\n\n{}",
        habit.name,
        start,
        end,
        rate_line,
        statistics.current_streak,
        if statistics.current_streak == 1 { "" } else { "s" },
        insights.join("\n")
    );

    Ok(StatsResponse {
        habit_id: habit.id.to_string(),
        name: habit.name.clone(),
        period: period.label().to_string(),
        start: start.to_string(),
        end: end.to_string(),
        statistics,
        insights,
        message,
    })
}
