/// Analytics engine for reporting windows and insight generation
///
/// This module turns the pure statistics in `domain::stats` into the
/// report the stats tool renders: it resolves a named period into a
/// concrete date window ending today and generates human-readable insight
/// lines from the numbers.

use chrono::{Duration, NaiveDate, Utc};

use crate::domain::{Completion, CompletionType, Habit, HabitStatistics};

/// Named reporting window, always ending today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl StatsPeriod {
    /// Parse the user-facing period name; defaults to Month when omitted
    pub fn parse(s: Option<&str>) -> Option<Self> {
        match s {
            None => Some(StatsPeriod::Month),
            Some("week") => Some(StatsPeriod::Week),
            Some("month") => Some(StatsPeriod::Month),
            Some("quarter") => Some(StatsPeriod::Quarter),
            Some("year") => Some(StatsPeriod::Year),
            Some(_) => None,
        }
    }

    /// Window length in days
    pub fn days(&self) -> i64 {
        match self {
            StatsPeriod::Week => 7,
            StatsPeriod::Month => 30,
            StatsPeriod::Quarter => 90,
            StatsPeriod::Year => 365,
        }
    }

    /// Human-readable label for messages
    pub fn label(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Quarter => "quarter",
            StatsPeriod::Year => "year",
        }
    }

    /// The inclusive date window `[start, end]` this period covers,
    /// ending at `end`
    pub fn window_ending(&self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        (end - Duration::days(self.days() - 1), end)
    }
}

/// Analytics engine for processing habit data
///
/// Stateless; it exists to give the tool layer one place that knows how to
/// turn (habit, completions, period) into a report.
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new() -> Self {
        Self
    }

    /// Statistics for `habit` over `period`, ending today
    pub fn statistics_for_period(
        &self,
        habit: &Habit,
        completions: &[Completion],
        period: StatsPeriod,
    ) -> (HabitStatistics, NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        let (start, end) = period.window_ending(today);
        let stats = HabitStatistics::calculate(habit, completions, start, end);
        (stats, start, end)
    }

    /// Generate insight lines from a habit's statistics
    pub fn insights(&self, habit: &Habit, stats: &HabitStatistics, period: StatsPeriod) -> Vec<String> {
        let mut insights = Vec::new();

        if stats.total_active_days == 0 {
            insights.push(format!(
                "'{}' had no scheduled days this {} - its recurrence is {}.",
                habit.name,
                period.label(),
                habit.recurrence.describe()
            ));
            return insights;
        }

        let percent = stats.completion_rate * 100.0;
        if stats.completion_rate >= 0.9 {
            insights.push(format!(
                "Excellent consistency: {:.0}% of the target met this {}.",
                percent,
                period.label()
            ));
        } else if stats.completion_rate >= 0.5 {
            insights.push(format!(
                "Solid progress: {:.0}% this {}. A few more completed days would make it a strong habit.",
                percent,
                period.label()
            ));
        } else {
            insights.push(format!(
                "{:.0}% this {}. Consider whether the schedule ({}) still fits your routine.",
                percent,
                period.label(),
                habit.recurrence.describe()
            ));
        }

        if stats.current_streak >= 7 {
            insights.push(format!(
                "You're on a {}-day streak - keep the chain going!",
                stats.current_streak
            ));
        } else if stats.current_streak > 0 {
            insights.push(format!(
                "Current streak: {} day{}.",
                stats.current_streak,
                if stats.current_streak == 1 { "" } else { "s" }
            ));
        }

        if habit.completion_type == CompletionType::Count && stats.partially_completed_days > 0 {
            insights.push(format!(
                "{} day{} ended short of the target of {} - partial progress still counts.",
                stats.partially_completed_days,
                if stats.partially_completed_days == 1 { "" } else { "s" },
                habit.effective_target()
            ));
        }

        insights
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new()
    }
}
