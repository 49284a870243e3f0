/// Streak and completion-rate calculation
///
/// This module derives aggregate metrics from a habit's schedule and its
/// completion records: the current streak (a backward walk over scheduled
/// days) and windowed completion statistics. Everything here is a pure
/// function over the inputs - callers pass "now" in as a date.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::completion::{
    completion_dates, is_fully_completed, total_count_for_date,
};
use crate::domain::{Completion, CompletionType, Habit};

/// How many days before `from_date` the streak walk is willing to look
///
/// An unbroken daily streak is already bounded by the habit's creation
/// date; the cap mostly guards against corrupted far-past creation dates.
const STREAK_LOOKBACK_DAYS: i64 = 365;

/// Consecutive fully-completed scheduled days, walking backward from `from_date`
///
/// Days the habit is not scheduled are transparent: they neither extend nor
/// break the streak. The first scheduled-but-incomplete day stops the walk.
/// This is the current streak ending at `from_date`, not a best-ever streak.
pub fn calculate_streak(habit: &Habit, completions: &[Completion], from_date: NaiveDate) -> u32 {
    let history = completion_dates(completions, &habit.id);
    let floor = from_date - Duration::days(STREAK_LOOKBACK_DAYS);

    let mut streak = 0;
    let mut day = from_date;
    while day >= floor {
        if habit.is_active_on(day, &history) {
            if is_fully_completed(habit, completions, day) {
                streak += 1;
            } else {
                break;
            }
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    streak
}

/// Fraction of scheduled days in `[start, end]` that were fully completed
///
/// Returns 0.0 when no days were scheduled - "no data", not "perfect".
pub fn completion_rate(
    habit: &Habit,
    completions: &[Completion],
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    let history = completion_dates(completions, &habit.id);
    let active_dates = habit.active_dates_in_range(start, end, &history);
    if active_dates.is_empty() {
        return 0.0;
    }

    let completed = active_dates
        .iter()
        .filter(|day| is_fully_completed(habit, completions, **day))
        .count();

    completed as f64 / active_dates.len() as f64
}

/// Windowed statistics for one habit
///
/// The meaning of `completion_rate` and `total_count` forks on the habit's
/// completion type; see `calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStatistics {
    /// Scheduled days in the window
    pub total_active_days: u32,
    /// Scheduled days whose completion criterion was met
    pub completed_days: u32,
    /// Simple: completed / scheduled. Count: logged / targeted, unclamped -
    /// over-completing pushes it past 1.0.
    pub completion_rate: f64,
    /// Simple: same as completed_days. Count: every count logged in the
    /// window, whether or not its day was scheduled.
    pub total_count: u32,
    /// Streak ending at the window's end date
    pub current_streak: u32,
    /// Count habits only: scheduled days with some progress but short of
    /// the target. Always 0 for Simple habits.
    pub partially_completed_days: u32,
}

impl HabitStatistics {
    /// Compute statistics for `habit` over the window `[start, end]`
    ///
    /// For Count habits the totals are deliberately lenient: counts logged
    /// on unscheduled days (say, after the user changed the interval) still
    /// land in `total_count`, and the rate compares that sum against
    /// scheduled-days-times-target without clamping.
    pub fn calculate(
        habit: &Habit,
        completions: &[Completion],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let history = completion_dates(completions, &habit.id);
        let active_dates = habit.active_dates_in_range(start, end, &history);
        let total_active_days = active_dates.len() as u32;

        let completed_days = active_dates
            .iter()
            .filter(|day| is_fully_completed(habit, completions, **day))
            .count() as u32;

        let current_streak = calculate_streak(habit, completions, end);

        match habit.completion_type {
            CompletionType::Simple => Self {
                total_active_days,
                completed_days,
                completion_rate: if total_active_days > 0 {
                    completed_days as f64 / total_active_days as f64
                } else {
                    0.0
                },
                total_count: completed_days,
                current_streak,
                partially_completed_days: 0,
            },
            CompletionType::Count => {
                let target = habit.effective_target();
                let total_target = total_active_days as u64 * target as u64;

                let total_count: u32 = completions
                    .iter()
                    .filter(|c| {
                        c.habit_id == habit.id
                            && c.completed_date >= start
                            && c.completed_date <= end
                    })
                    .map(|c| c.count)
                    .sum();

                let partially_completed_days = active_dates
                    .iter()
                    .filter(|day| {
                        let count = total_count_for_date(completions, &habit.id, **day);
                        count > 0 && count < target
                    })
                    .count() as u32;

                Self {
                    total_active_days,
                    completed_days,
                    completion_rate: if total_target > 0 {
                        total_count as f64 / total_target as f64
                    } else {
                        0.0
                    },
                    total_count,
                    current_streak,
                    partially_completed_days,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompletionId, EndRule, RecurrenceRule};
    use chrono::{Utc, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit_with(rule: RecurrenceRule, completion_type: CompletionType, target: Option<u32>) -> Habit {
        let mut habit = Habit::new(
            "Test Habit".to_string(),
            None,
            None,
            None,
            None,
            rule,
            completion_type,
            target,
        )
        .unwrap();
        habit.created_at = date(2024, 1, 1);
        habit
    }

    fn record(habit: &Habit, day: NaiveDate, count: u32) -> Completion {
        Completion::from_existing(
            CompletionId::new(),
            habit.id.clone(),
            day,
            count,
            None,
            Utc::now(),
        )
    }

    #[test]
    fn test_streak_counts_consecutive_completed_days() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        let completions: Vec<Completion> = (8..=10)
            .map(|d| record(&habit, date(2024, 1, d), 1))
            .collect();

        assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 10)), 3);
    }

    #[test]
    fn test_streak_breaks_on_missed_scheduled_day() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        // Jan 8 missed, 9 and 10 done
        let completions = vec![
            record(&habit, date(2024, 1, 9), 1),
            record(&habit, date(2024, 1, 10), 1),
            record(&habit, date(2024, 1, 7), 1),
        ];

        assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 10)), 2);
    }

    #[test]
    fn test_streak_skips_inactive_days() {
        // Every other day from Jan 1: 1, 3, 5, 7, ...
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 2, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        let completions = vec![
            record(&habit, date(2024, 1, 5), 1),
            record(&habit, date(2024, 1, 7), 1),
        ];

        // Jan 8 is not scheduled - walking back from it passes transparently
        // through to the completed 7th and 5th, then stops at the missed 3rd.
        assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 8)), 2);
    }

    #[test]
    fn test_streak_skips_inactive_weekend() {
        let habit = habit_with(
            RecurrenceRule::Weekly {
                interval: 1,
                days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
                ends: EndRule::Never,
            },
            CompletionType::Simple,
            None,
        );
        // Fri Jan 5 and Mon Jan 8 completed; Sat/Sun in between are unscheduled
        let completions = vec![
            record(&habit, date(2024, 1, 5), 1),
            record(&habit, date(2024, 1, 8), 1),
        ];

        assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 8)), 2);
    }

    #[test]
    fn test_streak_monotonically_increases_with_new_completion() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        let mut completions = vec![
            record(&habit, date(2024, 1, 9), 1),
            record(&habit, date(2024, 1, 10), 1),
        ];
        let before = calculate_streak(&habit, &completions, date(2024, 1, 10));

        // Filling in the day that ended the walk extends the chain
        completions.push(record(&habit, date(2024, 1, 8), 1));
        let after = calculate_streak(&habit, &completions, date(2024, 1, 10));

        assert!(after > before);
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_streak_stops_at_lookback_cap() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        // Complete every single day for two years up to the reference date
        let from = date(2025, 12, 31);
        let mut completions = Vec::new();
        let mut day = date(2024, 1, 1);
        while day <= from {
            completions.push(record(&habit, day, 1));
            day = day.succ_opt().unwrap();
        }

        // The walk inspects from_date and the 365 days before it, then stops
        assert_eq!(calculate_streak(&habit, &completions, from), 366);
    }

    #[test]
    fn test_count_streak_requires_target_met() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Count,
            Some(2),
        );
        let completions = vec![
            record(&habit, date(2024, 1, 9), 2),
            // Only half the target on the 10th
            record(&habit, date(2024, 1, 10), 1),
        ];

        assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 10)), 0);
        assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 9)), 1);
    }

    #[test]
    fn test_completion_rate_simple() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        // 10-day window, 7 days completed
        let completions: Vec<Completion> = (1..=7)
            .map(|d| record(&habit, date(2024, 1, d), 1))
            .collect();

        let rate = completion_rate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 10));
        assert!((rate - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_completion_rate_no_active_days_is_zero() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        // Window entirely before the creation date: nothing scheduled
        let rate = completion_rate(&habit, &[], date(2023, 1, 1), date(2023, 1, 31));
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_completion_rate_simple_stays_in_bounds() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        // Duplicate records on one day must not push the rate past 1
        let completions = vec![
            record(&habit, date(2024, 1, 1), 1),
            record(&habit, date(2024, 1, 1), 1),
        ];
        let rate = completion_rate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn test_statistics_simple() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        // 20 active days in a 20-day window, 15 completed
        let completions: Vec<Completion> = (1..=15)
            .map(|d| record(&habit, date(2024, 1, d), 1))
            .collect();

        let stats =
            HabitStatistics::calculate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 20));

        assert_eq!(stats.total_active_days, 20);
        assert_eq!(stats.completed_days, 15);
        assert!((stats.completion_rate - 0.75).abs() < 1e-9);
        assert_eq!(stats.total_count, 15);
        assert_eq!(stats.partially_completed_days, 0);
    }

    #[test]
    fn test_statistics_count_partial_days() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Count,
            Some(3),
        );
        let completions = vec![
            record(&habit, date(2024, 1, 1), 3), // full
            record(&habit, date(2024, 1, 2), 1), // partial
            record(&habit, date(2024, 1, 3), 2), // partial
        ];

        let stats =
            HabitStatistics::calculate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 5));

        assert_eq!(stats.total_active_days, 5);
        assert_eq!(stats.completed_days, 1);
        assert_eq!(stats.partially_completed_days, 2);
        assert_eq!(stats.total_count, 6);
        // 6 logged / (5 days * target 3)
        assert!((stats.completion_rate - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_count_includes_unscheduled_days_and_exceeds_one() {
        // Active only every 5th day, but the user logs daily and over-completes
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 5, ends: EndRule::Never },
            CompletionType::Count,
            Some(1),
        );
        let completions: Vec<Completion> = (1..=10)
            .map(|d| record(&habit, date(2024, 1, d), 1))
            .collect();

        let stats =
            HabitStatistics::calculate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 10));

        // Scheduled on Jan 1 and Jan 6 only, yet all ten counts land in the sum
        assert_eq!(stats.total_active_days, 2);
        assert_eq!(stats.total_count, 10);
        assert!(stats.completion_rate > 1.0);
        assert!((stats.completion_rate - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_streak_uses_window_end() {
        let habit = habit_with(
            RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
            CompletionType::Simple,
            None,
        );
        let completions = vec![
            record(&habit, date(2024, 1, 19), 1),
            record(&habit, date(2024, 1, 20), 1),
        ];

        let stats =
            HabitStatistics::calculate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 20));
        assert_eq!(stats.current_streak, 2);
    }
}
