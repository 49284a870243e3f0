/// Black-box tests of the recurrence engine through the public API
///
/// These walk through the concrete end-to-end scenarios the engine is
/// specified by: creation-date epochs, interval arithmetic, end rules and
/// the statistics derived from completion records.
use chrono::{NaiveDate, Utc, Weekday};
use habit_cadence_mcp::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A habit with a pinned creation date, so scenarios are deterministic
fn habit_created_on(
    created_at: NaiveDate,
    recurrence: RecurrenceRule,
    completion_type: CompletionType,
    target_count: Option<u32>,
) -> Habit {
    let mut habit = Habit::new(
        "Scenario Habit".to_string(),
        None,
        None,
        None,
        None,
        recurrence,
        completion_type,
        target_count,
    )
    .expect("valid habit");
    habit.created_at = created_at;
    habit
}

fn completion_on(habit: &Habit, day: NaiveDate, count: u32) -> Completion {
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
fn scenario_daily_interval_two() {
    // Habit created 2024-01-01, every 2 days
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Daily { interval: 2, ends: EndRule::Never },
        CompletionType::Simple,
        None,
    );

    assert!(habit.is_active_on(date(2024, 1, 1), &[]));
    assert!(!habit.is_active_on(date(2024, 1, 2), &[]));
    assert!(habit.is_active_on(date(2024, 1, 3), &[]));
}

#[test]
fn scenario_weekly_on_mondays() {
    // 2024-01-01 is a Monday
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Weekly { interval: 1, days: vec![Weekday::Mon], ends: EndRule::Never },
        CompletionType::Simple,
        None,
    );

    assert!(habit.is_active_on(date(2024, 1, 1), &[]));
    assert!(habit.is_active_on(date(2024, 1, 8), &[]));
    assert!(!habit.is_active_on(date(2024, 1, 2), &[]));
}

#[test]
fn scenario_monthly_day_31_never_clamps() {
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Monthly {
            interval: 1,
            pattern: MonthlyPattern::DayOfMonth { day: 31 },
            ends: EndRule::Never,
        },
        CompletionType::Simple,
        None,
    );

    assert!(habit.is_active_on(date(2024, 1, 31), &[]));
    // No Feb 31 exists and Feb 29 does not substitute for it
    assert!(!habit.is_active_on(date(2024, 2, 29), &[]));
}

#[test]
fn scenario_count_habit_reaches_target() {
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
        CompletionType::Count,
        Some(3),
    );
    let day = date(2024, 1, 10);

    let mut completions = vec![completion_on(&habit, day, 1), completion_on(&habit, day, 1)];
    assert_eq!(total_count_for_date(&completions, &habit.id, day), 2);
    assert!(!is_fully_completed(&habit, &completions, day));
    let progress = completion_progress(&habit, &completions, day);
    assert!((progress - 0.667).abs() < 0.001);

    completions.push(completion_on(&habit, day, 1));
    assert_eq!(total_count_for_date(&completions, &habit.id, day), 3);
    assert!(is_fully_completed(&habit, &completions, day));
}

#[test]
fn scenario_after_five_completions_ends_the_habit() {
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Daily { interval: 1, ends: EndRule::After { count: 5 } },
        CompletionType::Simple,
        None,
    );
    let completions: Vec<Completion> = (1..=5)
        .map(|d| completion_on(&habit, date(2024, 1, d), 1))
        .collect();
    let history = completion_dates(&completions, &habit.id);

    // Five completions recorded at or before the 6th: no longer scheduled
    assert!(!habit.is_active_on(date(2024, 1, 6), &history));
    // Any date strictly before the fifth completion's date is still active
    assert!(habit.is_active_on(date(2024, 1, 4), &history));
    // The fifth completion's own day was still scheduled while only the
    // four earlier completions existed
    assert!(habit.is_active_on(date(2024, 1, 5), &history[..4]));
}

#[test]
fn scenario_thirty_day_statistics_window() {
    // Active 20 days of a 30-day window (every day for days 1-20 via an end
    // rule), completed 15 of them
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Daily {
            interval: 1,
            ends: EndRule::On { date: date(2024, 1, 20) },
        },
        CompletionType::Simple,
        None,
    );
    let completions: Vec<Completion> = (1..=15)
        .map(|d| completion_on(&habit, date(2024, 1, d), 1))
        .collect();

    let stats = HabitStatistics::calculate(&habit, &completions, date(2024, 1, 1), date(2024, 1, 30));

    assert_eq!(stats.total_active_days, 20);
    assert_eq!(stats.completed_days, 15);
    assert!((stats.completion_rate - 0.75).abs() < 1e-9);
}

#[test]
fn active_dates_enumeration_is_ordered_and_restartable() {
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Weekly {
            interval: 1,
            days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            ends: EndRule::Never,
        },
        CompletionType::Simple,
        None,
    );

    let first = habit.active_dates_in_range(date(2024, 1, 1), date(2024, 1, 14), &[]);
    let second = habit.active_dates_in_range(date(2024, 1, 1), date(2024, 1, 14), &[]);

    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    assert!(first.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn streak_walk_is_transparent_across_unscheduled_days() {
    let habit = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Weekly {
            interval: 1,
            days: vec![Weekday::Mon, Weekday::Fri],
            ends: EndRule::Never,
        },
        CompletionType::Simple,
        None,
    );
    // Fri Jan 5, Mon Jan 8, Fri Jan 12 all completed
    let completions = vec![
        completion_on(&habit, date(2024, 1, 5), 1),
        completion_on(&habit, date(2024, 1, 8), 1),
        completion_on(&habit, date(2024, 1, 12), 1),
    ];

    // Sunday the 14th is unscheduled; the walk passes through it and the
    // other gap days without breaking
    assert_eq!(calculate_streak(&habit, &completions, date(2024, 1, 14)), 3);
}

#[test]
fn simple_rate_is_bounded_count_rate_is_not() {
    let simple = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
        CompletionType::Simple,
        None,
    );
    let doubled = vec![
        completion_on(&simple, date(2024, 1, 1), 1),
        completion_on(&simple, date(2024, 1, 1), 1),
    ];
    let rate = completion_rate(&simple, &doubled, date(2024, 1, 1), date(2024, 1, 2));
    assert!((0.0..=1.0).contains(&rate));

    let counted = habit_created_on(
        date(2024, 1, 1),
        RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
        CompletionType::Count,
        Some(1),
    );
    let over = vec![completion_on(&counted, date(2024, 1, 1), 5)];
    let stats = HabitStatistics::calculate(&counted, &over, date(2024, 1, 1), date(2024, 1, 1));
    assert!(stats.completion_rate > 1.0);
}
