/// Integration tests: server wiring, persistence and engine-over-storage flows
use chrono::{Duration, Utc, Weekday};
use habit_cadence_mcp::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_server_creation() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let server = HabitCadenceServer::new(temp_file.path().to_path_buf()).await;
    assert!(server.is_ok());

    let server = server.unwrap();
    let _storage = server.storage();
    let _analytics = server.analytics();
}

#[tokio::test]
async fn test_database_persists_across_reopen() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = temp_file.path().to_path_buf();

    let habit = Habit::new(
        "Journaling".to_string(),
        None,
        Some("mindfulness".to_string()),
        None,
        None,
        RecurrenceRule::Weekly {
            interval: 1,
            days: vec![Weekday::Sun],
            ends: EndRule::Never,
        },
        CompletionType::Simple,
        None,
    )
    .unwrap();

    {
        let server = HabitCadenceServer::new(db_path.clone())
            .await
            .expect("Failed to create first server");
        server.storage().create_habit(&habit).unwrap();
    }

    // A second server over the same file sees the same data
    let server = HabitCadenceServer::new(db_path)
        .await
        .expect("Failed to create second server");
    let loaded = server.storage().get_habit(&habit.id).unwrap();
    assert_eq!(loaded, habit);
}

#[test]
fn test_storage_trait_object() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStore::new(temp_file.path().to_path_buf()).expect("Failed to create storage");

    let _: &dyn HabitStore = &storage;
}

/// End-to-end: log a week of completions through storage and read the
/// statistics back through the engine.
#[test]
fn test_statistics_over_stored_completions() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStore::new(temp_file.path().to_path_buf()).unwrap();

    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(6);

    let mut habit = Habit::new(
        "Push-ups".to_string(),
        None,
        Some("health".to_string()),
        None,
        None,
        RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
        CompletionType::Count,
        Some(20),
    )
    .unwrap();
    // Backdate the epoch so the whole week is scheduled
    habit.created_at = week_ago;
    storage.create_habit(&habit).unwrap();

    // Hit the target on 5 of 7 days, half of it on a sixth
    for offset in 0..5 {
        let completion =
            Completion::new(habit.id.clone(), week_ago + Duration::days(offset), 20, None).unwrap();
        storage.create_completion(&completion).unwrap();
    }
    let partial = Completion::new(habit.id.clone(), week_ago + Duration::days(5), 10, None).unwrap();
    storage.create_completion(&partial).unwrap();

    let completions = storage.completions_for_habit(&habit.id, None).unwrap();
    let stats = HabitStatistics::calculate(&habit, &completions, week_ago, today);

    assert_eq!(stats.total_active_days, 7);
    assert_eq!(stats.completed_days, 5);
    assert_eq!(stats.partially_completed_days, 1);
    assert_eq!(stats.total_count, 110);
    // 110 logged / (7 days * 20 target)
    assert!((stats.completion_rate - 110.0 / 140.0).abs() < 1e-9);
}

/// A recurrence edit reinterprets the stored history retroactively.
#[test]
fn test_recurrence_edit_changes_past_interpretation() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStore::new(temp_file.path().to_path_buf()).unwrap();

    let today = Utc::now().date_naive();
    let start = today - Duration::days(9);

    let mut habit = Habit::new(
        "Deep Work".to_string(),
        None,
        None,
        None,
        None,
        RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
        CompletionType::Simple,
        None,
    )
    .unwrap();
    habit.created_at = start;
    storage.create_habit(&habit).unwrap();

    let completions = storage.completions_for_habit(&habit.id, None).unwrap();
    let history = completion_dates(&completions, &habit.id);
    let daily_active = habit.active_dates_in_range(start, today, &history).len();
    assert_eq!(daily_active, 10);

    // Switch to every 3rd day and persist; the loaded habit schedules the
    // same past window differently
    habit.recurrence = RecurrenceRule::Custom { days: 3, ends: EndRule::Never };
    storage.update_habit(&habit).unwrap();

    let reloaded = storage.get_habit(&habit.id).unwrap();
    let custom_active = reloaded.active_dates_in_range(start, today, &history).len();
    assert_eq!(custom_active, 4);
}

/// Deleting one of several same-day records restores the prior aggregate,
/// exercised through real storage round-trips.
#[test]
fn test_unlog_round_trip_through_storage() {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage = SqliteStore::new(temp_file.path().to_path_buf()).unwrap();

    let today = Utc::now().date_naive();
    let habit = Habit::new(
        "Hydrate".to_string(),
        None,
        None,
        None,
        None,
        RecurrenceRule::Daily { interval: 1, ends: EndRule::Never },
        CompletionType::Count,
        Some(2),
    )
    .unwrap();
    storage.create_habit(&habit).unwrap();

    let first = Completion::new(habit.id.clone(), today, 1, None).unwrap();
    storage.create_completion(&first).unwrap();

    let before = storage.completions_for_habit(&habit.id, None).unwrap();
    assert!(!is_fully_completed(&habit, &before, today));

    let second = Completion::new(habit.id.clone(), today, 1, None).unwrap();
    storage.create_completion(&second).unwrap();

    let full = storage.completions_for_habit(&habit.id, None).unwrap();
    assert!(is_fully_completed(&habit, &full, today));

    storage.delete_completion(&second.id).unwrap();
    let after = storage.completions_for_habit(&habit.id, None).unwrap();
    assert_eq!(
        total_count_for_date(&after, &habit.id, today),
        total_count_for_date(&before, &habit.id, today)
    );
    assert!(!is_fully_completed(&habit, &after, today));
}
