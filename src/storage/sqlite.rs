/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits and completions. Recurrence rules travel through
/// the database as tagged JSON, the same shape they have on the wire.

use std::path::PathBuf;

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::domain::{
    Completion, CompletionId, CompletionType, Habit, HabitId, HabitStatus, RecurrenceRule,
};
use crate::storage::{migrations, HabitStore, StorageError};

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStore trait.
pub struct SqliteStore {
    conn: Connection,
}

/// A habits row as it comes off disk, before the typed fields are parsed
///
/// Splitting raw reads from parsing lets `list_habits` skip a corrupt row
/// (say, a recurrence written by a newer version) instead of failing the
/// whole listing.
struct RawHabit {
    id: String,
    name: String,
    description: Option<String>,
    category: Option<String>,
    color: Option<String>,
    tags: Option<String>,
    status: String,
    created_at: String,
    recurrence: String,
    completion_type: String,
    target_count: Option<u32>,
}

impl RawHabit {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            color: row.get(4)?,
            tags: row.get(5)?,
            status: row.get(6)?,
            created_at: row.get(7)?,
            recurrence: row.get(8)?,
            completion_type: row.get(9)?,
            target_count: row.get(10)?,
        })
    }

    fn into_habit(self) -> Result<Habit, StorageError> {
        let id = HabitId::from_string(&self.id)
            .map_err(|_| StorageError::CorruptRecord(format!("invalid habit id: {}", self.id)))?;
        let status = HabitStatus::parse(&self.status)
            .ok_or_else(|| StorageError::CorruptRecord(format!("invalid status: {}", self.status)))?;
        let completion_type = CompletionType::parse(&self.completion_type).ok_or_else(|| {
            StorageError::CorruptRecord(format!("invalid completion type: {}", self.completion_type))
        })?;
        let created_at = NaiveDate::parse_from_str(&self.created_at, "%Y-%m-%d").map_err(|_| {
            StorageError::CorruptRecord(format!("invalid creation date: {}", self.created_at))
        })?;
        let recurrence: RecurrenceRule = serde_json::from_str(&self.recurrence)?;
        let tags: Option<Vec<String>> = match &self.tags {
            Some(json) => Some(serde_json::from_str(json)?),
            None => None,
        };

        Ok(Habit::from_existing(
            id,
            self.name,
            self.description,
            self.category,
            self.color,
            tags,
            status,
            created_at,
            recurrence,
            completion_type,
            self.target_count,
        ))
    }
}

const HABIT_COLUMNS: &str = "id, name, description, category, color, tags, status, created_at, \
                             recurrence, completion_type, target_count";
const COMPLETION_COLUMNS: &str = "id, habit_id, completed_date, count, notes, logged_at";

fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<Completion> {
    let id_str: String = row.get(0)?;
    let id = CompletionId::from_string(&id_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
    })?;

    let habit_id_str: String = row.get(1)?;
    let habit_id = HabitId::from_string(&habit_id_str).map_err(|_| {
        rusqlite::Error::InvalidColumnType(1, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
    })?;

    let date_str: String = row.get(2)?;
    let completed_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::InvalidColumnType(2, "Invalid date".to_string(), rusqlite::types::Type::Text)
    })?;

    let logged_at_str: String = row.get(5)?;
    let logged_at = chrono::DateTime::parse_from_rfc3339(&logged_at_str)
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(
                5,
                "Invalid datetime".to_string(),
                rusqlite::types::Type::Text,
            )
        })?
        .with_timezone(&chrono::Utc);

    Ok(Completion::from_existing(
        id,
        habit_id,
        completed_date,
        row.get(3)?, // count
        row.get(4)?, // notes
        logged_at,
    ))
}

impl SqliteStore {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    fn tags_json(habit: &Habit) -> Result<Option<String>, StorageError> {
        match &habit.tags {
            Some(tags) => Ok(Some(serde_json::to_string(tags)?)),
            None => Ok(None),
        }
    }
}

impl HabitStore for SqliteStore {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let recurrence_json = serde_json::to_string(&habit.recurrence)?;
        let tags_json = Self::tags_json(habit)?;

        self.conn.execute(
            "INSERT INTO habits (
                id, name, description, category, color, tags, status,
                created_at, recurrence, completion_type, target_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.category,
                habit.color,
                tags_json,
                habit.status.as_str(),
                habit.created_at.to_string(),
                recurrence_json,
                habit.completion_type.as_str(),
                habit.target_count,
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id.to_string());
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;

        let result = stmt.query_row(params![habit_id.to_string()], RawHabit::from_row);

        match result {
            Ok(raw) => raw.into_habit(),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Update an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let recurrence_json = serde_json::to_string(&habit.recurrence)?;
        let tags_json = Self::tags_json(habit)?;

        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                category = ?4,
                color = ?5,
                tags = ?6,
                status = ?7,
                recurrence = ?8,
                completion_type = ?9,
                target_count = ?10
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.category,
                habit.color,
                tags_json,
                habit.status.as_str(),
                recurrence_json,
                habit.completion_type.as_str(),
                habit.target_count,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id.to_string());
        Ok(())
    }

    /// Archive a habit (history is retained)
    fn archive_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET status = 'archived' WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Archived habit: {}", habit_id.to_string());
        Ok(())
    }

    /// Delete a habit and its completion history
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1",
            params![habit_id.to_string()],
        )?;

        let rows_affected = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![habit_id.to_string()])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit and history: {}", habit_id.to_string());
        Ok(())
    }

    /// List habits, newest first
    ///
    /// Rows whose stored recurrence no longer parses are skipped with a
    /// warning: one corrupt rule must not take down every other habit's
    /// schedule.
    fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits", HABIT_COLUMNS);
        if !include_archived {
            sql.push_str(" WHERE status = 'active'");
        }
        sql.push_str(" ORDER BY created_at DESC, name ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let raw_iter = stmt.query_map([], RawHabit::from_row)?;

        let mut habits = Vec::new();
        for raw in raw_iter {
            let raw = raw?;
            let habit_id = raw.id.clone();
            match raw.into_habit() {
                Ok(habit) => habits.push(habit),
                Err(e) => {
                    tracing::warn!("Skipping unreadable habit row {}: {}", habit_id, e);
                }
            }
        }

        Ok(habits)
    }

    /// Create a new completion record
    fn create_completion(&self, completion: &Completion) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO completions (
                id, habit_id, completed_date, count, notes, logged_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                completion.id.to_string(),
                completion.habit_id.to_string(),
                completion.completed_date.to_string(),
                completion.count,
                completion.notes,
                completion.logged_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(
            "Logged completion {} for habit {}",
            completion.id.to_string(),
            completion.habit_id.to_string()
        );
        Ok(())
    }

    /// Update an existing completion record
    fn update_completion(&self, completion: &Completion) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE completions SET completed_date = ?2, count = ?3, notes = ?4 WHERE id = ?1",
            params![
                completion.id.to_string(),
                completion.completed_date.to_string(),
                completion.count,
                completion.notes,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::CompletionNotFound {
                completion_id: completion.id.to_string(),
            });
        }

        Ok(())
    }

    /// Delete a single completion record
    fn delete_completion(&self, completion_id: &CompletionId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM completions WHERE id = ?1",
            params![completion_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::CompletionNotFound {
                completion_id: completion_id.to_string(),
            });
        }

        Ok(())
    }

    /// All completions for one habit, optionally bounded to a date range
    fn completions_for_habit(
        &self,
        habit_id: &HabitId,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Completion>, StorageError> {
        let mut completions = Vec::new();

        match range {
            Some((start, end)) => {
                let sql = format!(
                    "SELECT {} FROM completions
                     WHERE habit_id = ?1 AND completed_date BETWEEN ?2 AND ?3
                     ORDER BY completed_date ASC, logged_at ASC",
                    COMPLETION_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let iter = stmt.query_map(
                    params![habit_id.to_string(), start.to_string(), end.to_string()],
                    completion_from_row,
                )?;
                for completion in iter {
                    completions.push(completion?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM completions
                     WHERE habit_id = ?1
                     ORDER BY completed_date ASC, logged_at ASC",
                    COMPLETION_COLUMNS
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let iter = stmt.query_map(params![habit_id.to_string()], completion_from_row)?;
                for completion in iter {
                    completions.push(completion?);
                }
            }
        }

        Ok(completions)
    }

    /// All completions within a date range
    fn completions_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Completion>, StorageError> {
        let sql = format!(
            "SELECT {} FROM completions
             WHERE completed_date BETWEEN ?1 AND ?2
             ORDER BY completed_date ASC, logged_at ASC",
            COMPLETION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let iter = stmt.query_map(params![start.to_string(), end.to_string()], completion_from_row)?;

        let mut completions = Vec::new();
        for completion in iter {
            completions.push(completion?);
        }

        Ok(completions)
    }
}
