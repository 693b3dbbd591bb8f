mod schema;
mod store;

pub use store::SqliteStore;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};

use crate::error::Result;
use crate::models::*;

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "coursepath")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("coursepath.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    /// Run `f` inside one immediate transaction.
    ///
    /// The write lock is taken up front, so concurrent structural writers are
    /// serialised. The transaction commits only when `f` returns `Ok`; any
    /// error rolls every write back.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteStore<'_>) -> Result<T>,
    {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = {
            let mut store = SqliteStore::new(&tx);
            f(&mut store)?
        };
        tx.commit()?;
        Ok(value)
    }

    // ============================================================
    // Course operations
    // ============================================================

    pub fn get_all_courses(&self) -> Result<Vec<Course>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, created_at, updated_at
             FROM courses ORDER BY title, id",
        )?;

        let courses = stmt
            .query_map([], course_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(courses)
    }

    pub fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, created_at, updated_at
             FROM courses WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(course_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn create_course(&self, input: CreateCourseInput) -> Result<Course> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO courses (title, created_at, updated_at) VALUES (?, ?, ?)",
            (&input.title, now.to_rfc3339(), now.to_rfc3339()),
        )?;

        Ok(Course {
            id: conn.last_insert_rowid(),
            title: input.title,
            created_at: now,
            updated_at: now,
        })
    }

    // ============================================================
    // Snapshot operations
    // ============================================================

    pub fn get_snapshot(&self, id: i64) -> Result<Option<Snapshot>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, course_id, version, status, created_at, updated_at
             FROM snapshots WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(snapshot_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_snapshots_by_course(&self, course_id: i64) -> Result<Vec<Snapshot>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, course_id, version, status, created_at, updated_at
             FROM snapshots WHERE course_id = ? ORDER BY version",
        )?;

        let snapshots = stmt
            .query_map([course_id], snapshot_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(snapshots)
    }

    pub fn update_snapshot_status(
        &self,
        id: i64,
        status: SnapshotStatus,
    ) -> Result<Option<Snapshot>> {
        {
            let conn = self.conn.lock().expect("database lock poisoned");
            let rows = conn.execute(
                "UPDATE snapshots SET status = ?, updated_at = ? WHERE id = ?",
                (status.as_str(), Utc::now().to_rfc3339(), id),
            )?;
            if rows == 0 {
                return Ok(None);
            }
        }
        self.get_snapshot(id)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

pub(crate) fn course_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        created_at: parse_datetime(row.get::<_, String>(2)?),
        updated_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

pub(crate) fn snapshot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Snapshot> {
    let status: String = row.get(3)?;
    Ok(Snapshot {
        id: row.get(0)?,
        course_id: row.get(1)?,
        version: row.get(2)?,
        status: SnapshotStatus::from_str(&status)
            .ok_or_else(|| unknown_value(3, "snapshot status", &status))?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

/// Unrecognised enum text in a column is a conversion failure, never a default.
pub(crate) fn unknown_value(column: usize, what: &str, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unknown {}: {:?}", what, raw).into(),
    )
}

pub(crate) fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn setup() -> Database {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn test_unknown_snapshot_status_is_an_error() {
        let db = setup();
        let course = db
            .create_course(CreateCourseInput {
                title: "Course".to_string(),
            })
            .unwrap();
        let snapshot = db
            .transaction(|store| store.insert_snapshot(course.id))
            .unwrap();

        db.conn
            .lock()
            .unwrap()
            .execute(
                "UPDATE snapshots SET status = 'bogus' WHERE id = ?",
                [snapshot.id],
            )
            .unwrap();

        let result = db.get_snapshot(snapshot.id);
        assert!(matches!(
            result,
            Err(Error::Storage(rusqlite::Error::FromSqlConversionFailure(3, _, _)))
        ));
    }

    #[test]
    fn test_known_snapshot_status_round_trips() {
        let db = setup();
        let course = db
            .create_course(CreateCourseInput {
                title: "Course".to_string(),
            })
            .unwrap();
        let snapshot = db
            .transaction(|store| store.insert_snapshot(course.id))
            .unwrap();

        let archived = db
            .update_snapshot_status(snapshot.id, SnapshotStatus::Archived)
            .unwrap()
            .unwrap();
        assert_eq!(archived.status, SnapshotStatus::Archived);
    }
}
