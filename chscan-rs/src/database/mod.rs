//! SQLite channel store.
//!
//! This module provides SQLite-based persistent storage for:
//! - Channel lists per input (identity triple, numbering, tuning, streams)
//! - Scan history (one row per commit attempt)

mod channel;
mod history;
mod models;
mod schema;

pub use models::*;

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A list column could not be encoded as JSON.
    #[error("Column encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Main database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Get the underlying connection (for advanced queries).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> SqliteResult<rusqlite::Transaction<'_>> {
        self.conn.transaction()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.connection().is_autocommit());
    }

    #[test]
    fn test_schema_creation() {
        let db = Database::open_in_memory().unwrap();

        let count: i32 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('channels', 'scan_history')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_session_rescan_keeps_numbers() {
        use crate::channel::tests::dtv_data;
        use crate::config::ScanConfig;
        use crate::gateway::{PersistenceGateway, ServiceFilter};
        use crate::session::ScanSession;
        use crate::sink::NullSink;
        use chscan_protocol::{
            ChannelKind, DtvProgramData, ScanBegin, ScanMethod, ScanMode, ScannerEvent, SortMode,
        };

        fn scan(db: Database, method: ScanMethod, sids: &[u16]) -> Database {
            let mode = ScanMode::new(ChannelKind::Digital, method);
            let sort = SortMode::Number;
            let mut session = ScanSession::new(ScanConfig::default(), db, NullSink);
            let mut events = vec![
                ScannerEvent::ScanBegin(ScanBegin { mode, sort }),
                ScannerEvent::StoreBegin,
            ];
            for sid in sids {
                events.push(ScannerEvent::DtvProgram(DtvProgramData {
                    mode,
                    sort,
                    ..dtv_data(1, 1, *sid, 474_000)
                }));
            }
            events.push(ScannerEvent::StoreEnd);
            events.push(ScannerEvent::ScanEnd);
            for event in &events {
                session.handle(event).unwrap();
            }
            session.into_parts().0
        }

        let db = scan(Database::open_in_memory().unwrap(), ScanMethod::Auto, &[5, 3, 4]);
        let db = scan(db, ScanMethod::Manual, &[4, 6]);

        let mut numbers: Vec<(u16, Option<u32>)> = db
            .list_channels("tuner0", ServiceFilter::All)
            .unwrap()
            .iter()
            .map(|c| (c.service_id, c.display_number))
            .collect();
        numbers.sort();
        // 3 and 5 were not found by the manual rescan; 4 keeps its number
        assert_eq!(numbers, vec![(4, Some(2)), (6, Some(3))]);
    }

    #[test]
    fn test_open_file_twice() {
        let path = std::env::temp_dir().join(format!("chscan-test-{}.db", std::process::id()));
        {
            Database::open(&path).unwrap();
        }
        // schema creation is idempotent
        let db = Database::open(&path).unwrap();
        drop(db);
        let _ = std::fs::remove_file(&path);
    }
}
