use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;

use super::schema::{IN_MEMORY, Migrator};
use crate::error::Result;

/// SQLite-backed record store. One connection, serialized behind a mutex.
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the journal at `db_path` and bring its schema to the latest version.
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        if db_path != IN_MEMORY {
            // Readers keep going while a write is in flight
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let report = Migrator::new().migrate(&conn, db_path)?;
        if report.is_noop() {
            log::info!("Journal schema at v{}", report.to_version);
        } else {
            log::info!(
                "Journal schema migrated v{} -> v{}",
                report.from_version,
                report.to_version
            );
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(IN_MEMORY)
    }

    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.conn.lock()?;
        Migrator::new().current_version(&conn)
    }
}
