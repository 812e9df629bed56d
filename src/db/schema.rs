use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rusqlite::{Connection, DatabaseName, params};
use sha2::{Digest, Sha256};

use crate::config::MAX_BACKUPS;
use crate::error::{JournalError, Result};

pub const IN_MEMORY: &str = ":memory:";

const LEDGER_SQL: &str = include_str!("migrations/000_migration_ledger.sql");

/// One numbered schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub fn checksum(&self) -> String {
        format!("{:x}", Sha256::digest(self.sql.as_bytes()))
    }
}

/// Oldest first, versions contiguous from 1.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: include_str!("migrations/001_initial_schema.sql"),
    },
    Migration {
        version: 2,
        name: "add_cash_flows",
        sql: include_str!("migrations/002_add_cash_flows.sql"),
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub checksum: String,
}

/// What one `migrate` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<u32>,
    pub backup: Option<PathBuf>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

pub struct Migrator<'a> {
    migrations: &'a [Migration],
}

impl Default for Migrator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator<'static> {
    pub fn new() -> Self {
        Self { migrations: MIGRATIONS }
    }
}

impl<'a> Migrator<'a> {
    pub fn with_migrations(migrations: &'a [Migration]) -> Self {
        Self { migrations }
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    /// Ledger rows, oldest first. Creates the ledger table if missing.
    pub fn applied(&self, conn: &Connection) -> Result<Vec<AppliedMigration>> {
        conn.execute_batch(LEDGER_SQL)?;
        let mut stmt =
            conn.prepare("SELECT version, name, checksum FROM schema_migrations ORDER BY version")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(AppliedMigration {
                    version: row.get(0)?,
                    name: row.get(1)?,
                    checksum: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 0 for a database no migration has touched.
    pub fn current_version(&self, conn: &Connection) -> Result<u32> {
        Ok(self.applied(conn)?.last().map(|m| m.version).unwrap_or(0))
    }

    /// Every ledger row must match a known migration byte for byte.
    pub fn verify(&self, conn: &Connection) -> Result<()> {
        for row in self.applied(conn)? {
            let Some(known) = self.migrations.iter().find(|m| m.version == row.version) else {
                return Err(JournalError::Migration(format!(
                    "database is at schema v{} ({}), newer than this build (v{})",
                    row.version,
                    row.name,
                    self.latest_version()
                )));
            };
            if known.checksum() != row.checksum {
                log::error!(
                    "Checksum mismatch for migration {} ({}): expected {}, stored {}",
                    row.version,
                    row.name,
                    known.checksum(),
                    row.checksum
                );
                return Err(JournalError::Migration(format!(
                    "migration {} ({}) changed after it was applied",
                    row.version, row.name
                )));
            }
        }
        Ok(())
    }

    /// Verify the ledger, then apply every pending migration in its own transaction.
    ///
    /// On-disk databases are copied to `backups/` next to `db_path` first.
    pub fn migrate(&self, conn: &Connection, db_path: &str) -> Result<MigrationReport> {
        self.verify(conn)?;
        let from_version = self.current_version(conn)?;
        let pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| m.version > from_version)
            .collect();

        let mut report = MigrationReport {
            from_version,
            to_version: from_version,
            applied: Vec::new(),
            backup: None,
        };
        let Some(target) = pending.last() else {
            return Ok(report);
        };

        log::info!(
            "Migrating schema v{} -> v{} ({} step(s))",
            from_version,
            target.version,
            pending.len()
        );
        if db_path != IN_MEMORY && from_version > 0 {
            report.backup = Some(backup_before_migration(conn, Path::new(db_path), target.version)?);
        }

        for migration in pending {
            if let Err(e) = apply(conn, migration) {
                log::error!("Migration {} ({}) failed: {}", migration.version, migration.name, e);
                if let Some(path) = &report.backup {
                    log::error!("Pre-migration copy kept at {}", path.display());
                }
                return Err(JournalError::Migration(format!(
                    "{} ({}): {}",
                    migration.version, migration.name, e
                )));
            }
            report.applied.push(migration.version);
            report.to_version = migration.version;
        }

        Ok(report)
    }
}

fn apply(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let started = Instant::now();
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, checksum, applied_at, execution_time_ms)
         VALUES (?, ?, ?, ?, ?)",
        params![
            migration.version,
            migration.name,
            migration.checksum(),
            Utc::now().to_rfc3339(),
            started.elapsed().as_millis() as i64
        ],
    )?;
    tx.commit()?;
    log::info!("Applied migration {} ({})", migration.version, migration.name);
    Ok(())
}

/// Copy the live database to `<db dir>/backups/` and check the copy's integrity.
pub fn backup_before_migration(conn: &Connection, db_path: &Path, target_version: u32) -> Result<PathBuf> {
    let backup_dir = db_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("backups");
    fs::create_dir_all(&backup_dir)?;

    // Timestamp first so file names sort chronologically
    let file_name = format!(
        "{}_pre_v{}.db",
        Utc::now().format("%Y%m%dT%H%M%S%3f"),
        target_version
    );
    let backup_path = backup_dir.join(file_name);
    conn.backup(DatabaseName::Main, &backup_path, None)?;

    let copy = Connection::open(&backup_path)?;
    let integrity: String = copy.pragma_query_value(None, "integrity_check", |row| row.get(0))?;
    if integrity != "ok" {
        return Err(JournalError::Migration(format!(
            "backup {} failed integrity check: {}",
            backup_path.display(),
            integrity
        )));
    }
    log::info!("Backed up database to {}", backup_path.display());

    let removed = prune_backups(&backup_dir, MAX_BACKUPS)?;
    if removed > 0 {
        log::debug!("Removed {} old backup(s)", removed);
    }
    Ok(backup_path)
}

/// Keep the newest `keep` backups in `dir`; returns how many were deleted.
pub fn prune_backups(dir: &Path, keep: usize) -> Result<usize> {
    let mut backups: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("db"))
        .collect();
    backups.sort();

    let excess = backups.len().saturating_sub(keep);
    let mut removed = 0;
    for path in backups.iter().take(excess) {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => log::warn!("Could not delete old backup {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap();
        names
    }

    #[test]
    fn test_versions_are_contiguous_from_one() {
        for (i, m) in MIGRATIONS.iter().enumerate() {
            assert_eq!(m.version as usize, i + 1, "{} is out of sequence", m.name);
        }
    }

    #[test]
    fn test_fresh_database_reaches_latest() {
        let conn = Connection::open_in_memory().unwrap();
        let report = Migrator::new().migrate(&conn, IN_MEMORY).unwrap();

        assert_eq!(report.from_version, 0);
        assert_eq!(report.to_version, 2);
        assert_eq!(report.applied, vec![1, 2]);
        assert_eq!(report.backup, None);
        assert_eq!(tables(&conn), vec!["discipline_rules", "schema_migrations", "trades"]);

        let loss: f64 = conn
            .query_row("SELECT max_daily_loss_percent FROM discipline_rules WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(loss, 6.0);
        conn.execute("UPDATE trades SET deposit = 1.0, withdrawal = 2.0", []).unwrap();
    }

    #[test]
    fn test_second_run_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::new();
        migrator.migrate(&conn, IN_MEMORY).unwrap();

        let again = migrator.migrate(&conn, IN_MEMORY).unwrap();
        assert!(again.is_noop());
        assert_eq!(again.from_version, 2);
        assert_eq!(migrator.applied(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_tampered_checksum_blocks_open() {
        let conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::new();
        migrator.migrate(&conn, IN_MEMORY).unwrap();

        conn.execute("UPDATE schema_migrations SET checksum = 'edited' WHERE version = 1", [])
            .unwrap();
        assert!(matches!(migrator.verify(&conn), Err(JournalError::Migration(_))));
        assert!(migrator.migrate(&conn, IN_MEMORY).is_err());
    }

    #[test]
    fn test_newer_database_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        Migrator::new().migrate(&conn, IN_MEMORY).unwrap();

        let older_build = Migrator::with_migrations(&MIGRATIONS[..1]);
        let err = older_build.verify(&conn).unwrap_err();
        assert!(err.to_string().contains("newer than this build"), "{}", err);
    }

    #[test]
    fn test_failed_step_rolls_back_alone() {
        let steps = [
            MIGRATIONS[0],
            Migration {
                version: 2,
                name: "broken",
                sql: "CREATE TABLE half_done (x INTEGER); NOT VALID SQL;",
            },
        ];
        let conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::with_migrations(&steps);

        assert!(matches!(migrator.migrate(&conn, IN_MEMORY), Err(JournalError::Migration(_))));
        assert_eq!(migrator.current_version(&conn).unwrap(), 1);
        assert!(!tables(&conn).contains(&"half_done".to_string()));
    }

    #[test]
    fn test_upgrade_on_disk_takes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let db_path = db_path.to_str().unwrap();
        let conn = Connection::open(db_path).unwrap();

        // A fresh file has nothing worth copying
        Migrator::with_migrations(&MIGRATIONS[..1]).migrate(&conn, db_path).unwrap();
        assert!(!dir.path().join("backups").exists());

        let report = Migrator::new().migrate(&conn, db_path).unwrap();
        assert_eq!(report.applied, vec![2]);
        let backup = report.backup.unwrap();
        assert!(backup.exists());

        // The copy is the v1 schema
        let copy = Connection::open(&backup).unwrap();
        assert_eq!(Migrator::with_migrations(&MIGRATIONS[..1]).current_version(&copy).unwrap(), 1);
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for stamp in 1..=7 {
            fs::write(dir.path().join(format!("2024010{}T000000000_pre_v2.db", stamp)), b"").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

        assert_eq!(prune_backups(dir.path(), 5).unwrap(), 2);
        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left.len(), 6);
        assert_eq!(left[0], "20240103T000000000_pre_v2.db");
        assert!(left.contains(&"notes.txt".to_string()));
    }
}
