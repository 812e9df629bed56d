pub mod analytics;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod store;

use anyhow::Context;

pub use config::JournalConfig;
pub use db::Database;
pub use error::{JournalError, Result};
pub use store::{MemoryStore, RecordStore};

/// Create the data directory, open the journal database and bring its schema up to date.
pub fn init_journal(config: &JournalConfig) -> anyhow::Result<Database> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir.display())
    })?;

    let db_path = config.db_path();
    log::info!("Database path: {:?}", db_path);

    let db_path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {:?}", db_path))?;

    let database = Database::new(db_path_str).with_context(|| {
        format!(
            "Database initialization failed. Backups are located at {:?}",
            config.data_dir.join("backups")
        )
    })?;

    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_journal_creates_directory_and_schema() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::new(dir.path().join("nested"));

        let db = init_journal(&config).unwrap();
        assert!(config.db_path().exists());
        assert_eq!(db.get_rules().unwrap(), models::DisciplineRules::default());

        // Reopening applies nothing new
        drop(db);
        let db = init_journal(&config).unwrap();
        assert!(db.list_trades().unwrap().is_empty());
    }
}
