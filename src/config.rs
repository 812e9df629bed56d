use std::path::PathBuf;

pub const DEFAULT_MAX_DAILY_LOSS_PERCENT: f64 = 6.0;
pub const DEFAULT_DAILY_PROFIT_TARGET_PERCENT: f64 = 16.5;

/// Balance offered to the input form when the journal has no trades yet.
pub const DEFAULT_STARTING_BALANCE: f64 = 1008.66;

/// A P/L larger than this multiple of the starting balance is flagged as suspicious.
pub const LARGE_PNL_MULTIPLIER: f64 = 10.0;

/// Pre-migration backups kept on disk.
pub const MAX_BACKUPS: usize = 5;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DATA_DIR_ENV: &str = "DISCIPLINE_JOURNAL_DIR";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_DB_FILE: &str = "discipline_journal.db";

#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub data_dir: PathBuf,
    pub db_file_name: String,
}

impl JournalConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_file_name: DEFAULT_DB_FILE.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::new(dir)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_joins_data_dir() {
        let config = JournalConfig::new("/tmp/journal");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/journal/discipline_journal.db"));
    }
}
