use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};
use crate::models::{DisciplineRules, Trade};
use crate::store::RecordStore;

pub const BACKUP_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub rules: DisciplineRules,
    pub trades: Vec<Trade>,
    pub export_date: String,
    pub version: String,
}

/// Export rules and every trade as pretty JSON.
pub fn export_all_data<S: RecordStore + ?Sized>(store: &S) -> Result<String> {
    let backup = BackupData {
        rules: store.get_rules()?,
        trades: store.list_trades()?,
        export_date: Utc::now().to_rfc3339(),
        version: BACKUP_VERSION.to_string(),
    };

    log::info!("Exporting {} trade(s)", backup.trades.len());
    Ok(serde_json::to_string_pretty(&backup)?)
}

/// Import a JSON backup: rules are replaced, trades upserted by id.
/// Returns `(rules_updated, trades_imported)`.
pub fn import_all_data<S: RecordStore + ?Sized>(store: &S, json_data: &str) -> Result<(usize, usize)> {
    let backup: BackupData = serde_json::from_str(json_data)?;

    backup.rules.validate()?;
    for trade in &backup.trades {
        trade.validate()?;
    }

    store.save_rules(&backup.rules)?;
    for trade in &backup.trades {
        store.upsert_trade(trade)?;
    }

    log::info!(
        "Imported backup v{} from {}: {} trade(s)",
        backup.version,
        backup.export_date,
        backup.trades.len()
    );
    Ok((1, backup.trades.len()))
}

/// Trade history as CSV with a header row of field names.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for trade in trades {
        wtr.serialize(trade)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| JournalError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| JournalError::Csv(e.to_string()))
}

/// Upsert trades from CSV produced by [`export_trades_csv`]. Ids are kept.
pub fn import_trades_csv<S: RecordStore + ?Sized>(store: &S, csv_content: &str) -> Result<usize> {
    let mut rdr = csv::Reader::from_reader(csv_content.as_bytes());
    let trades = rdr
        .deserialize::<Trade>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for trade in &trades {
        trade.validate()?;
    }
    for trade in &trades {
        store.upsert_trade(trade)?;
    }

    log::info!("Imported {} trade(s) from CSV", trades.len());
    Ok(trades.len())
}
