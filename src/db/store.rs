use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::Result;
use crate::models::{DisciplineRules, Trade};
use crate::store::RecordStore;

const TRADE_COLUMNS: &str =
    "id, trade_number, starting_balance, profit_loss, deposit, withdrawal, note, timestamp, date";

/// Helper function to map a database row to a Trade struct
fn map_row_to_trade(row: &rusqlite::Row) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: row.get(0)?,
        trade_number: row.get(1)?,
        starting_balance: row.get(2)?,
        profit_loss: row.get(3)?,
        deposit: row.get(4)?,
        withdrawal: row.get(5)?,
        note: row.get(6)?,
        timestamp: row.get(7)?,
        date: row.get(8)?,
    })
}

fn write_trade(conn: &rusqlite::Connection, trade: &Trade, on_conflict: &str) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO trades ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) {}",
            TRADE_COLUMNS, on_conflict
        ),
        params![
            trade.id,
            trade.trade_number,
            trade.starting_balance,
            trade.profit_loss,
            trade.deposit,
            trade.withdrawal,
            trade.note,
            trade.timestamp,
            trade.date,
        ],
    )
}

// Updates in place so the row keeps its rowid, and with it its spot among equal timestamps
const UPSERT_CLAUSE: &str = "ON CONFLICT(id) DO UPDATE SET
    trade_number = excluded.trade_number,
    starting_balance = excluded.starting_balance,
    profit_loss = excluded.profit_loss,
    deposit = excluded.deposit,
    withdrawal = excluded.withdrawal,
    note = excluded.note,
    timestamp = excluded.timestamp,
    date = excluded.date";

impl RecordStore for Database {
    fn list_trades(&self) -> Result<Vec<Trade>> {
        let conn = self.conn.lock()?;

        // rowid breaks timestamp ties in insertion order
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM trades ORDER BY timestamp ASC, rowid ASC",
            TRADE_COLUMNS
        ))?;
        let trades = stmt
            .query_map([], map_row_to_trade)?
            .collect::<rusqlite::Result<Vec<Trade>>>()?;

        Ok(trades)
    }

    fn get_trade(&self, id: &str) -> Result<Option<Trade>> {
        let conn = self.conn.lock()?;
        let trade = conn
            .query_row(
                &format!("SELECT {} FROM trades WHERE id = ?", TRADE_COLUMNS),
                [id],
                map_row_to_trade,
            )
            .optional()?;
        Ok(trade)
    }

    fn insert_trade(&self, trade: &Trade) -> Result<()> {
        let conn = self.conn.lock()?;
        write_trade(&conn, trade, "")?;
        Ok(())
    }

    fn upsert_trade(&self, trade: &Trade) -> Result<()> {
        let conn = self.conn.lock()?;
        write_trade(&conn, trade, UPSERT_CLAUSE)?;
        Ok(())
    }

    fn delete_trade(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock()?;
        let removed = conn.execute("DELETE FROM trades WHERE id = ?", [id])?;
        Ok(removed > 0)
    }

    fn clear_trades(&self) -> Result<usize> {
        let conn = self.conn.lock()?;
        Ok(conn.execute("DELETE FROM trades", [])?)
    }

    fn get_rules(&self) -> Result<DisciplineRules> {
        let conn = self.conn.lock()?;
        let rules = conn
            .query_row(
                "SELECT max_daily_loss_percent, daily_profit_target_percent FROM discipline_rules WHERE id = 1",
                [],
                |row| {
                    Ok(DisciplineRules {
                        max_daily_loss_percent: row.get(0)?,
                        daily_profit_target_percent: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(rules.unwrap_or_default())
    }

    fn save_rules(&self, rules: &DisciplineRules) -> Result<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO discipline_rules (id, max_daily_loss_percent, daily_profit_target_percent, updated_at)
             VALUES (1, ?, ?, strftime('%s', 'now'))
             ON CONFLICT(id) DO UPDATE SET
                max_daily_loss_percent = excluded.max_daily_loss_percent,
                daily_profit_target_percent = excluded.daily_profit_target_percent,
                updated_at = excluded.updated_at",
            params![rules.max_daily_loss_percent, rules.daily_profit_target_percent],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::trade_at;
    use crate::store::MemoryStore;

    #[test]
    fn test_round_trip_with_cash_flows() {
        let db = Database::open_in_memory().unwrap();
        let mut t = trade_at(1, 1000.0, -12.5, "2024-01-01", 100);
        t.deposit = Some(50.0);
        t.note = Some("revenge trade".to_string());
        db.insert_trade(&t).unwrap();

        assert_eq!(db.get_trade(&t.id).unwrap(), Some(t));
        assert_eq!(db.get_trade("missing").unwrap(), None);
    }

    #[test]
    fn test_list_is_chronological() {
        let db = Database::open_in_memory().unwrap();
        db.insert_trade(&trade_at(3, 1000.0, 1.0, "2024-01-02", 300)).unwrap();
        db.insert_trade(&trade_at(1, 1000.0, 1.0, "2024-01-01", 100)).unwrap();
        db.insert_trade(&trade_at(2, 1000.0, 1.0, "2024-01-01", 100)).unwrap();

        let numbers: Vec<u32> = db.list_trades().unwrap().iter().map(|t| t.trade_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_id_rejected_and_upsert_replaces() {
        let db = Database::open_in_memory().unwrap();
        let mut t = trade_at(1, 1000.0, 1.0, "2024-01-01", 100);
        db.insert_trade(&t).unwrap();
        assert!(db.insert_trade(&t).is_err());

        t.profit_loss = 42.0;
        db.upsert_trade(&t).unwrap();
        let stored = db.list_trades().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].profit_loss, 42.0);
    }

    #[test]
    fn test_upsert_keeps_position_among_equal_timestamps() {
        let db = Database::open_in_memory().unwrap();
        let memory = MemoryStore::new();
        let trades: Vec<Trade> = (1..=3).map(|n| trade_at(n, 1000.0, 1.0, "2024-01-01", 100)).collect();
        for t in &trades {
            db.insert_trade(t).unwrap();
            memory.insert_trade(t).unwrap();
        }

        let mut edited = trades[0].clone();
        edited.note = Some("moved stop to breakeven".to_string());
        db.upsert_trade(&edited).unwrap();
        memory.upsert_trade(&edited).unwrap();

        let listed = db.list_trades().unwrap();
        let numbers: Vec<u32> = listed.iter().map(|t| t.trade_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(listed[0], edited);
        assert_eq!(listed, memory.list_trades().unwrap());
    }

    #[test]
    fn test_rules_seeded_and_saved() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_rules().unwrap(), DisciplineRules::default());

        let rules = DisciplineRules { max_daily_loss_percent: 4.0, daily_profit_target_percent: 12.0 };
        db.save_rules(&rules).unwrap();
        assert_eq!(db.get_rules().unwrap(), rules);

        db.conn.lock().unwrap().execute("DELETE FROM discipline_rules", []).unwrap();
        assert_eq!(db.get_rules().unwrap(), DisciplineRules::default());
    }

    #[test]
    fn test_delete_and_clear() {
        let db = Database::open_in_memory().unwrap();
        db.insert_trade(&trade_at(1, 1000.0, 1.0, "2024-01-01", 100)).unwrap();
        db.insert_trade(&trade_at(2, 1000.0, 1.0, "2024-01-01", 200)).unwrap();

        assert!(db.delete_trade("TRADE-1").unwrap());
        assert!(!db.delete_trade("TRADE-1").unwrap());
        assert_eq!(db.clear_trades().unwrap(), 1);
    }
}
