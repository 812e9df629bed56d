use std::sync::RwLock;

use crate::error::{JournalError, Result};
use crate::models::{DisciplineRules, Trade};

/// Where trades and rules live. The analytics only ever read an ordered snapshot.
pub trait RecordStore: Send + Sync {
    /// Every trade in recorded (chronological) order.
    fn list_trades(&self) -> Result<Vec<Trade>>;
    fn get_trade(&self, id: &str) -> Result<Option<Trade>>;
    fn insert_trade(&self, trade: &Trade) -> Result<()>;
    /// Insert or replace by id.
    fn upsert_trade(&self, trade: &Trade) -> Result<()>;
    /// Returns whether a trade was removed.
    fn delete_trade(&self, id: &str) -> Result<bool>;
    fn clear_trades(&self) -> Result<usize>;

    /// Stored rules, or the defaults when none were ever saved.
    fn get_rules(&self) -> Result<DisciplineRules>;
    fn save_rules(&self, rules: &DisciplineRules) -> Result<()>;
}

/// Process-local store, used by tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    trades: RwLock<Vec<Trade>>,
    rules: RwLock<Option<DisciplineRules>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trades(trades: Vec<Trade>) -> Self {
        Self {
            trades: RwLock::new(trades),
            rules: RwLock::new(None),
        }
    }

    fn sort(trades: &mut [Trade]) {
        trades.sort_by_key(|t| t.timestamp);
    }
}

impl RecordStore for MemoryStore {
    fn list_trades(&self) -> Result<Vec<Trade>> {
        Ok(self.trades.read()?.clone())
    }

    fn get_trade(&self, id: &str) -> Result<Option<Trade>> {
        Ok(self.trades.read()?.iter().find(|t| t.id == id).cloned())
    }

    fn insert_trade(&self, trade: &Trade) -> Result<()> {
        let mut trades = self.trades.write()?;
        if trades.iter().any(|t| t.id == trade.id) {
            return Err(JournalError::Validation(format!("duplicate trade id {}", trade.id)));
        }
        trades.push(trade.clone());
        Self::sort(&mut trades);
        Ok(())
    }

    fn upsert_trade(&self, trade: &Trade) -> Result<()> {
        let mut trades = self.trades.write()?;
        match trades.iter_mut().find(|t| t.id == trade.id) {
            Some(existing) => *existing = trade.clone(),
            None => trades.push(trade.clone()),
        }
        Self::sort(&mut trades);
        Ok(())
    }

    fn delete_trade(&self, id: &str) -> Result<bool> {
        let mut trades = self.trades.write()?;
        let before = trades.len();
        trades.retain(|t| t.id != id);
        Ok(trades.len() != before)
    }

    fn clear_trades(&self) -> Result<usize> {
        let mut trades = self.trades.write()?;
        let count = trades.len();
        trades.clear();
        Ok(count)
    }

    fn get_rules(&self) -> Result<DisciplineRules> {
        Ok(self.rules.read()?.unwrap_or_default())
    }

    fn save_rules(&self, rules: &DisciplineRules) -> Result<()> {
        *self.rules.write()? = Some(*rules);
        Ok(())
    }
}
