use chrono::{DateTime, Local};

use crate::analytics::{BalanceLedger, trades_on};
use crate::config::{DATE_FORMAT, DEFAULT_STARTING_BALANCE};
use crate::error::{JournalError, Result};
use crate::models::{CreateTradeInput, Trade};
use crate::store::RecordStore;

pub fn list_trades<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Trade>> {
    store.list_trades()
}

pub fn get_trade<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Trade> {
    store
        .get_trade(id)?
        .ok_or_else(|| JournalError::NotFound(format!("trade {}", id)))
}

pub fn trades_for_date<S: RecordStore + ?Sized>(store: &S, date: &str) -> Result<Vec<Trade>> {
    let trades = store.list_trades()?;
    Ok(trades_on(&trades, date).into_iter().cloned().collect())
}

pub fn create_trade<S: RecordStore + ?Sized>(store: &S, input: CreateTradeInput) -> Result<Trade> {
    create_trade_at(store, input, Local::now())
}

/// Record a trade as of `now`: validates, numbers, timestamps and dates it.
pub fn create_trade_at<S: RecordStore + ?Sized>(
    store: &S,
    input: CreateTradeInput,
    now: DateTime<Local>,
) -> Result<Trade> {
    input.validate()?;

    if input.is_large_profit_loss() {
        log::warn!(
            "P/L {} is very large compared to balance {}",
            input.profit_loss,
            input.starting_balance
        );
    }

    let trade = Trade {
        id: format!("TRADE-{}-{}", now.timestamp_millis(), uuid::Uuid::new_v4()),
        trade_number: next_trade_number(store)?,
        starting_balance: input.starting_balance,
        profit_loss: input.profit_loss,
        deposit: input.deposit,
        withdrawal: input.withdrawal,
        note: input.normalized_note(),
        timestamp: now.timestamp_millis(),
        date: input
            .date
            .clone()
            .unwrap_or_else(|| now.format(DATE_FORMAT).to_string()),
    };

    store.insert_trade(&trade)?;
    log::info!(
        "Recorded trade #{} ({}): pnl {:.2} on {}",
        trade.trade_number,
        trade.id,
        trade.profit_loss,
        trade.date
    );

    Ok(trade)
}

pub fn delete_trade<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<()> {
    if !store.delete_trade(id)? {
        return Err(JournalError::NotFound(format!("trade {}", id)));
    }
    log::info!("Deleted trade {}", id);
    Ok(())
}

pub fn delete_all_trades<S: RecordStore + ?Sized>(store: &S) -> Result<usize> {
    let count = store.clear_trades()?;
    log::warn!("Cleared journal: {} trade(s) removed", count);
    Ok(count)
}

/// Display number for the next trade. Never reuses a number still in the journal.
pub fn next_trade_number<S: RecordStore + ?Sized>(store: &S) -> Result<u32> {
    let trades = store.list_trades()?;
    Ok(trades.iter().map(|t| t.trade_number).max().map_or(1, |n| n + 1))
}

/// Running balance after the latest trade; pre-fills the next entry.
pub fn last_balance<S: RecordStore + ?Sized>(store: &S) -> Result<f64> {
    let trades = store.list_trades()?;
    if trades.is_empty() {
        return Ok(DEFAULT_STARTING_BALANCE);
    }
    Ok(BalanceLedger::new(&trades).closing())
}
