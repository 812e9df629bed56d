//! Pure analytics over an ordered trade sequence.
//!
//! Nothing here performs I/O or keeps state between calls. Every function recomputes from
//! the slice it is given, so a new snapshot of trades simply means calling again.

pub mod balance;
pub mod daily;
pub mod drawdown;
pub mod stats;
pub mod status;

pub use balance::{BalanceLedger, accumulate_balance, opening_balance};
pub use daily::{daily_profit_loss, group_by_date, trades_on};
pub use drawdown::{DrawdownTracker, compute_drawdown, drawdown_series};
pub use stats::{equity_curve, stats_all, stats_for, summarize};
pub use status::{Thresholds, check_discipline, evaluate_status};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::Trade;

    pub fn trade(number: u32, starting_balance: f64, profit_loss: f64, date: &str) -> Trade {
        trade_at(number, starting_balance, profit_loss, date, number as i64 * 1_000)
    }

    pub fn trade_at(
        number: u32,
        starting_balance: f64,
        profit_loss: f64,
        date: &str,
        timestamp: i64,
    ) -> Trade {
        Trade {
            id: format!("TRADE-{}", number),
            trade_number: number,
            starting_balance,
            profit_loss,
            deposit: None,
            withdrawal: None,
            note: None,
            timestamp,
            date: date.to_string(),
        }
    }
}
