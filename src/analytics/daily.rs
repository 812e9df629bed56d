use std::collections::BTreeMap;

use crate::models::{DailySummary, Trade};

/// Partition trades by calendar date.
///
/// Groups come out in ascending date order (ISO strings sort chronologically) and trades
/// inside a group in ascending timestamp order; ties keep their recorded order.
/// Non-ISO dates are still grouped as opaque keys, they just may not sort by time.
pub fn group_by_date(trades: &[Trade]) -> Vec<DailySummary> {
    let mut by_date: BTreeMap<&str, Vec<&Trade>> = BTreeMap::new();
    for trade in trades {
        by_date.entry(trade.date.as_str()).or_default().push(trade);
    }

    by_date
        .into_iter()
        .map(|(date, mut day)| {
            day.sort_by_key(|t| t.timestamp);
            summarize_day(date, &day)
        })
        .collect()
}

/// Trades attributed to `date`, in timestamp order.
pub fn trades_on<'a>(trades: &'a [Trade], date: &str) -> Vec<&'a Trade> {
    let mut day: Vec<&Trade> = trades.iter().filter(|t| t.date == date).collect();
    day.sort_by_key(|t| t.timestamp);
    day
}

/// Sum of profit/loss over every trade dated `date`.
pub fn daily_profit_loss(trades: &[Trade], date: &str) -> f64 {
    trades_on(trades, date).iter().map(|t| t.profit_loss).sum()
}

fn summarize_day(date: &str, day: &[&Trade]) -> DailySummary {
    let total_profit_loss: f64 = day.iter().map(|t| t.profit_loss).sum();
    let total_deposits: f64 = day.iter().filter_map(|t| t.deposit).sum();
    let total_withdrawals: f64 = day.iter().filter_map(|t| t.withdrawal).sum();
    let starting_balance = day.first().map(|t| t.starting_balance).unwrap_or(0.0);

    DailySummary {
        date: date.to_string(),
        trades: day.iter().map(|t| (*t).clone()).collect(),
        total_profit_loss,
        total_deposits,
        total_withdrawals,
        starting_balance,
        ending_balance: starting_balance + total_profit_loss + total_deposits - total_withdrawals,
        trade_count: day.len(),
    }
}
