use std::collections::HashMap;

use super::balance::{BalanceLedger, accumulate_balance};
use super::daily::{daily_profit_loss, group_by_date, trades_on};
use super::drawdown::{compute_drawdown, drawdown_series};
use super::status::evaluate_status;
use crate::models::{DisciplineRules, EquityCurvePoint, JournalSummary, Trade, TradeStats};

/// Display bundle for the trade at `index`; `None` when the index is out of range.
///
/// Drawdown is as of this trade; daily P/L and status cover every trade sharing its date.
/// A single call is O(index). Use [`stats_all`] when every row is needed.
pub fn stats_for(trades: &[Trade], index: usize, rules: &DisciplineRules) -> Option<TradeStats> {
    let trade = trades.get(index)?;

    let daily_pnl = daily_profit_loss(trades, &trade.date);
    let day_start = trades_on(trades, &trade.date)
        .first()
        .map(|t| t.starting_balance)
        .unwrap_or(trade.starting_balance);

    Some(TradeStats {
        total_balance: accumulate_balance(trades, index),
        drawdown: compute_drawdown(&trades[..=index]),
        is_win: trade.is_win(),
        status: evaluate_status(daily_pnl, day_start, rules),
        daily_profit_loss: daily_pnl,
    })
}

/// `stats_for` for every index in one linear pass.
pub fn stats_all(trades: &[Trade], rules: &DisciplineRules) -> Vec<TradeStats> {
    let ledger = BalanceLedger::new(trades);
    let drawdowns = drawdown_series(trades);
    let days: HashMap<String, (f64, f64)> = group_by_date(trades)
        .into_iter()
        .map(|d| (d.date, (d.total_profit_loss, d.starting_balance)))
        .collect();

    trades
        .iter()
        .enumerate()
        .map(|(i, trade)| {
            let (daily_pnl, day_start) = days
                .get(&trade.date)
                .copied()
                .unwrap_or((trade.profit_loss, trade.starting_balance));
            TradeStats {
                total_balance: ledger.balance_after(i),
                drawdown: drawdowns[i],
                is_win: trade.is_win(),
                status: evaluate_status(daily_pnl, day_start, rules),
                daily_profit_loss: daily_pnl,
            }
        })
        .collect()
}

pub fn summarize(trades: &[Trade]) -> JournalSummary {
    let ledger = BalanceLedger::new(trades);

    let wins = trades.iter().filter(|t| t.profit_loss > 0.0).count();
    let losses = trades.iter().filter(|t| t.profit_loss < 0.0).count();
    let breakevens = trades.len() - wins - losses;

    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64 * 100.0
    };

    let total_pnl: f64 = trades.iter().map(|t| t.profit_loss).sum();
    let total_deposits: f64 = trades.iter().filter_map(|t| t.deposit).sum();
    let total_withdrawals: f64 = trades.iter().filter_map(|t| t.withdrawal).sum();

    let gross_profit: f64 = trades.iter().map(|t| t.profit_loss).filter(|p| *p > 0.0).sum();
    let gross_loss: f64 = trades
        .iter()
        .map(|t| t.profit_loss)
        .filter(|p| *p < 0.0)
        .sum::<f64>()
        .abs();

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let starting_balance = ledger.opening();
    let roi_percent = if starting_balance > 0.0 {
        total_pnl / starting_balance * 100.0
    } else {
        0.0
    };

    let best_trade = trades.iter().map(|t| t.profit_loss).reduce(f64::max).unwrap_or(0.0);
    let worst_trade = trades.iter().map(|t| t.profit_loss).reduce(f64::min).unwrap_or(0.0);

    JournalSummary {
        total_trades: trades.len(),
        wins,
        losses,
        breakevens,
        win_rate,
        total_pnl,
        total_deposits,
        total_withdrawals,
        starting_balance,
        current_balance: ledger.closing(),
        roi_percent,
        gross_profit,
        gross_loss,
        profit_factor,
        best_trade,
        worst_trade,
        max_drawdown: compute_drawdown(trades),
    }
}

/// One point per trading date, for the balance chart.
pub fn equity_curve(trades: &[Trade]) -> Vec<EquityCurvePoint> {
    let mut cumulative_pnl = 0.0;
    group_by_date(trades)
        .into_iter()
        .map(|day| {
            cumulative_pnl += day.total_profit_loss;
            EquityCurvePoint {
                date: day.date,
                daily_pnl: day.total_profit_loss,
                cumulative_pnl,
                ending_balance: day.ending_balance,
                trade_count: day.trade_count,
            }
        })
        .collect()
}
