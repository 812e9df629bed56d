use serde::{Deserialize, Serialize};

use super::Trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingStatus {
    Continue,
    TargetHit,
    MaxLoss,
}

impl TradingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TradingStatus::Continue => "CONTINUE",
            TradingStatus::TargetHit => "STOP - TARGET HIT",
            TradingStatus::MaxLoss => "STOP - MAX LOSS",
        }
    }

    pub fn is_stop(&self) -> bool {
        !matches!(self, TradingStatus::Continue)
    }
}

impl std::fmt::Display for TradingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-trade display bundle. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_balance: f64,
    pub drawdown: f64,
    pub is_win: bool,
    pub status: TradingStatus,
    pub daily_profit_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub trades: Vec<Trade>,
    pub total_profit_loss: f64,
    pub total_deposits: f64,
    pub total_withdrawals: f64,
    pub starting_balance: f64,
    pub ending_balance: f64,
    pub trade_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalSummary {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_deposits: f64,
    pub total_withdrawals: f64,
    pub starting_balance: f64,
    pub current_balance: f64,
    pub roi_percent: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub date: String,
    pub daily_pnl: f64,
    pub cumulative_pnl: f64,
    pub ending_balance: f64,
    pub trade_count: usize,
}

/// Live discipline state for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisciplineCheck {
    pub date: String,
    pub status: TradingStatus,
    pub trade_count: usize,
    pub daily_profit_loss: f64,
    pub starting_balance: f64,
    pub profit_target: f64,
    pub max_loss_threshold: f64,
}
