use super::balance::{BalanceLedger, opening_balance};
use crate::models::Trade;

/// Peak-to-trough tracker over a balance stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownTracker {
    peak: f64,
    max_drawdown: f64,
}

impl DrawdownTracker {
    pub fn new(initial_peak: f64) -> Self {
        Self {
            peak: initial_peak,
            max_drawdown: 0.0,
        }
    }

    /// Feed the next balance; returns the max drawdown (percent) seen so far.
    pub fn update(&mut self, balance: f64) -> f64 {
        if balance > self.peak {
            self.peak = balance;
        } else if self.peak > 0.0 {
            // A non-positive peak only comes from a rejected-at-entry starting balance.
            let drawdown = (self.peak - balance) / self.peak * 100.0;
            if drawdown > self.max_drawdown {
                self.max_drawdown = drawdown;
            }
        }
        self.max_drawdown
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

/// Maximum percentage decline from any running peak to a later balance. 0 when empty.
pub fn compute_drawdown(trades: &[Trade]) -> f64 {
    drawdown_series(trades).last().copied().unwrap_or(0.0)
}

/// Max drawdown as of each trade: element `i` equals `compute_drawdown(&trades[..=i])`.
pub fn drawdown_series(trades: &[Trade]) -> Vec<f64> {
    let ledger = BalanceLedger::new(trades);
    let mut tracker = DrawdownTracker::new(opening_balance(trades));
    ledger.balances().iter().map(|&b| tracker.update(b)).collect()
}
