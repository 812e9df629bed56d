use crate::models::Trade;

/// Running balances for a whole trade sequence, computed in one forward pass.
///
/// `balance_after(i)` is the recurrence
/// `b(0) = start[0] + pl[0] + dep[0] - wd[0]`, `b(i) = b(i-1) + pl[i] + dep[i] - wd[i]`,
/// memoized so a caller walking every row stays linear.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceLedger {
    opening: f64,
    balances: Vec<f64>,
}

impl BalanceLedger {
    pub fn new(trades: &[Trade]) -> Self {
        let opening = opening_balance(trades);
        let mut running = opening;
        let balances = trades
            .iter()
            .map(|t| {
                running = apply(running, t);
                running
            })
            .collect();

        Self { opening, balances }
    }

    /// Balance before any trade: the first trade's starting balance, 0 when empty.
    pub fn opening(&self) -> f64 {
        self.opening
    }

    /// Balance after trade `index`. Out-of-range indices clamp to the last trade.
    pub fn balance_after(&self, index: usize) -> f64 {
        match self.balances.len() {
            0 => self.opening,
            n => self.balances[index.min(n - 1)],
        }
    }

    pub fn balance_before(&self, index: usize) -> f64 {
        if index == 0 {
            self.opening
        } else {
            self.balance_after(index - 1)
        }
    }

    pub fn closing(&self) -> f64 {
        self.balances.last().copied().unwrap_or(self.opening)
    }

    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// Balance "before any trades exist": the first trade's starting balance, 0 when empty.
pub fn opening_balance(trades: &[Trade]) -> f64 {
    trades.first().map(|t| t.starting_balance).unwrap_or(0.0)
}

/// Balance immediately after trade `index` is applied.
///
/// A single call is O(index). Use [`BalanceLedger`] when every row is needed.
pub fn accumulate_balance(trades: &[Trade], index: usize) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let end = index.min(trades.len() - 1);
    trades[..=end]
        .iter()
        .fold(opening_balance(trades), apply)
}

fn apply(balance: f64, trade: &Trade) -> f64 {
    balance + trade.balance_delta()
}
