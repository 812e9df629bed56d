use super::balance::BalanceLedger;
use super::daily::trades_on;
use crate::config::DEFAULT_STARTING_BALANCE;
use crate::models::{DisciplineCheck, DisciplineRules, Trade, TradingStatus};

/// Absolute P/L limits for a day that opened at a given balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub profit_target: f64,
    pub max_loss: f64, // negative
}

impl Thresholds {
    pub fn new(starting_balance: f64, rules: &DisciplineRules) -> Self {
        Self {
            profit_target: starting_balance * rules.daily_profit_target_percent / 100.0,
            max_loss: -(starting_balance * rules.max_daily_loss_percent / 100.0),
        }
    }

    pub fn classify(&self, daily_profit_loss: f64) -> TradingStatus {
        // Target first. Both can only hold at once for a zero balance.
        if daily_profit_loss >= self.profit_target {
            TradingStatus::TargetHit
        } else if daily_profit_loss <= self.max_loss {
            TradingStatus::MaxLoss
        } else {
            TradingStatus::Continue
        }
    }
}

/// Classify a day's cumulative P/L against the discipline rules. Boundaries count as hit.
pub fn evaluate_status(
    daily_profit_loss: f64,
    starting_balance: f64,
    rules: &DisciplineRules,
) -> TradingStatus {
    Thresholds::new(starting_balance, rules).classify(daily_profit_loss)
}

/// Live check for `date` (usually today) against every trade recorded on it.
///
/// With nothing traded that day the status is `Continue` and thresholds are quoted
/// against the current running balance.
pub fn check_discipline(trades: &[Trade], date: &str, rules: &DisciplineRules) -> DisciplineCheck {
    let day = trades_on(trades, date);

    let (starting_balance, daily_profit_loss, status) = match day.first() {
        Some(first) => {
            let pnl: f64 = day.iter().map(|t| t.profit_loss).sum();
            let start = first.starting_balance;
            (start, pnl, evaluate_status(pnl, start, rules))
        }
        None => {
            let start = if trades.is_empty() {
                DEFAULT_STARTING_BALANCE
            } else {
                BalanceLedger::new(trades).closing()
            };
            (start, 0.0, TradingStatus::Continue)
        }
    };

    let thresholds = Thresholds::new(starting_balance, rules);
    log::debug!(
        "discipline check {}: {} trade(s), pnl {:.2}, status {}",
        date,
        day.len(),
        daily_profit_loss,
        status
    );

    DisciplineCheck {
        date: date.to_string(),
        status,
        trade_count: day.len(),
        daily_profit_loss,
        starting_balance,
        profit_target: thresholds.profit_target,
        max_loss_threshold: thresholds.max_loss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::trade;

    fn rules(loss: f64, target: f64) -> DisciplineRules {
        DisciplineRules {
            max_daily_loss_percent: loss,
            daily_profit_target_percent: target,
        }
    }

    #[test]
    fn test_scenarios() {
        let r = rules(5.0, 10.0);
        assert_eq!(evaluate_status(40.0, 1000.0, &r), TradingStatus::Continue);
        assert_eq!(evaluate_status(-60.0, 1000.0, &r), TradingStatus::MaxLoss);
        assert_eq!(evaluate_status(120.0, 1000.0, &r), TradingStatus::TargetHit);
    }

    #[test]
    fn test_boundaries_count_as_hit() {
        let r = rules(5.0, 10.0);
        assert_eq!(evaluate_status(100.0, 1000.0, &r), TradingStatus::TargetHit);
        assert_eq!(evaluate_status(-50.0, 1000.0, &r), TradingStatus::MaxLoss);
        assert_eq!(evaluate_status(99.99, 1000.0, &r), TradingStatus::Continue);
        assert_eq!(evaluate_status(-49.99, 1000.0, &r), TradingStatus::Continue);
    }

    #[test]
    fn test_monotonic_in_profit_loss() {
        let r = DisciplineRules::default();
        let rank = |s: TradingStatus| match s {
            TradingStatus::MaxLoss => 0,
            TradingStatus::Continue => 1,
            TradingStatus::TargetHit => 2,
        };

        let mut previous = rank(evaluate_status(-1000.0, 1000.0, &r));
        let mut pnl = -1000.0;
        while pnl <= 1000.0 {
            let current = rank(evaluate_status(pnl, 1000.0, &r));
            assert!(current >= previous, "status went backwards at {}", pnl);
            previous = current;
            pnl += 0.5;
        }
    }

    #[test]
    fn test_daily_budget_is_cumulative() {
        // No single trade breaches -50, the day does.
        let trades = vec![
            trade(1, 1000.0, -30.0, "2024-01-01"),
            trade(2, 970.0, -25.0, "2024-01-01"),
        ];

        let check = check_discipline(&trades, "2024-01-01", &rules(5.0, 10.0));
        assert_eq!(check.status, TradingStatus::MaxLoss);
        assert_eq!(check.trade_count, 2);
        assert_eq!(check.daily_profit_loss, -55.0);
        assert_eq!(check.starting_balance, 1000.0);
        assert_eq!(check.max_loss_threshold, -50.0);
    }

    #[test]
    fn test_quiet_day_continues_from_current_balance() {
        let trades = vec![trade(1, 1000.0, 200.0, "2024-01-01")];

        let check = check_discipline(&trades, "2024-01-02", &rules(5.0, 10.0));
        assert_eq!(check.status, TradingStatus::Continue);
        assert_eq!(check.trade_count, 0);
        assert_eq!(check.starting_balance, 1200.0);
        assert_eq!(check.profit_target, 120.0);
    }

    #[test]
    fn test_empty_journal_uses_default_balance() {
        let check = check_discipline(&[], "2024-01-01", &DisciplineRules::default());
        assert_eq!(check.status, TradingStatus::Continue);
        assert_eq!(check.starting_balance, DEFAULT_STARTING_BALANCE);
    }
}
