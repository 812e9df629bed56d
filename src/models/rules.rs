use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_DAILY_PROFIT_TARGET_PERCENT, DEFAULT_MAX_DAILY_LOSS_PERCENT};
use crate::error::{JournalError, Result};

/// Daily stop-loss and take-profit, both as a percentage of the day's starting balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisciplineRules {
    pub max_daily_loss_percent: f64,
    pub daily_profit_target_percent: f64,
}

impl Default for DisciplineRules {
    fn default() -> Self {
        Self {
            max_daily_loss_percent: DEFAULT_MAX_DAILY_LOSS_PERCENT,
            daily_profit_target_percent: DEFAULT_DAILY_PROFIT_TARGET_PERCENT,
        }
    }
}

impl DisciplineRules {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max daily loss", self.max_daily_loss_percent),
            ("daily profit target", self.daily_profit_target_percent),
        ] {
            if !value.is_finite() || value <= 0.0 || value > 100.0 {
                return Err(JournalError::Validation(format!(
                    "{} must be within (0, 100]%, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Target not above the loss limit is allowed, just unusual.
    pub fn target_below_loss(&self) -> bool {
        self.daily_profit_target_percent <= self.max_daily_loss_percent
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRulesInput {
    pub max_daily_loss_percent: Option<f64>,
    pub daily_profit_target_percent: Option<f64>,
}

impl UpdateRulesInput {
    /// Overlay onto `current`; signs are dropped, users often type the loss as negative.
    pub fn apply_to(&self, current: DisciplineRules) -> DisciplineRules {
        DisciplineRules {
            max_daily_loss_percent: self
                .max_daily_loss_percent
                .map(f64::abs)
                .unwrap_or(current.max_daily_loss_percent),
            daily_profit_target_percent: self
                .daily_profit_target_percent
                .map(f64::abs)
                .unwrap_or(current.daily_profit_target_percent),
        }
    }
}
