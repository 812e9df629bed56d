use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{DATE_FORMAT, LARGE_PNL_MULTIPLIER};
use crate::error::{JournalError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub trade_number: u32,

    pub starting_balance: f64,
    pub profit_loss: f64,
    #[serde(default)]
    pub deposit: Option<f64>,
    #[serde(default)]
    pub withdrawal: Option<f64>,

    #[serde(default)]
    pub note: Option<String>,

    pub timestamp: i64, // epoch millis
    pub date: String,   // YYYY-MM-DD
}

impl Trade {
    /// Deposit minus withdrawal applied at this trade's position.
    pub fn cash_flow(&self) -> f64 {
        self.deposit.unwrap_or(0.0) - self.withdrawal.unwrap_or(0.0)
    }

    /// Everything this trade adds to the running balance.
    pub fn balance_delta(&self) -> f64 {
        self.profit_loss + self.cash_flow()
    }

    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }

    /// Same field rules as [`CreateTradeInput::validate`], applied to a stored record.
    pub fn validate(&self) -> Result<()> {
        validate_amounts(
            self.starting_balance,
            self.profit_loss,
            self.deposit,
            self.withdrawal,
        )
        .and_then(|_| validate_date(&self.date))
        .map_err(|e| match e {
            JournalError::Validation(msg) => {
                JournalError::Validation(format!("trade {}: {}", self.id, msg))
            }
            other => other,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTradeInput {
    pub starting_balance: f64,
    pub profit_loss: f64,
    #[serde(default)]
    pub deposit: Option<f64>,
    #[serde(default)]
    pub withdrawal: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    /// Calendar date to attribute the trade to; defaults to the creation day.
    #[serde(default)]
    pub date: Option<String>,
}

impl CreateTradeInput {
    pub fn validate(&self) -> Result<()> {
        validate_amounts(
            self.starting_balance,
            self.profit_loss,
            self.deposit,
            self.withdrawal,
        )?;
        if let Some(date) = &self.date {
            validate_date(date)?;
        }
        Ok(())
    }

    /// True when the P/L dwarfs the balance it was made on; usually a typo.
    pub fn is_large_profit_loss(&self) -> bool {
        self.profit_loss.abs() > self.starting_balance * LARGE_PNL_MULTIPLIER
    }

    /// Trimmed note, `None` when blank.
    pub fn normalized_note(&self) -> Option<String> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

fn validate_amounts(
    starting_balance: f64,
    profit_loss: f64,
    deposit: Option<f64>,
    withdrawal: Option<f64>,
) -> Result<()> {
    if !starting_balance.is_finite() || !profit_loss.is_finite() {
        return Err(JournalError::Validation(
            "starting balance and profit/loss must be valid numbers".to_string(),
        ));
    }
    if starting_balance <= 0.0 {
        return Err(JournalError::Validation(
            "starting balance must be greater than 0".to_string(),
        ));
    }
    for (name, value) in [("deposit", deposit), ("withdrawal", withdrawal)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(JournalError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, v
                )));
            }
        }
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
        JournalError::Validation(format!("date must be YYYY-MM-DD, got '{}'", date))
    })?;
    Ok(())
}
