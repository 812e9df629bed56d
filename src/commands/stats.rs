use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analytics;
use crate::config::DATE_FORMAT;
use crate::error::{JournalError, Result};
use crate::models::{
    DailySummary, DisciplineCheck, EquityCurvePoint, JournalSummary, Trade, TradeStats,
};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    Year,
}

impl DateRange {
    /// Unknown names fall back to the whole history.
    pub fn parse(range: Option<&str>) -> Self {
        match range {
            Some("today") => DateRange::Today,
            Some("week") => DateRange::Week,
            Some("month") => DateRange::Month,
            Some("3months") => DateRange::ThreeMonths,
            Some("6months") => DateRange::SixMonths,
            Some("year") => DateRange::Year,
            _ => DateRange::All,
        }
    }

    /// First calendar date included, relative to `today`.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            DateRange::All => return None,
            DateRange::Today => 0,
            DateRange::Week => 7,
            DateRange::Month => 30,
            DateRange::ThreeMonths => 90,
            DateRange::SixMonths => 180,
            DateRange::Year => 365,
        };
        Some(today - Duration::days(days))
    }

    /// Trades dated on or after the range start, order preserved.
    pub fn filter(&self, trades: Vec<Trade>, today: NaiveDate) -> Vec<Trade> {
        match self.start_date(today) {
            None => trades,
            Some(start) => {
                let start = start.format(DATE_FORMAT).to_string();
                trades.into_iter().filter(|t| t.date >= start).collect()
            }
        }
    }
}

pub fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

pub fn get_trade_stats<S: RecordStore + ?Sized>(store: &S, index: usize) -> Result<TradeStats> {
    let trades = store.list_trades()?;
    let rules = store.get_rules()?;
    analytics::stats_for(&trades, index, &rules)
        .ok_or_else(|| JournalError::NotFound(format!("trade at index {}", index)))
}

pub fn get_all_trade_stats<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<TradeStats>> {
    let trades = store.list_trades()?;
    let rules = store.get_rules()?;
    Ok(analytics::stats_all(&trades, &rules))
}

pub fn get_daily_summaries<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<DailySummary>> {
    Ok(analytics::group_by_date(&store.list_trades()?))
}

pub fn get_journal_summary<S: RecordStore + ?Sized>(
    store: &S,
    date_range: Option<&str>,
) -> Result<JournalSummary> {
    let trades = DateRange::parse(date_range).filter(store.list_trades()?, Local::now().date_naive());
    Ok(analytics::summarize(&trades))
}

pub fn get_equity_curve<S: RecordStore + ?Sized>(
    store: &S,
    date_range: Option<&str>,
) -> Result<Vec<EquityCurvePoint>> {
    let trades = DateRange::parse(date_range).filter(store.list_trades()?, Local::now().date_naive());
    Ok(analytics::equity_curve(&trades))
}

/// Discipline status for `date`, today when omitted.
pub fn get_discipline_status<S: RecordStore + ?Sized>(
    store: &S,
    date: Option<&str>,
) -> Result<DisciplineCheck> {
    let trades = store.list_trades()?;
    let rules = store.get_rules()?;
    let date = date.map(str::to_string).unwrap_or_else(today);
    Ok(analytics::check_discipline(&trades, &date, &rules))
}
