use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::analytics;
use crate::error::Result;
use crate::models::{
    DailySummary, DisciplineCheck, DisciplineRules, EquityCurvePoint, JournalSummary, Trade,
    TradeStats,
};
use crate::store::RecordStore;

/// One complete, immutable view of the record store.
#[derive(Debug, Clone, Default)]
pub struct JournalSnapshot {
    pub version: u64,
    pub trades: Vec<Trade>,
    pub rules: DisciplineRules,
}

/// Push side of the record store: each publish replaces the previous snapshot wholesale.
pub struct SnapshotFeed {
    tx: watch::Sender<Arc<JournalSnapshot>>,
}

impl Default for SnapshotFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(JournalSnapshot::default()));
        Self { tx }
    }

    /// Returns the version assigned to the new snapshot.
    pub fn publish(&self, trades: Vec<Trade>, rules: DisciplineRules) -> u64 {
        let mut version = 0;
        self.tx.send_modify(|current| {
            version = current.version + 1;
            *current = Arc::new(JournalSnapshot {
                version,
                trades,
                rules,
            });
        });
        log::debug!("Published journal snapshot v{}", version);
        version
    }

    pub fn publish_from<S: RecordStore + ?Sized>(&self, store: &S) -> Result<u64> {
        let trades = store.list_trades()?;
        let rules = store.get_rules()?;
        Ok(self.publish(trades, rules))
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<JournalSnapshot>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Arc<JournalSnapshot> {
        self.tx.borrow().clone()
    }
}

/// Everything the dashboard renders, derived from a single snapshot.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub version: u64,
    pub stats: Vec<TradeStats>,
    pub daily: Vec<DailySummary>,
    pub summary: JournalSummary,
    pub equity: Vec<EquityCurvePoint>,
    pub discipline: DisciplineCheck,
}

impl DashboardView {
    pub fn compute(snapshot: &JournalSnapshot, today: &str) -> Self {
        let trades = &snapshot.trades;
        Self {
            version: snapshot.version,
            stats: analytics::stats_all(trades, &snapshot.rules),
            daily: analytics::group_by_date(trades),
            summary: analytics::summarize(trades),
            equity: analytics::equity_curve(trades),
            discipline: analytics::check_discipline(trades, today, &snapshot.rules),
        }
    }
}

pub struct DashboardWatcher;

impl DashboardWatcher {
    /// Recompute the dashboard from scratch for every snapshot on `feed`.
    ///
    /// Must be called inside a tokio runtime. The task ends once the feed's sender is
    /// dropped or every view receiver is gone.
    pub fn spawn<F>(
        mut feed: watch::Receiver<Arc<JournalSnapshot>>,
        today: F,
    ) -> (JoinHandle<()>, watch::Receiver<Arc<DashboardView>>)
    where
        F: Fn() -> String + Send + 'static,
    {
        let initial = {
            let snapshot = feed.borrow_and_update().clone();
            Arc::new(DashboardView::compute(&snapshot, &today()))
        };
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            while feed.changed().await.is_ok() {
                let snapshot = feed.borrow_and_update().clone();
                let view = DashboardView::compute(&snapshot, &today());
                log::debug!(
                    "Recomputed dashboard v{}: {} trade(s), status {}",
                    view.version,
                    snapshot.trades.len(),
                    view.discipline.status
                );
                if tx.send(Arc::new(view)).is_err() {
                    break;
                }
            }
            log::info!("Dashboard watcher stopped");
        });

        (handle, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::trade;
    use crate::models::TradingStatus;

    fn today() -> String {
        "2024-01-02".to_string()
    }

    #[tokio::test]
    async fn test_each_snapshot_is_recomputed_from_scratch() {
        let feed = SnapshotFeed::new();
        let (handle, mut views) = DashboardWatcher::spawn(feed.subscribe(), today);
        assert!(views.borrow().stats.is_empty());

        let rules = DisciplineRules { max_daily_loss_percent: 5.0, daily_profit_target_percent: 10.0 };
        let first = vec![trade(1, 1000.0, 50.0, "2024-01-02")];
        assert_eq!(feed.publish(first, rules), 1);

        views.changed().await.unwrap();
        {
            let view = views.borrow_and_update();
            assert_eq!(view.version, 1);
            assert_eq!(view.stats[0].total_balance, 1050.0);
            assert_eq!(view.discipline.status, TradingStatus::Continue);
        }

        // Replacement drops the first trade entirely.
        let replaced = vec![trade(7, 1000.0, -60.0, "2024-01-02")];
        assert_eq!(feed.publish(replaced, rules), 2);

        views.changed().await.unwrap();
        {
            let view = views.borrow_and_update();
            assert_eq!(view.version, 2);
            assert_eq!(view.stats.len(), 1);
            assert_eq!(view.stats[0].total_balance, 940.0);
            assert_eq!(view.discipline.status, TradingStatus::MaxLoss);
            assert_eq!(view.summary.total_trades, 1);
        }

        drop(feed);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_from_store() {
        let store = crate::store::MemoryStore::with_trades(vec![
            trade(1, 1000.0, 10.0, "2024-01-01"),
            trade(2, 1010.0, 20.0, "2024-01-02"),
        ]);
        let feed = SnapshotFeed::new();

        assert_eq!(feed.publish_from(&store).unwrap(), 1);
        let snapshot = feed.current();
        assert_eq!(snapshot.trades.len(), 2);
        assert_eq!(snapshot.rules, DisciplineRules::default());

        let view = DashboardView::compute(&snapshot, &today());
        assert_eq!(view.daily.len(), 2);
        assert_eq!(view.equity[1].cumulative_pnl, 30.0);
        assert_eq!(view.discipline.daily_profit_loss, 20.0);
    }
}
