use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::modules::lifecycle::{AppPhase, LifecycleSource};
use crate::modules::quota::QuotaStore;

pub const MIN_RECHECK_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_RECHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Background re-validation of a `QuotaStore`
///
/// Aborts its tasks when dropped.
pub struct QuotaMonitor {
    tasks: Vec<JoinHandle<()>>,
}

impl QuotaMonitor {
    /// Refreshes the store once, then keeps it valid across foreground
    /// transitions and day rollovers.
    pub fn start(
        store: Arc<QuotaStore>,
        lifecycle: &dyn LifecycleSource,
        recheck_interval: Duration,
    ) -> Self {
        store.refresh();

        let period = recheck_interval.clamp(MIN_RECHECK_INTERVAL, MAX_RECHECK_INTERVAL);
        let foreground = tokio::spawn(watch_foreground(store.clone(), lifecycle.subscribe()));
        let rollover = tokio::spawn(watch_rollover(store, period));

        tracing::info!("Quota monitor started (recheck every {:?})", period);
        Self {
            tasks: vec![foreground, rollover],
        }
    }

    pub fn is_running(&self) -> bool {
        self.tasks.iter().any(|t| !t.is_finished())
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for QuotaMonitor {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn watch_foreground(
    store: Arc<QuotaStore>,
    mut events: tokio::sync::broadcast::Receiver<AppPhase>,
) {
    loop {
        match events.recv().await {
            Ok(AppPhase::Foreground) => store.refresh(),
            Ok(AppPhase::Background) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Missed {} lifecycle events, refreshing quota", skipped);
                store.refresh();
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn watch_rollover(store: Arc<QuotaStore>, period: Duration) {
    let mut state = store.subscribe();
    loop {
        // Park until a dated record is held
        let held = state.wait_for(|s| s.date.is_some()).await.is_ok();
        if !held {
            break;
        }

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            store.expire_if_stale();
            if store.current().date.is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::lifecycle::LifecycleHub;
    use crate::modules::quota::tests::CountingStore;
    use crate::modules::quota::QUOTA_STORAGE_KEY;
    use crate::modules::storage::KeyValueStore;
    use crate::utils::clock::FixedClock;

    fn setup(day: &str) -> (Arc<QuotaStore>, Arc<CountingStore>, Arc<FixedClock>) {
        let storage = Arc::new(CountingStore::default());
        let clock = Arc::new(FixedClock::new(day));
        let store = Arc::new(QuotaStore::new(storage.clone(), clock.clone()));
        (store, storage, clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_refreshes_once() {
        let (store, storage, _) = setup("2024-05-01");
        storage
            .set(
                QUOTA_STORAGE_KEY,
                r#"{"reached":true,"alertShown":false,"date":"2024-05-01"}"#,
            )
            .unwrap();

        let hub = LifecycleHub::new();
        let monitor = QuotaMonitor::start(store.clone(), &hub, Duration::from_secs(60));
        assert!(store.current().reached);
        assert!(monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreground_refreshes() {
        let (store, storage, clock) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let _monitor = QuotaMonitor::start(store.clone(), &hub, Duration::from_secs(60));
        store.mark_reached();

        // Another process instance wiped the record; background is ignored
        storage.remove(QUOTA_STORAGE_KEY).unwrap();
        hub.notify(AppPhase::Background);
        tokio::task::yield_now().await;
        assert!(store.current().reached);

        store.mark_reached();
        clock.set("2024-05-02");
        let mut rx = store.subscribe();
        hub.notify(AppPhase::Foreground);
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.date.is_none()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(storage.get(QUOTA_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_clears_after_midnight() {
        let (store, storage, clock) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let _monitor = QuotaMonitor::start(store.clone(), &hub, Duration::from_secs(60));

        store.mark_reached();
        tokio::time::sleep(Duration::from_secs(130)).await;
        assert!(store.current().reached);

        clock.set("2024-05-02");
        let mut rx = store.subscribe();
        tokio::time::timeout(Duration::from_secs(61), rx.wait_for(|s| s.date.is_none()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(storage.get(QUOTA_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_idle_without_record() {
        let (store, storage, _) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let _monitor = QuotaMonitor::start(store.clone(), &hub, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(storage.removes(), 0);
        assert_eq!(storage.sets(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_is_capped() {
        let (store, _, clock) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let _monitor = QuotaMonitor::start(store.clone(), &hub, Duration::from_secs(3600));

        store.mark_reached();
        clock.set("2024-05-02");
        let mut rx = store.subscribe();
        tokio::time::timeout(Duration::from_secs(61), rx.wait_for(|s| s.date.is_none()))
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_clears() {
        let (store, storage, clock) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let monitor = QuotaMonitor::start(store.clone(), &hub, Duration::ZERO);

        store.mark_reached();
        clock.set("2024-05-02");
        let mut rx = store.subscribe();
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.date.is_none()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(storage.get(QUOTA_STORAGE_KEY).unwrap(), None);
        assert!(monitor.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lagged_events_refresh() {
        let (store, storage, _) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let _monitor = QuotaMonitor::start(store.clone(), &hub, Duration::from_secs(60));
        store.mark_reached();

        // Only background events, more than the channel holds
        for _ in 0..20 {
            hub.notify(AppPhase::Background);
        }
        storage
            .set(
                QUOTA_STORAGE_KEY,
                r#"{"reached":true,"alertShown":true,"date":"2024-05-01"}"#,
            )
            .unwrap();

        let mut rx = store.subscribe();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| s.alert_shown))
            .await
            .unwrap()
            .unwrap();
        assert!(store.current().reached);
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes() {
        let (store, _, _) = setup("2024-05-01");
        let hub = LifecycleHub::new();
        let monitor = QuotaMonitor::start(store, &hub, Duration::from_secs(60));
        // The subscription is taken at start
        assert_eq!(hub.subscriber_count(), 1);

        monitor.shutdown();
        for _ in 0..10 {
            if hub.subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(hub.subscriber_count(), 0);
    }
}
