use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

use crate::models::QuotaState;
use crate::modules::logger;
use crate::modules::storage::KeyValueStore;
use crate::utils::clock::Clock;

pub(crate) const QUOTA_STORAGE_KEY: &str = "generation-limit-reached";

/// Local mirror of the daily generation limit
///
/// Owns both the persisted record and the in-memory copy. Storage failures
/// are logged and degrade to the empty state; no method here returns an error.
pub struct QuotaStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<QuotaState>,
    // Persisted and in-memory copies change together under this lock
    write_lock: Mutex<()>,
}

impl QuotaStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(QuotaState::new());
        Self {
            storage,
            clock,
            state,
            write_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> QuotaState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QuotaState> {
        self.state.subscribe()
    }

    pub fn today(&self) -> String {
        self.clock.today()
    }

    /// Whether generation should be blocked right now
    pub fn is_limited(&self) -> bool {
        let state = self.state.borrow();
        state.reached && state.is_current(&self.clock.today())
    }

    /// Limit reached today and the user has not been told yet
    pub fn should_show_alert(&self) -> bool {
        self.is_limited() && !self.state.borrow().alert_shown
    }

    /// Reload the persisted record, dropping it if it is stale or unreadable
    pub fn refresh(&self) {
        let _guard = self.lock();
        let today = self.clock.today();

        let next = match self.storage.get(QUOTA_STORAGE_KEY) {
            Ok(None) => QuotaState::new(),
            Ok(Some(raw)) => match serde_json::from_str::<QuotaState>(&raw) {
                Ok(record) if record.is_current(&today) => record,
                Ok(record) => {
                    logger::log_info(&format!(
                        "Generation limit record from {:?} is stale (today {}), discarding",
                        record.date, today
                    ));
                    self.remove_record();
                    QuotaState::new()
                }
                Err(e) => {
                    logger::log_warn(&format!(
                        "Failed to parse generation limit record, discarding: {}",
                        e
                    ));
                    self.remove_record();
                    QuotaState::new()
                }
            },
            Err(e) => {
                logger::log_warn(&format!(
                    "Failed to read generation limit record, assuming no limit: {}",
                    e
                ));
                QuotaState::new()
            }
        };

        self.publish(next);
    }

    /// Record that the service refused generation for today
    pub fn mark_reached(&self) {
        let _guard = self.lock();
        let record = QuotaState::reached_on(&self.clock.today());
        self.write_record(&record);
        tracing::info!("Daily generation limit reached for {:?}", record.date);
        self.publish(record);
    }

    /// Forget any limit record (logout, plan upgrade, day rollover)
    pub fn clear(&self) {
        let _guard = self.lock();
        self.clear_locked();
    }

    /// Clears the held record once its day has passed. Returns true if cleared.
    pub fn expire_if_stale(&self) -> bool {
        let _guard = self.lock();
        let held = self.state.borrow().date.clone();
        match held {
            Some(day) if day != self.clock.today() => {
                logger::log_info(&format!(
                    "Day rolled over since {}, clearing generation limit",
                    day
                ));
                self.clear_locked();
                true
            }
            _ => false,
        }
    }

    /// Note that the limit notice was displayed for today's record
    pub fn acknowledge_alert(&self) {
        let _guard = self.lock();
        let mut record = self.current();
        if !record.reached || record.alert_shown || !record.is_current(&self.clock.today()) {
            return;
        }
        record.alert_shown = true;
        self.write_record(&record);
        self.publish(record);
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn clear_locked(&self) {
        self.remove_record();
        self.publish(QuotaState::new());
    }

    fn publish(&self, next: QuotaState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }

    fn write_record(&self, record: &QuotaState) {
        let result = serde_json::to_string(record)
            .map_err(crate::error::AppError::from)
            .and_then(|raw| self.storage.set(QUOTA_STORAGE_KEY, &raw));
        if let Err(e) = result {
            logger::log_warn(&format!("Failed to persist generation limit record: {}", e));
        }
    }

    fn remove_record(&self) {
        if let Err(e) = self.storage.remove(QUOTA_STORAGE_KEY) {
            logger::log_warn(&format!("Failed to remove generation limit record: {}", e));
        }
    }
}
