use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Foreground,
    Background,
}

/// Observable application lifecycle
///
/// Subscribers are detached by dropping their receiver.
pub trait LifecycleSource: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<AppPhase>;
}

/// Fan-out of phase changes reported by the host platform
pub struct LifecycleHub {
    tx: broadcast::Sender<AppPhase>,
}

impl LifecycleHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Returns the number of subscribers that received the event
    pub fn notify(&self, phase: AppPhase) -> usize {
        tracing::debug!("Lifecycle phase changed: {:?}", phase);
        self.tx.send(phase).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LifecycleHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleSource for LifecycleHub {
    fn subscribe(&self) -> broadcast::Receiver<AppPhase> {
        self.tx.subscribe()
    }
}
