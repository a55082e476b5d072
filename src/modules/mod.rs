pub mod config;
pub mod generation;
pub mod lifecycle;
pub mod logger;
pub mod quota;
pub mod quota_monitor;
pub mod storage;

// Re-export the main types at the top of the modules namespace
pub use generation::GenerationController;
pub use lifecycle::{AppPhase, LifecycleHub, LifecycleSource};
pub use quota::QuotaStore;
pub use quota_monitor::QuotaMonitor;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
