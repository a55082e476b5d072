pub mod config;
pub mod generation;
pub mod quota;

pub use config::{AppConfig, UpstreamProxyConfig};
pub use generation::{
    GeneratedMeal, GenerationOutcome, GenerationPayload, GenerationRequest, GenerationStatus,
    MacroTargets, QuickSuggestion,
};
pub use quota::QuotaState;
