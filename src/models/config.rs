use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Meal generation endpoint (POST)
    #[serde(default = "default_generation_url")]
    pub generation_url: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Safety-net re-check period for the quota record (seconds, at most 60)
    #[serde(default = "default_recheck_interval")]
    pub quota_recheck_interval: u64,

    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            generation_url: default_generation_url(),
            request_timeout: default_request_timeout(),
            quota_recheck_interval: default_recheck_interval(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }

    pub fn recheck_interval(&self) -> Duration {
        Duration::from_secs(self.quota_recheck_interval.clamp(1, 60))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_generation_url() -> String {
    "http://127.0.0.1:54321/functions/v1/generate-meal".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_recheck_interval() -> u64 {
    60
}
