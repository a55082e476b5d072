use serde::{Deserialize, Serialize};

/// Daily generation limit record
///
/// Persisted as `{"reached": .., "alertShown": .., "date": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    pub reached: bool,
    #[serde(default)]
    pub alert_shown: bool,
    pub date: Option<String>, // YYYY-MM-DD, local time
}

impl QuotaState {
    pub fn new() -> Self {
        Self {
            reached: false,
            alert_shown: false,
            date: None,
        }
    }

    /// Record written when the service reports the quota is exhausted
    pub fn reached_on(day: &str) -> Self {
        Self {
            reached: true,
            alert_shown: false,
            date: Some(day.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
    }

    /// A record belongs to `day` only if it was stamped with it
    pub fn is_current(&self, day: &str) -> bool {
        self.date.as_deref() == Some(day)
    }
}

impl Default for QuotaState {
    fn default() -> Self {
        Self::new()
    }
}
