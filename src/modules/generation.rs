use reqwest::{Client, StatusCode};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{AppConfig, GeneratedMeal, GenerationOutcome, GenerationRequest};
use crate::modules::logger;
use crate::modules::quota::QuotaStore;

/// Drives meal generation requests against the remote service
///
/// A 403 from the service means today's quota is used up and is recorded in
/// the `QuotaStore`. Nothing is retried here; callers keep the trigger
/// disabled while a request is in flight.
pub struct GenerationController {
    client: Client,
    endpoint: String,
    quota: Arc<QuotaStore>,
}

impl GenerationController {
    pub fn new(client: Client, endpoint: impl Into<String>, quota: Arc<QuotaStore>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            quota,
        }
    }

    pub fn from_config(config: &AppConfig, quota: Arc<QuotaStore>) -> Self {
        Self::new(
            crate::utils::http::create_client(config),
            config.generation_url.clone(),
            quota,
        )
    }

    pub fn quota(&self) -> &Arc<QuotaStore> {
        &self.quota
    }

    pub async fn generate(
        &self,
        request: &mut GenerationRequest,
        auth_token: &str,
    ) -> GenerationOutcome {
        if !request.is_valid() {
            tracing::debug!("Generation {} rejected: empty description", request.id);
            return GenerationOutcome::InvalidInput;
        }

        request.begin();
        logger::log_info(&format!(
            "Submitting generation {} ({} suggestions, custom macros: {})",
            request.id,
            request.quick_suggestions.len(),
            request.include_custom_macros
        ));

        let outcome = match self.send(request, auth_token).await {
            Ok(meal) => {
                logger::log_info(&format!("Generation {} succeeded", request.id));
                GenerationOutcome::Succeeded { meal }
            }
            Err(AppError::Upstream { status, .. }) if status == StatusCode::FORBIDDEN.as_u16() => {
                logger::log_warn(&format!(
                    "Generation {} refused (403 Forbidden), daily limit reached",
                    request.id
                ));
                self.quota.mark_reached();
                GenerationOutcome::LimitExceeded
            }
            Err(e) => {
                logger::log_error(&format!("Generation {} failed: {}", request.id, e));
                GenerationOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        if let Some(status) = outcome.status() {
            request.finish(status);
        }
        outcome
    }

    async fn send(&self, request: &GenerationRequest, auth_token: &str) -> AppResult<GeneratedMeal> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(auth_token)
            .json(&request.to_payload())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice::<GeneratedMeal>(&bytes)?)
    }
}
