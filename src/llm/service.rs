//! Provider factory: turns the `llm` config section into a live backend.

use crate::llm::gemini::GeminiBackend;
use crate::llm::llm_config::{LlmConfig, LlmProviderConfig};
use crate::llm::openai::OpenAiBackend;
use crate::llm::provider::ModelBackend;
use std::sync::Arc;
use std::time::Duration;

/// Build the active backend. Falls back to the first enabled provider,
/// then to the first listed one, then to an unkeyed Gemini backend (whose
/// calls fail and therefore resolve to the fallback reply).
pub fn build_backend(config: &LlmConfig) -> Arc<dyn ModelBackend> {
    let active_id = &config.active_provider;

    let provider_cfg = config
        .providers
        .iter()
        .find(|p| p.id == *active_id)
        .or_else(|| config.providers.iter().find(|p| p.enabled))
        .or_else(|| config.providers.first());

    match provider_cfg {
        Some(cfg) => build_from_provider_config(cfg),
        None => {
            tracing::warn!("no provider configured, falling back to Gemini defaults");
            Arc::new(GeminiBackend::new(String::new(), None, None))
        }
    }
}

fn build_from_provider_config(cfg: &LlmProviderConfig) -> Arc<dyn ModelBackend> {
    let api_key = cfg.resolve_api_key().unwrap_or_default();
    if api_key.is_empty() {
        tracing::warn!(provider = %cfg.id, "no API key resolved; replies will use the fallback");
    }
    let timeout = Duration::from_secs(cfg.timeout_secs);

    match cfg.provider_type.as_str() {
        "openai" => {
            tracing::info!(
                provider = %cfg.id,
                base_url = cfg.base_url.as_deref().unwrap_or(crate::llm::openai::DEFAULT_BASE_URL),
                model = cfg.model.as_deref().unwrap_or(crate::llm::openai::DEFAULT_MODEL),
                "initializing OpenAI-compatible backend"
            );
            Arc::new(
                OpenAiBackend::new(api_key, cfg.base_url.clone(), cfg.model.clone())
                    .with_id(cfg.id.clone())
                    .with_temperature(cfg.temperature)
                    .with_max_retries(cfg.max_retries)
                    .with_timeout(timeout),
            )
        }
        other => {
            if other != "gemini" {
                tracing::warn!(provider_type = other, "unknown provider type, using Gemini");
            }
            tracing::info!(
                provider = %cfg.id,
                model = cfg.model.as_deref().unwrap_or(crate::llm::gemini::DEFAULT_MODEL),
                "initializing Gemini backend"
            );
            Arc::new(
                GeminiBackend::new(api_key, cfg.base_url.clone(), cfg.model.clone())
                    .with_id(cfg.id.clone())
                    .with_temperature(cfg.temperature)
                    .with_max_retries(cfg.max_retries)
                    .with_timeout(timeout),
            )
        }
    }
}
