use tracing::info;

use crate::inference::anthropic::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::inference::{AnthropicProvider, InferenceProvider, SimulatedProvider};

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Backend configuration, read once when the provider is built.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_VAR).ok(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// A credential that is present and not blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn has_credential(&self) -> bool {
        self.credential().is_some()
    }
}

/// Real backend when a credential is configured, the simulator otherwise.
pub fn build_provider(config: &ProviderConfig) -> Box<dyn InferenceProvider> {
    match config.credential() {
        Some(key) => {
            info!(model = %config.model, "using Anthropic provider");
            Box::new(
                AnthropicProvider::new(key)
                    .with_model(&config.model)
                    .with_base_url(&config.base_url),
            )
        }
        None => {
            info!("No {API_KEY_VAR} found, using simulated provider");
            Box::new(SimulatedProvider::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::simulator::SIMULATOR_MODEL_ID;

    #[test]
    fn missing_or_blank_key_selects_simulator() {
        for config in [
            ProviderConfig::default(),
            ProviderConfig::default().with_api_key(""),
            ProviderConfig::default().with_api_key("  \t"),
        ] {
            assert!(!config.has_credential());
            assert_eq!(build_provider(&config).model_id(), SIMULATOR_MODEL_ID);
        }
    }

    #[test]
    fn key_selects_real_backend() {
        let config = ProviderConfig::default().with_api_key(" sk-test ");
        assert_eq!(config.credential(), Some("sk-test"));
        assert_eq!(build_provider(&config).model_id(), "claude-haiku-4-5");
    }
}
