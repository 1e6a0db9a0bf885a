use anyhow::Result;
use std::sync::Arc;

use super::traits::Model;
use super::unified::UnifiedModel;
use crate::app::Config;

/// Factory for creating model instances using the unified LLM interface
pub struct ModelFactory;

impl ModelFactory {
    /// Create a model instance from a model identifier
    /// Format: provider/model (e.g., "gemini/gemini-2.0-flash-exp", "openai/gpt-4o")
    pub fn create(model_id: &str, config: &Config) -> Result<Arc<dyn Model>> {
        if !model_id.contains('/') {
            anyhow::bail!(
                "Invalid model format. Expected 'provider/model' (e.g., 'gemini/gemini-2.0-flash-exp')"
            );
        }

        // Environment variables win over the config file, as with the proxy itself
        let proxy_url = std::env::var("LITELLM_PROXY_URL")
            .unwrap_or_else(|_| config.litellm.proxy_url.clone());
        let master_key = std::env::var("LITELLM_MASTER_KEY")
            .ok()
            .or_else(|| config.litellm.master_key.clone());

        let model = UnifiedModel::new(model_id, &proxy_url, master_key)?;
        Ok(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_model_without_provider() {
        let result = ModelFactory::create("gemini-2.0-flash-exp", &Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_creates_model_with_provider() {
        let model = ModelFactory::create("gemini/gemini-2.0-flash-exp", &Config::default()).unwrap();
        assert_eq!(model.name(), "gemini/gemini-2.0-flash-exp");
    }
}
