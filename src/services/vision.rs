use anyhow::Result;
use std::sync::Arc;

use crate::config::{Config, Provider};
use crate::models::DecodedImage;
use crate::services::{GeminiClient, OpenRouterClient};

/// Trait for hosted vision models (Gemini, OpenRouter, etc.)
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    /// Send one prompt plus image and return the model's text answer.
    async fn describe(&self, prompt: &str, image: &DecodedImage) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Build the gateway client selected by the configuration.
pub fn build_model(config: &Config) -> Result<Arc<dyn VisionModel>> {
    let model: Arc<dyn VisionModel> = match config.provider {
        Provider::Gemini => Arc::new(GeminiClient::new(
            config.api_key.clone(),
            config.model.clone(),
            config.timeout,
        )?),
        Provider::OpenRouter => Arc::new(OpenRouterClient::new(
            config.api_key.clone(),
            config.model.clone(),
            config.timeout,
        )?),
    };
    Ok(model)
}
