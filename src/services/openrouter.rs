use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::VisionModel;
use crate::models::DecodedImage;

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// OpenRouter (OpenAI-compatible) chat completions client.
pub struct OpenRouterClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenRouter HTTP client")?;

        Ok(Self {
            api_key,
            model,
            client,
        })
    }

    fn build_request(&self, prompt: &str, image: &DecodedImage) -> ChatRequest {
        let data_url = format!(
            "data:{};base64,{}",
            image.mime_type,
            general_purpose::STANDARD.encode(&image.bytes)
        );

        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    content_type: "image_url".to_string(),
                    image_url: ImageData { url: data_url },
                },
            ],
        }];

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: 2048,
        }
    }
}

#[async_trait::async_trait]
impl VisionModel for OpenRouterClient {
    async fn describe(&self, prompt: &str, image: &DecodedImage) -> Result<String> {
        let request = self.build_request(prompt, image);
        let started = Instant::now();

        log::info!("🤖 Sending request to OpenRouter with model: {}", self.model);

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-Title", "Pantry Lens")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    log::error!("⏱️ OpenRouter request timed out after {:?}", started.elapsed());
                }
                anyhow::Error::new(e).context("OpenRouter request failed")
            })?;

        let status = response.status();
        log::info!("📥 OpenRouter response status: {} in {:?}", status, started.elapsed());

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ OpenRouter API error response: {}", error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to decode OpenRouter response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .context("OpenRouter returned no choices")?
            .message
            .content
            .unwrap_or_default();

        log::debug!("💬 OpenRouter response content: {}", content);
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
