use anyhow::{bail, Context, Result};
use std::time::Duration;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-4-scout:free";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenRouter,
}

impl Provider {
    fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Provider::Gemini),
            "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }

    fn key_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    fn model_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_MODEL",
            Provider::OpenRouter => "OPENROUTER_MODEL",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => DEFAULT_GEMINI_MODEL,
            Provider::OpenRouter => DEFAULT_OPENROUTER_MODEL,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone)]
pub struct Config {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

// Keeps the API key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("bind_addr", &self.bind_addr)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get("MODEL_PROVIDER") {
            Some(name) => Provider::from_string(&name)
                .with_context(|| format!("Unknown MODEL_PROVIDER '{}' (expected gemini or openrouter)", name))?,
            None => Provider::Gemini,
        };

        let api_key = get(provider.key_var())
            .with_context(|| format!("{} must be set", provider.key_var()))?
            .trim()
            .to_string();

        let model = get(provider.model_var()).unwrap_or_else(|| provider.default_model().to_string());

        let timeout_secs = match get("MODEL_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("MODEL_TIMEOUT_SECS must be a whole number of seconds, got '{}'", v))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("MODEL_TIMEOUT_SECS must be greater than zero");
        }

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTES must be a byte count, got '{}'", v))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        if max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Config {
            provider,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
            bind_addr,
            max_upload_bytes,
        })
    }
}
