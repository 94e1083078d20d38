use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use super::prompts::{ATTRACTION_PROMPT, FRESHNESS_PROMPT, PANTRY_PROMPT};
use crate::error::{AnalysisError, ErrorStyle};
use crate::models::Upload;
use crate::services::{attraction_verdict, decode_upload_blocking, normalize, sort_by_freshness, VisionModel};

/// The three things an uploaded image can be analyzed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCase {
    Pantry,
    Freshness,
    Attraction,
}

impl UseCase {
    pub fn prompt(&self) -> &'static str {
        match self {
            UseCase::Pantry => PANTRY_PROMPT,
            UseCase::Freshness => FRESHNESS_PROMPT,
            UseCase::Attraction => ATTRACTION_PROMPT,
        }
    }

    pub fn error_style(&self) -> ErrorStyle {
        match self {
            UseCase::Pantry | UseCase::Freshness => ErrorStyle::Error,
            UseCase::Attraction => ErrorStyle::Detail,
        }
    }

    /// Whether the part's declared content type must be `image/*`.
    fn requires_image_content_type(&self) -> bool {
        matches!(self, UseCase::Attraction)
    }

    /// Shape a normalized payload into the response body for this use case.
    pub fn post_process(&self, payload: Value) -> Result<Value, AnalysisError> {
        match self {
            UseCase::Pantry => Ok(json!({ "recipes": payload })),
            UseCase::Freshness => Ok(sort_by_freshness(payload)?),
            UseCase::Attraction => {
                let verdict = attraction_verdict(&payload);
                log::info!("🏛️ Attraction {}", verdict);
                Ok(payload)
            }
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UseCase::Pantry => "analyze-pantry",
            UseCase::Freshness => "check-freshness",
            UseCase::Attraction => "analyze-attraction",
        };
        write!(f, "{}", s)
    }
}

/// Runs an upload through decode, model, normalization and post-processing.
pub struct Analyzer {
    model: Arc<dyn VisionModel>,
    max_upload_bytes: usize,
}

impl Analyzer {
    pub fn new(model: Arc<dyn VisionModel>, max_upload_bytes: usize) -> Self {
        Self {
            model,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub async fn analyze(&self, use_case: UseCase, upload: Upload) -> Result<Value, AnalysisError> {
        log::info!(
            "📨 {} request: file={:?}, content_type={:?}, {} bytes",
            use_case,
            upload.file_name,
            upload.content_type,
            upload.bytes.len()
        );

        self.check_upload(use_case, &upload)?;
        let image = decode_upload_blocking(upload).await?;
        log::debug!("🖼️ Decoded {:?} image {}x{}", image.format, image.width, image.height);

        let started = Instant::now();
        let reply = self
            .model
            .describe(use_case.prompt(), &image)
            .await
            .map_err(AnalysisError::UpstreamUnavailable)?;
        log::info!(
            "✅ {} answered by {} in {:?} ({} chars)",
            use_case,
            self.model.model_name(),
            started.elapsed(),
            reply.len()
        );

        let payload = normalize(&reply)?;
        use_case.post_process(payload)
    }

    fn check_upload(&self, use_case: UseCase, upload: &Upload) -> Result<(), AnalysisError> {
        if use_case.requires_image_content_type() {
            let is_image = upload
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"));
            if !is_image {
                return Err(AnalysisError::InvalidInput("File must be an image".to_string()));
            }
        }

        if upload.bytes.len() > self.max_upload_bytes {
            return Err(AnalysisError::InvalidInput(format!(
                "Image too large. Max size is {} bytes",
                self.max_upload_bytes
            )));
        }

        Ok(())
    }
}
