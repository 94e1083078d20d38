pub mod decoder;
pub mod gemini; // Google Gemini vision API
pub mod normalizer;
pub mod openrouter; // OpenRouter AI service
pub mod postprocess;
pub mod vision;

pub use decoder::decode_upload_blocking;
pub use gemini::GeminiClient;
pub use normalizer::normalize;
pub use openrouter::OpenRouterClient;
pub use postprocess::{attraction_verdict, sort_by_freshness};
pub use vision::{build_model, VisionModel};
