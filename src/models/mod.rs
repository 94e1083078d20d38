use axum::body::Bytes;

/// A file part pulled out of a multipart request, before any validation.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,  // as declared by the client, not sniffed
    pub bytes: Bytes,
}

/// An upload that decoded successfully as an image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Bytes,
    pub format: image::ImageFormat,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// One perishable item as reported by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FreshnessEntry {
    pub name: String,
    pub days_left: f64,  // days before spoilage, negative if already spoiled
    pub confidence: Option<f64>,  // 0-100
    pub observation: Option<String>,
}

/// How a successfully parsed attraction reply should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttractionVerdict {
    Recognized,
    NotRecognized,  // model answered with the {"error": "..."} sentinel
}

impl std::fmt::Display for AttractionVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttractionVerdict::Recognized => "recognized",
            AttractionVerdict::NotRecognized => "not recognized",
        };
        write!(f, "{}", s)
    }
}
