use image::ImageFormat;

use crate::error::AnalysisError;
use crate::models::{DecodedImage, Upload};

/// Check that an upload really is an image and work out its MIME type.
///
/// The format is sniffed from the bytes; the client's declared content type is
/// not trusted here.
pub fn decode_upload(upload: &Upload) -> Result<DecodedImage, AnalysisError> {
    if upload.bytes.is_empty() {
        return Err(AnalysisError::InvalidInput("Uploaded file is empty".to_string()));
    }

    let format = image::guess_format(&upload.bytes).map_err(|e| {
        log::warn!("⚠️ Unrecognized image format for {:?}: {}", upload.file_name, e);
        AnalysisError::InvalidInput("Uploaded file is not a supported image".to_string())
    })?;

    let img = image::load_from_memory_with_format(&upload.bytes, format).map_err(|e| {
        log::warn!("⚠️ Failed to decode {:?} as {:?}: {}", upload.file_name, format, e);
        AnalysisError::InvalidInput("Uploaded file could not be decoded as an image".to_string())
    })?;

    Ok(DecodedImage {
        bytes: upload.bytes.clone(),
        format,
        mime_type: mime_type(format),
        width: img.width(),
        height: img.height(),
    })
}

/// Decode on the blocking pool so large images do not stall the runtime.
pub async fn decode_upload_blocking(upload: Upload) -> Result<DecodedImage, AnalysisError> {
    tokio::task::spawn_blocking(move || decode_upload(&upload))
        .await
        .map_err(|e| AnalysisError::Internal(anyhow::anyhow!("image decode task failed: {}", e)))?
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        _ => "application/octet-stream",
    }
}
