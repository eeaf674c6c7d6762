use anyhow::{Result, anyhow};
use std::path::Path;

/// Maximum size per uploaded file: 10 MB
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Accepted upload MIME types
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Reject a file before anything is persisted: unknown mime type or a body
/// over the per-file cap.
pub fn validate_upload(
    original_name: &str,
    content_type: &str,
    size: usize,
    max_file_size: usize,
) -> Result<()> {
    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(anyhow!(
            "Invalid file type '{}' for '{}'. Only JPEG, PNG and WebP are allowed.",
            content_type,
            original_name
        ));
    }
    if size > max_file_size {
        return Err(anyhow!(
            "File '{}' exceeds the maximum size of {} bytes",
            original_name,
            max_file_size
        ));
    }
    Ok(())
}

/// Extension for the generated storage name: taken from the original upload
/// name when it carries a plausible one, otherwise derived from the mime
/// type.
pub fn storage_extension(original_name: &str, content_type: &str) -> String {
    if let Some(ext) = Path::new(original_name).extension().and_then(|e| e.to_str()) {
        if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return ext.to_ascii_lowercase();
        }
    }
    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/webp" => "webp".to_string(),
        _ => "bin".to_string(),
    }
}
