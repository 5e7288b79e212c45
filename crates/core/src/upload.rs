//! Local validation of image uploads.
//!
//! Runs before any network call. A file that fails here is never sent.

use image::ImageFormat;

use crate::error::CoreError;

/// Largest accepted upload: 50 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Multipart field name the backend reads the file from.
pub const UPLOAD_FIELD: &str = "image";

/// Filename extensions the backend accepts, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Image formats the detector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl UploadFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            UploadFormat::Png => "image/png",
            UploadFormat::Jpeg => "image/jpeg",
            UploadFormat::Gif => "image/gif",
            UploadFormat::Bmp => "image/bmp",
        }
    }
}

/// Reject anything over [`MAX_UPLOAD_BYTES`] or empty.
pub fn validate_size(size: u64) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("File is empty".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File size exceeds {}MB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Identify the image format from its leading bytes.
pub fn sniff_format(header: &[u8]) -> Result<UploadFormat, CoreError> {
    let unsupported =
        || CoreError::Validation("Please select a valid image file (PNG, JPG, GIF, BMP)".to_string());

    match image::guess_format(header).map_err(|_| unsupported())? {
        ImageFormat::Png => Ok(UploadFormat::Png),
        ImageFormat::Jpeg => Ok(UploadFormat::Jpeg),
        ImageFormat::Gif => Ok(UploadFormat::Gif),
        ImageFormat::Bmp => Ok(UploadFormat::Bmp),
        _ => Err(unsupported()),
    }
}

/// The backend decides by extension, so a valid image under any other
/// name would be rejected after upload.
pub fn validate_extension(filename: &str) -> Result<(), CoreError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "Invalid file type. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}

/// Full check of an in-memory file: name, size, then content.
pub fn validate(filename: &str, bytes: &[u8]) -> Result<UploadFormat, CoreError> {
    validate_extension(filename)?;
    validate_size(bytes.len() as u64)?;
    sniff_format(bytes)
}
