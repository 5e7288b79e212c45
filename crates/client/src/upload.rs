//! Image upload: local validation, `POST /upload`, then a generation bump.

use std::path::Path;
use std::sync::Arc;

use skyscan_core::error::CoreError;
use skyscan_core::models::UploadReceipt;
use skyscan_core::upload::{self, UploadFormat};

use crate::backend::DetectionBackend;
use crate::error::ClientError;
use crate::refresh::{Generation, RefreshCoordinator};

/// A file that passed validation. Only constructible through the
/// validating constructors, so the backend never sees an unchecked file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    filename: String,
    format: UploadFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let filename = filename.into();
        let format = upload::validate(&filename, &bytes)?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    /// Read and validate a file. The extension and the size limit (from
    /// file metadata) are checked first, so rejected files are never loaded.
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        upload::validate_extension(&filename)?;

        let metadata = tokio::fs::metadata(path).await?;
        upload::validate_size(metadata.len())?;

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_bytes(filename, bytes)?)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn format(&self) -> UploadFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// The single writer of the refresh generation.
pub struct UploadService {
    backend: Arc<dyn DetectionBackend>,
    refresh: RefreshCoordinator,
}

/// Receipt of a successful upload and the generation it produced.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub receipt: UploadReceipt,
    pub generation: Generation,
}

impl UploadService {
    pub fn new(backend: Arc<dyn DetectionBackend>, refresh: RefreshCoordinator) -> Self {
        Self { backend, refresh }
    }

    /// Send a validated file. On success the refresh generation advances
    /// exactly once; on failure it is left alone.
    pub async fn upload(&self, upload: &ImageUpload) -> Result<UploadOutcome, ClientError> {
        let receipt = match self.backend.upload_image(upload).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(filename = upload.filename(), error = %e, "Upload rejected");
                return Err(e.into());
            }
        };

        let generation = self.refresh.advance();
        tracing::info!(
            filename = upload.filename(),
            detections = receipt.detections_count,
            %generation,
            "Upload accepted",
        );
        Ok(UploadOutcome {
            receipt,
            generation,
        })
    }

    /// Validate and upload a file from disk.
    pub async fn upload_path(&self, path: &Path) -> Result<UploadOutcome, ClientError> {
        let upload = ImageUpload::from_path(path).await?;
        self.upload(&upload).await
    }
}
