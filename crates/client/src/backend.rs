//! The resource contract consumed from the detection backend.
//!
//! Every view talks to an `Arc<dyn DetectionBackend>`, so the HTTP
//! implementation in [`crate::http`] can be swapped for an in-memory double.

use async_trait::async_trait;
use skyscan_core::filter::AlertFilters;
use skyscan_core::models::{
    Alert, Detection, HealthStatus, Image, ImageDetail, ModelInfo, Page, StatisticsSnapshot,
    UploadReceipt,
};
use skyscan_core::types::DbId;

use crate::error::{FetchError, MutationError};
use crate::upload::ImageUpload;

#[async_trait]
pub trait DetectionBackend: Send + Sync {
    /// `GET /images?page=&per_page=`
    async fn list_images(&self, page: u32, per_page: u32) -> Result<Page<Image>, FetchError>;

    /// `GET /images/{id}`: the image with its detections and alerts.
    async fn get_image_detail(&self, image_id: DbId) -> Result<ImageDetail, FetchError>;

    /// `GET /alerts?page=&per_page=[&severity=][&acknowledged=]`
    async fn list_alerts(
        &self,
        page: u32,
        per_page: u32,
        filters: &AlertFilters,
    ) -> Result<Page<Alert>, FetchError>;

    /// `PUT /alerts/{id}/acknowledge`. Not safe to retry unless the failure
    /// was a transport error.
    async fn acknowledge_alert(&self, alert_id: DbId) -> Result<(), MutationError>;

    /// `GET /detections?page=&per_page=[&class=]`
    async fn list_detections(
        &self,
        page: u32,
        per_page: u32,
        class_name: Option<&str>,
    ) -> Result<Page<Detection>, FetchError>;

    /// `GET /statistics`
    async fn get_statistics(&self) -> Result<StatisticsSnapshot, FetchError>;

    /// `POST /upload` as multipart. Only ever called with a validated file.
    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReceipt, FetchError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, FetchError>;

    /// `GET /model-info`
    async fn model_info(&self) -> Result<ModelInfo, FetchError>;
}
