//! reqwest implementation of [`DetectionBackend`].

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skyscan_core::filter::{AlertFilters, CLASS};
use skyscan_core::models::{
    Alert, AlertListResponse, Detection, DetectionListResponse, HealthStatus, Image,
    ImageDetail, ImageListResponse, ModelInfo, Page, StatisticsSnapshot, UploadReceipt,
};
use skyscan_core::types::DbId;
use skyscan_core::upload::UPLOAD_FIELD;

use crate::backend::DetectionBackend;
use crate::config::ClientConfig;
use crate::error::{FetchError, MutationError};
use crate::upload::ImageUpload;

/// HTTP client for a single detection backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
}

/// JSON error envelope the backend uses for every failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpBackend {
    /// Build a client whose every request is bounded by
    /// [`ClientConfig::request_timeout`].
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling, custom TLS).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        tracing::debug!(path, ?query, "GET");
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Pass a 2xx response through; turn anything else into
    /// [`FetchError::Status`] carrying the backend's `error` message.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(FetchError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a successful body. Decoding from text (rather than
    /// `Response::json`) keeps shape mismatches as [`FetchError::Decode`].
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn page_query(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
        vec![("page", page.to_string()), ("per_page", per_page.to_string())]
    }
}

#[async_trait]
impl DetectionBackend for HttpBackend {
    async fn list_images(&self, page: u32, per_page: u32) -> Result<Page<Image>, FetchError> {
        let body: ImageListResponse = self
            .get_json("/images", &Self::page_query(page, per_page))
            .await?;
        Ok(body.into())
    }

    async fn get_image_detail(&self, image_id: DbId) -> Result<ImageDetail, FetchError> {
        self.get_json(&format!("/images/{image_id}"), &[]).await
    }

    async fn list_alerts(
        &self,
        page: u32,
        per_page: u32,
        filters: &AlertFilters,
    ) -> Result<Page<Alert>, FetchError> {
        let mut query = Self::page_query(page, per_page);
        query.extend(filters.query_pairs());
        let body: AlertListResponse = self.get_json("/alerts", &query).await?;
        Ok(body.into())
    }

    async fn acknowledge_alert(&self, alert_id: DbId) -> Result<(), MutationError> {
        let wrap = |source: FetchError| MutationError::Acknowledge { alert_id, source };

        tracing::debug!(alert_id, "PUT acknowledge");
        let response = self
            .client
            .put(self.url(&format!("/alerts/{alert_id}/acknowledge")))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| wrap(e.into()))?;

        Self::ensure_success(response).await.map_err(wrap)?;
        Ok(())
    }

    async fn list_detections(
        &self,
        page: u32,
        per_page: u32,
        class_name: Option<&str>,
    ) -> Result<Page<Detection>, FetchError> {
        let mut query = Self::page_query(page, per_page);
        if let Some(class_name) = class_name.filter(|c| !c.is_empty()) {
            query.push((CLASS, class_name.to_string()));
        }
        let body: DetectionListResponse = self.get_json("/detections", &query).await?;
        Ok(body.into())
    }

    async fn get_statistics(&self) -> Result<StatisticsSnapshot, FetchError> {
        self.get_json("/statistics", &[]).await
    }

    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReceipt, FetchError> {
        let part = Part::bytes(upload.bytes().to_vec())
            .file_name(upload.filename().to_string())
            .mime_str(upload.format().mime_type())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::debug!(
            filename = upload.filename(),
            size = upload.size(),
            "POST upload",
        );
        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn health(&self) -> Result<HealthStatus, FetchError> {
        self.get_json("/health", &[]).await
    }

    async fn model_info(&self) -> Result<ModelInfo, FetchError> {
        self.get_json("/model-info", &[]).await
    }
}
