//! Shared fixtures for client integration tests.
//!
//! [`FakeBackend`] is an in-memory [`DetectionBackend`] that paginates and
//! filters like the real service, with scripted latency and failures.
//! [`spawn_server`] runs an axum router on an ephemeral port for tests of
//! the reqwest backend.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use skyscan_client::backend::DetectionBackend;
use skyscan_client::error::{FetchError, MutationError};
use skyscan_client::upload::ImageUpload;
use skyscan_core::filter::AlertFilters;
use skyscan_core::filter::AckFilter;
use skyscan_core::models::{
    Alert, BoundingBox, Detection, HealthStatus, Image, ImageDetail, ModelInfo, Page, Severity,
    StatisticsSnapshot, UploadReceipt,
};
use skyscan_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn ts(minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap()
}

pub fn image(id: DbId, detection_count: u32) -> Image {
    Image {
        id,
        filename: Some(format!("{id}_scene.png")),
        original_filename: format!("scene_{id}.png"),
        upload_timestamp: ts(0),
        file_size: Some(2048),
        detection_processed: true,
        detection_count,
    }
}

pub fn detection(id: DbId, class_name: &str) -> Detection {
    Detection {
        id,
        class_name: class_name.to_string(),
        confidence: 0.93,
        bounding_box: BoundingBox {
            x_min: 10.0,
            y_min: 20.0,
            x_max: 110.0,
            y_max: 80.0,
        },
        detection_timestamp: ts(1),
    }
}

pub fn alert(id: DbId, severity: Severity) -> Alert {
    Alert {
        id,
        detection_id: id,
        alert_type: "object_detected".to_string(),
        message: format!("TRUCK detected in scene_{id}.png"),
        severity,
        alert_timestamp: ts(2),
        acknowledged: false,
        acknowledged_timestamp: None,
    }
}

/// Image with `n` truck detections, each with a high alert.
pub fn detail(id: DbId, n: u32) -> ImageDetail {
    let base = id * 100;
    ImageDetail {
        image: image(id, n),
        detections: (0..n as DbId).map(|i| detection(base + i, "truck")).collect(),
        alerts: (0..n as DbId).map(|i| alert(base + i, Severity::High)).collect(),
    }
}

// ---------------------------------------------------------------------------
// FakeBackend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeState {
    images: Vec<ImageDetail>,
    alerts: Vec<Alert>,
    statistics: StatisticsSnapshot,
    detail_delays: HashMap<DbId, Duration>,
    failing_details: HashSet<DbId>,
    image_list_delays: VecDeque<Duration>,
    fail_image_list: bool,
    fail_acknowledge: bool,
    upload_detections: u32,
    calls: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

fn paginate<T: Clone>(items: &[T], page: u32, per_page: u32) -> Page<T> {
    let per_page = per_page.max(1) as usize;
    let total_pages = items.len().div_ceil(per_page) as u32;
    let start = (page.max(1) as usize - 1) * per_page;
    let slice = items.iter().skip(start).take(per_page).cloned().collect();
    Page::new(slice, total_pages)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(details: Vec<ImageDetail>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().images = details;
        backend
    }

    pub fn with_alerts(alerts: Vec<Alert>) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().alerts = alerts;
        backend
    }

    pub fn set_statistics(&self, statistics: StatisticsSnapshot) {
        self.state.lock().unwrap().statistics = statistics;
    }

    pub fn delay_detail(&self, image_id: DbId, delay: Duration) {
        self.state.lock().unwrap().detail_delays.insert(image_id, delay);
    }

    pub fn fail_detail(&self, image_id: DbId) {
        self.state.lock().unwrap().failing_details.insert(image_id);
    }

    /// Delay the next `list_images` call only.
    pub fn delay_next_image_list(&self, delay: Duration) {
        self.state.lock().unwrap().image_list_delays.push_back(delay);
    }

    pub fn set_fail_image_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_image_list = fail;
    }

    pub fn set_fail_acknowledge(&self, fail: bool) {
        self.state.lock().unwrap().fail_acknowledge = fail;
    }

    /// Detections the detector "finds" in the next upload.
    pub fn set_upload_detections(&self, n: u32) {
        self.state.lock().unwrap().upload_detections = n;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl DetectionBackend for FakeBackend {
    async fn list_images(&self, page: u32, per_page: u32) -> Result<Page<Image>, FetchError> {
        self.record(format!("list_images page={page} per_page={per_page}"));
        let delay = self.state.lock().unwrap().image_list_delays.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.fail_image_list {
            return Err(FetchError::Status {
                status: 500,
                message: "database is locked".into(),
            });
        }
        let images: Vec<Image> = state.images.iter().map(|d| d.image.clone()).collect();
        Ok(paginate(&images, page, per_page))
    }

    async fn get_image_detail(&self, image_id: DbId) -> Result<ImageDetail, FetchError> {
        self.record(format!("get_image_detail {image_id}"));
        let delay = self.state.lock().unwrap().detail_delays.get(&image_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.lock().unwrap();
        if state.failing_details.contains(&image_id) {
            return Err(FetchError::Transport("connection reset".into()));
        }
        state
            .images
            .iter()
            .find(|d| d.image.id == image_id)
            .cloned()
            .ok_or(FetchError::Status {
                status: 404,
                message: "Image not found".into(),
            })
    }

    async fn list_alerts(
        &self,
        page: u32,
        per_page: u32,
        filters: &AlertFilters,
    ) -> Result<Page<Alert>, FetchError> {
        let query: Vec<String> = filters
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        self.record(format!(
            "list_alerts page={page} per_page={per_page} [{}]",
            query.join(",")
        ));

        let state = self.state.lock().unwrap();
        let matching: Vec<Alert> = state
            .alerts
            .iter()
            .filter(|a| filters.severity().map_or(true, |s| a.severity == s))
            .filter(|a| match filters.acknowledged() {
                Some(AckFilter::Acknowledged) => a.acknowledged,
                Some(AckFilter::Unacknowledged) => !a.acknowledged,
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(&matching, page, per_page))
    }

    async fn acknowledge_alert(&self, alert_id: DbId) -> Result<(), MutationError> {
        self.record(format!("acknowledge {alert_id}"));
        let mut state = self.state.lock().unwrap();
        if state.fail_acknowledge {
            return Err(MutationError::Acknowledge {
                alert_id,
                source: FetchError::Status {
                    status: 500,
                    message: "database is locked".into(),
                },
            });
        }
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(MutationError::Acknowledge {
                alert_id,
                source: FetchError::Status {
                    status: 404,
                    message: "Alert not found".into(),
                },
            })?;
        alert.acknowledged = true;
        alert.acknowledged_timestamp = Some(alert.alert_timestamp.max(Utc::now()));
        Ok(())
    }

    async fn list_detections(
        &self,
        page: u32,
        per_page: u32,
        class_name: Option<&str>,
    ) -> Result<Page<Detection>, FetchError> {
        self.record(format!("list_detections page={page} class={class_name:?}"));
        let state = self.state.lock().unwrap();
        let detections: Vec<Detection> = state
            .images
            .iter()
            .flat_map(|d| d.detections.iter().cloned())
            .filter(|d| class_name.map_or(true, |c| d.class_name == c))
            .collect();
        Ok(paginate(&detections, page, per_page))
    }

    async fn get_statistics(&self) -> Result<StatisticsSnapshot, FetchError> {
        self.record("get_statistics".to_string());
        Ok(self.state.lock().unwrap().statistics.clone())
    }

    async fn upload_image(&self, upload: &ImageUpload) -> Result<UploadReceipt, FetchError> {
        self.record(format!("upload {}", upload.filename()));
        let mut state = self.state.lock().unwrap();
        let id = state.images.len() as DbId + 1;
        let n = state.upload_detections;
        let mut new_detail = detail(id, n);
        new_detail.image.original_filename = upload.filename().to_string();
        new_detail.image.file_size = Some(upload.size() as u64);
        // Newest first, as the gallery shows it.
        state.images.insert(0, new_detail);

        Ok(UploadReceipt {
            detections_count: n,
            success: Some(true),
            image_id: Some(id),
            filename: Some(upload.filename().to_string()),
            detections: Vec::new(),
            alerts: Vec::new(),
            timestamp: Some(Utc::now()),
        })
    }

    async fn health(&self) -> Result<HealthStatus, FetchError> {
        Ok(HealthStatus {
            status: "healthy".into(),
            timestamp: Some(Utc::now()),
            model_path: Some("models/best.pt".into()),
        })
    }

    async fn model_info(&self) -> Result<ModelInfo, FetchError> {
        Ok(ModelInfo {
            model_path: "models/best.pt".into(),
            classes: [("0".to_string(), "truck".to_string())].into_iter().collect(),
            num_classes: 1,
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

/// Serve `router` on `127.0.0.1:<ephemeral>` and return the bound address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Poll `check` until it returns true or a second passes.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// A JPEG-signed buffer of `size` bytes.
pub fn jpeg_bytes(size: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; size];
    bytes[..4].copy_from_slice(b"\xFF\xD8\xFF\xE0");
    bytes
}
