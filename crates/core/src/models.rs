//! Wire and view models for images, detections, alerts and statistics.
//!
//! Field names follow the backend JSON contract. Every entity is immutable
//! from the client's perspective except [`Alert::acknowledged`], which only
//! the acknowledge mutation flips.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// Summary of an uploaded image as returned by the image listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: DbId,
    /// Server-side stored filename, absent on older backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub original_filename: String,
    #[serde(with = "crate::timestamp")]
    pub upload_timestamp: Timestamp,
    /// Size in bytes. The backend column is nullable.
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub detection_processed: bool,
    #[serde(default)]
    pub detection_count: u32,
}

impl Image {
    pub fn has_detections(&self) -> bool {
        self.detection_count > 0
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Axis-aligned box in pixel coordinates of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// `x_min <= x_max`, `y_min <= y_max`, and no negative coordinate.
    pub fn is_valid(&self) -> bool {
        self.x_min >= 0.0
            && self.y_min >= 0.0
            && self.x_min <= self.x_max
            && self.y_min <= self.y_max
    }
}

/// One object found in an image by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: DbId,
    pub class_name: String,
    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    #[serde(with = "crate::timestamp")]
    pub detection_timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// Alert severity. Anything the backend sends outside the three known
/// levels decodes as [`Severity::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    /// Never fails; unrecognised names map to [`Severity::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Unknown,
        })
    }
}

/// An alert raised for a single detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: DbId,
    /// Back-reference only; alerts are never navigated to their detection.
    pub detection_id: DbId,
    pub alert_type: String,
    pub message: String,
    pub severity: Severity,
    #[serde(with = "crate::timestamp")]
    pub alert_timestamp: Timestamp,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, with = "crate::timestamp::option")]
    pub acknowledged_timestamp: Option<Timestamp>,
}

impl Alert {
    /// `acknowledged` implies an acknowledgement timestamp no earlier than
    /// the alert itself; an unacknowledged alert carries no timestamp.
    pub fn is_acknowledgement_consistent(&self) -> bool {
        match (self.acknowledged, self.acknowledged_timestamp) {
            (true, Some(at)) => at >= self.alert_timestamp,
            (true, None) => false,
            (false, at) => at.is_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// One page of a server-paginated collection. Never cached across page or
/// filter changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page count as reported by the server; `0` for an empty collection.
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_pages: u32) -> Self {
        Self { items, total_pages }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `GET /images` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageListResponse {
    pub images: Vec<Image>,
    pub pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl From<ImageListResponse> for Page<Image> {
    fn from(body: ImageListResponse) -> Self {
        Page::new(body.images, body.pages)
    }
}

/// `GET /alerts` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertListResponse {
    pub alerts: Vec<Alert>,
    pub pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
}

impl From<AlertListResponse> for Page<Alert> {
    fn from(body: AlertListResponse) -> Self {
        Page::new(body.alerts, body.pages)
    }
}

/// `GET /detections` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionListResponse {
    pub detections: Vec<Detection>,
    pub pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
}

impl From<DetectionListResponse> for Page<Detection> {
    fn from(body: DetectionListResponse) -> Self {
        Page::new(body.detections, body.pages)
    }
}

// ---------------------------------------------------------------------------
// Image detail
// ---------------------------------------------------------------------------

/// An image together with its detections and their alerts.
///
/// Doubles as the `GET /images/{id}` body and as the client-side aggregate
/// built by the detail aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDetail {
    pub image: Image,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl ImageDetail {
    /// Detail with no detections or alerts, used when no fetch is made or
    /// the fetch failed.
    pub fn empty(image: Image) -> Self {
        Self {
            image,
            detections: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Whether the summary count agrees with the detections actually returned.
    pub fn detection_count_matches(&self) -> bool {
        self.image.detection_count as usize == self.detections.len()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Point-in-time aggregate counts from `GET /statistics`.
///
/// Maps keep the order the server emitted them in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total_images: u64,
    pub total_detections: u64,
    pub total_alerts: u64,
    pub unacknowledged_alerts: u64,
    #[serde(default)]
    pub class_statistics: IndexMap<String, u64>,
    #[serde(default)]
    pub severity_statistics: IndexMap<String, u64>,
}

// ---------------------------------------------------------------------------
// Upload, health, model info
// ---------------------------------------------------------------------------

/// Successful `POST /upload` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub detections_count: u32,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub image_id: Option<DbId>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub detections: Vec<serde_json::Value>,
    #[serde(default)]
    pub alerts: Vec<serde_json::Value>,
    #[serde(default, with = "crate::timestamp::option")]
    pub timestamp: Option<Timestamp>,
}

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, with = "crate::timestamp::option")]
    pub timestamp: Option<Timestamp>,
    #[serde(default)]
    pub model_path: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// `GET /model-info` body. Class ids arrive as JSON object keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_path: String,
    pub classes: IndexMap<String, String>,
    pub num_classes: u32,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use super::*;

    fn alert_json() -> serde_json::Value {
        json!({
            "id": 7,
            "detection_id": 3,
            "alert_type": "object_detected",
            "message": "TRUCK detected in a.png with 93.00% confidence",
            "severity": "high",
            "alert_timestamp": "2025-03-01T12:00:00.000001",
            "acknowledged": false,
            "acknowledged_timestamp": null
        })
    }

    #[test]
    fn alert_decodes_backend_shape() {
        let alert: Alert = serde_json::from_value(alert_json()).unwrap();
        assert_eq!(alert.severity, Severity::High);
        assert!(!alert.acknowledged);
        assert!(alert.acknowledged_timestamp.is_none());
        assert!(alert.is_acknowledgement_consistent());
    }

    #[test]
    fn unknown_severity_decodes_as_unknown() {
        let mut raw = alert_json();
        raw["severity"] = json!("critical");
        let alert: Alert = serde_json::from_value(raw).unwrap();
        assert_eq!(alert.severity, Severity::Unknown);
    }

    #[test]
    fn acknowledgement_before_alert_is_inconsistent() {
        let mut alert: Alert = serde_json::from_value(alert_json()).unwrap();
        alert.acknowledged = true;
        alert.acknowledged_timestamp = Some(alert.alert_timestamp - Duration::seconds(1));
        assert!(!alert.is_acknowledgement_consistent());

        alert.acknowledged_timestamp = Some(alert.alert_timestamp + Duration::seconds(5));
        assert!(alert.is_acknowledgement_consistent());

        alert.acknowledged_timestamp = None;
        assert!(!alert.is_acknowledgement_consistent());
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("bogus".parse::<Severity>().unwrap(), Severity::Unknown);
    }

    #[test]
    fn bounding_box_validity() {
        let good = BoundingBox { x_min: 1.0, y_min: 2.0, x_max: 11.0, y_max: 4.0 };
        assert!(good.is_valid());

        let flipped = BoundingBox { x_min: 5.0, y_min: 0.0, x_max: 1.0, y_max: 4.0 };
        assert!(!flipped.is_valid());

        let negative = BoundingBox { x_min: -1.0, y_min: 0.0, x_max: 1.0, y_max: 4.0 };
        assert!(!negative.is_valid());
    }

    #[test]
    fn image_list_with_zero_pages_decodes() {
        let body: ImageListResponse = serde_json::from_value(json!({
            "images": [],
            "total": 0,
            "pages": 0,
            "current_page": 1,
            "per_page": 12
        }))
        .unwrap();
        let page: Page<Image> = body.into();
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn detail_count_mismatch_is_detected() {
        let image: Image = serde_json::from_value(json!({
            "id": 1,
            "original_filename": "a.png",
            "upload_timestamp": "2025-03-01T12:00:00",
            "file_size": 2048,
            "detection_processed": true,
            "detection_count": 2
        }))
        .unwrap();
        let detail = ImageDetail::empty(image);
        assert!(!detail.detection_count_matches());
    }

    #[test]
    fn statistics_keep_server_order() {
        let snapshot: StatisticsSnapshot = serde_json::from_str(
            r#"{"total_images":2,"total_detections":14,"total_alerts":14,
                "unacknowledged_alerts":3,
                "class_statistics":{"warehouse":4,"truck":10},
                "severity_statistics":{"low":1}}"#,
        )
        .unwrap();
        let classes: Vec<&str> = snapshot.class_statistics.keys().map(String::as_str).collect();
        assert_eq!(classes, ["warehouse", "truck"]);
    }
}
