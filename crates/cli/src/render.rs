//! Plain-text formatting of view data for the terminal.

use chrono::Local;
use skyscan_core::models::{Alert, BoundingBox, Detection, Image, ImageDetail};
use skyscan_core::pagination::PageInfo;
use skyscan_core::statistics::{severity_style, ClassBar, SeverityRow};
use skyscan_core::types::Timestamp;

/// Width of a full-length statistics bar, in characters.
const BAR_WIDTH: usize = 30;

pub fn file_size_kb(bytes: Option<u64>) -> String {
    match bytes {
        Some(bytes) => format!("{:.2} KB", bytes as f64 / 1024.0),
        None => "unknown size".to_string(),
    }
}

pub fn confidence_percent(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

pub fn detection_count(n: u32) -> String {
    match n {
        1 => "1 detection".to_string(),
        n => format!("{n} detections"),
    }
}

pub fn bounding_box(b: &BoundingBox) -> String {
    format!(
        "X({:.0}-{:.0}), Y({:.0}-{:.0})",
        b.x_min, b.x_max, b.y_min, b.y_max
    )
}

pub fn local_time(at: Timestamp) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `Page N of M`, with arrows where a neighbouring page exists.
pub fn page_footer(info: &PageInfo) -> String {
    let mut footer = format!("Page {} of {}", info.current_page, info.total_pages);
    if info.has_previous {
        footer.insert_str(0, "<- ");
    }
    if info.has_next {
        footer.push_str(" ->");
    }
    footer
}

pub fn image_line(image: &Image) -> String {
    format!(
        "#{:<5} {:<32} {:>12}  {}  {}",
        image.id,
        image.original_filename,
        file_size_kb(image.file_size),
        local_time(image.upload_timestamp),
        detection_count(image.detection_count),
    )
}

pub fn detection_line(detection: &Detection) -> String {
    format!(
        "{} {}  {}",
        detection.class_name.to_uppercase(),
        confidence_percent(detection.confidence),
        bounding_box(&detection.bounding_box),
    )
}

pub fn alert_line(alert: &Alert) -> String {
    let style = severity_style(alert.severity);
    let status = match alert.acknowledged_timestamp {
        Some(at) if alert.acknowledged => format!("acknowledged {}", local_time(at)),
        _ if alert.acknowledged => "acknowledged".to_string(),
        _ => "open".to_string(),
    };
    format!(
        "{} #{:<5} {:<6} {}  [{}]  {}",
        style.icon,
        alert.id,
        alert.severity.as_str().to_uppercase(),
        local_time(alert.alert_timestamp),
        status,
        alert.message,
    )
}

/// Image header followed by indented detections and alerts.
pub fn image_detail(detail: &ImageDetail) -> Vec<String> {
    let mut lines = vec![image_line(&detail.image)];
    lines.extend(detail.detections.iter().map(|d| format!("    {}", detection_line(d))));
    lines.extend(detail.alerts.iter().map(|a| format!("    {}", alert_line(a))));
    lines
}

pub fn class_bar(bar: &ClassBar, label_width: usize) -> String {
    let filled = (bar.width * BAR_WIDTH as f64).round() as usize;
    format!(
        "{:<label_width$}  {:<BAR_WIDTH$}  {}",
        bar.class_name,
        "#".repeat(filled.min(BAR_WIDTH)),
        bar.count,
    )
}

pub fn severity_row(row: &SeverityRow) -> String {
    format!("{} {:<8} {}", row.style.icon, row.label.to_uppercase(), row.count)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use skyscan_core::models::Severity;

    use super::*;

    fn alert() -> Alert {
        Alert {
            id: 4,
            detection_id: 9,
            alert_type: "object_detected".into(),
            message: "TRUCK detected".into(),
            severity: Severity::High,
            alert_timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            acknowledged: false,
            acknowledged_timestamp: None,
        }
    }

    #[test]
    fn sizes_in_kilobytes() {
        assert_eq!(file_size_kb(Some(204_800)), "200.00 KB");
        assert_eq!(file_size_kb(Some(1_000)), "0.98 KB");
        assert_eq!(file_size_kb(None), "unknown size");
    }

    #[test]
    fn confidence_has_two_decimals() {
        assert_eq!(confidence_percent(0.9312), "93.12%");
        assert_eq!(confidence_percent(1.0), "100.00%");
    }

    #[test]
    fn pluralises_detections() {
        assert_eq!(detection_count(0), "0 detections");
        assert_eq!(detection_count(1), "1 detection");
        assert_eq!(detection_count(3), "3 detections");
    }

    #[test]
    fn bounding_box_rounds_to_pixels() {
        let b = BoundingBox { x_min: 10.2, y_min: 20.0, x_max: 110.7, y_max: 80.4 };
        assert_eq!(bounding_box(&b), "X(10-111), Y(20-80)");
    }

    #[test]
    fn footer_marks_neighbours() {
        let middle = PageInfo { current_page: 2, total_pages: 3, has_previous: true, has_next: true };
        assert_eq!(page_footer(&middle), "<- Page 2 of 3 ->");

        let only = PageInfo { current_page: 1, total_pages: 1, has_previous: false, has_next: false };
        assert_eq!(page_footer(&only), "Page 1 of 1");
    }

    #[test]
    fn alert_line_shows_status() {
        let open = alert_line(&alert());
        assert!(open.starts_with("🔴 #4"));
        assert!(open.contains("HIGH"));
        assert!(open.contains("[open]"));

        let mut acked = alert();
        acked.acknowledged = true;
        acked.acknowledged_timestamp = Some(acked.alert_timestamp);
        assert!(alert_line(&acked).contains("[acknowledged "));
    }

    #[test]
    fn full_bar_spans_width() {
        let bar = ClassBar { class_name: "truck".into(), count: 10, width: 1.0 };
        let line = class_bar(&bar, 9);
        assert_eq!(line.matches('#').count(), BAR_WIDTH);
        assert!(line.starts_with("truck      "));
        assert!(line.ends_with(" 10"));

        let half = ClassBar { class_name: "warehouse".into(), count: 4, width: 0.4 };
        assert_eq!(class_bar(&half, 9).matches('#').count(), 12);
    }
}
