//! One function per subcommand. Each drives the dashboard the way the
//! matching screen would and prints the result.

use std::path::Path;

use anyhow::{bail, Context};
use skyscan_client::{Dashboard, DetectionBackend};
use skyscan_core::filter::{AckFilter, AlertFilters};
use skyscan_core::models::Severity;
use skyscan_core::types::DbId;

use crate::render;

/// Detections per page of the global detections list.
pub const DETECTIONS_PAGE_SIZE: u32 = 20;

pub async fn health(dashboard: &Dashboard) -> anyhow::Result<()> {
    let health = dashboard
        .backend()
        .health()
        .await
        .context("Backend health check failed")?;
    println!("status:  {}", health.status);
    if let Some(model_path) = &health.model_path {
        println!("model:   {model_path}");
    }
    if let Some(at) = health.timestamp {
        println!("checked: {}", render::local_time(at));
    }
    if !health.is_healthy() {
        bail!("Backend reports status {:?}", health.status);
    }
    Ok(())
}

pub async fn model_info(dashboard: &Dashboard) -> anyhow::Result<()> {
    let info = dashboard.backend().model_info().await?;
    println!("{} ({} classes)", info.model_path, info.num_classes);
    for (id, name) in &info.classes {
        println!("  {id:>3}  {name}");
    }
    Ok(())
}

pub async fn upload(dashboard: &Dashboard, file: &Path) -> anyhow::Result<()> {
    let outcome = dashboard
        .uploads
        .upload_path(file)
        .await
        .with_context(|| format!("Upload of {} failed", file.display()))?;

    let receipt = &outcome.receipt;
    match receipt.image_id {
        Some(id) => println!("Uploaded as image #{id}"),
        None => println!("Uploaded"),
    }
    println!(
        "Found {}",
        render::detection_count(receipt.detections_count)
    );

    // The upload advanced the generation, so this is the fresh first page.
    dashboard.gallery.load().await;
    print_gallery(dashboard).await
}

pub async fn gallery(dashboard: &Dashboard, page: u32, image: Option<DbId>) -> anyhow::Result<()> {
    dashboard.gallery.show(page).await;
    print_gallery(dashboard).await?;

    if let Some(id) = image {
        dashboard.gallery.select(id).await;
        let selected = dashboard.gallery.selected().await;
        if let Some(error) = selected.error {
            bail!("Could not load image #{id}: {error}");
        }
        if let Some(detail) = selected.data {
            println!();
            for line in render::image_detail(&detail) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

async fn print_gallery(dashboard: &Dashboard) -> anyhow::Result<()> {
    let state = dashboard.gallery.state().await;
    if let Some(error) = state.error {
        bail!("Could not load images: {error}");
    }
    let images = dashboard.gallery.images().await;
    if images.is_empty() {
        println!("No images uploaded yet");
    }
    for image in &images {
        println!("{}", render::image_line(image));
    }
    println!("{}", render::page_footer(&dashboard.gallery.page_info().await));
    Ok(())
}

pub async fn results(dashboard: &Dashboard, page: u32) -> anyhow::Result<()> {
    dashboard.results.show(page).await;
    let state = dashboard.results.state().await;
    if let Some(error) = state.error {
        bail!("Could not load detection results: {error}");
    }

    for detail in dashboard.results.details().await {
        for line in render::image_detail(&detail) {
            println!("{line}");
        }
        println!();
    }
    println!("{}", render::page_footer(&dashboard.results.page_info().await));
    Ok(())
}

pub async fn alerts(
    dashboard: &Dashboard,
    page: u32,
    severity: Option<Severity>,
    status: Option<AckFilter>,
) -> anyhow::Result<()> {
    dashboard
        .alerts
        .show(AlertFilters::selecting(severity, status), page)
        .await;
    print_alerts(dashboard).await
}

async fn print_alerts(dashboard: &Dashboard) -> anyhow::Result<()> {
    let state = dashboard.alerts.state().await;
    if let Some(error) = state.error {
        bail!("Could not load alerts: {error}");
    }
    let alerts = dashboard.alerts.alerts().await;
    if alerts.is_empty() {
        println!("No alerts");
    }
    for alert in &alerts {
        println!("{}", render::alert_line(alert));
    }
    println!("{}", render::page_footer(&dashboard.alerts.page_info().await));
    Ok(())
}

pub async fn acknowledge(dashboard: &Dashboard, id: DbId) -> anyhow::Result<()> {
    dashboard.alerts.acknowledge(id).await?;
    println!("Alert #{id} acknowledged");
    print_alerts(dashboard).await
}

pub async fn stats(dashboard: &Dashboard) -> anyhow::Result<()> {
    let statistics = &dashboard.statistics;
    statistics.load().await;
    let state = statistics.state().await;
    if let Some(error) = state.error {
        bail!("Could not load statistics: {error}");
    }
    let Some(snapshot) = state.data else {
        return Ok(());
    };

    println!("Images:      {}", snapshot.total_images);
    println!("Detections:  {}", snapshot.total_detections);
    println!(
        "Alerts:      {} ({} unacknowledged)",
        snapshot.total_alerts, snapshot.unacknowledged_alerts
    );

    let bars = statistics.class_bars().await;
    if !bars.is_empty() {
        println!("\nObjects by class");
        let label_width = bars.iter().map(|b| b.class_name.len()).max().unwrap_or(0);
        for bar in &bars {
            println!("  {}", render::class_bar(bar, label_width));
        }
    }

    let rows = statistics.severity_rows().await;
    if !rows.is_empty() {
        println!("\nAlerts by severity");
        for row in &rows {
            println!("  {}", render::severity_row(row));
        }
    }
    Ok(())
}

pub async fn detections(
    dashboard: &Dashboard,
    page: u32,
    class: Option<&str>,
) -> anyhow::Result<()> {
    let page = page.max(1);
    let detections = dashboard
        .backend()
        .list_detections(page, DETECTIONS_PAGE_SIZE, class)
        .await?;

    if detections.is_empty() {
        println!("No detections");
    }
    for detection in &detections.items {
        println!(
            "#{:<6} {}  {}",
            detection.id,
            render::detection_line(detection),
            render::local_time(detection.detection_timestamp),
        );
    }
    println!("Page {} of {}", page, detections.total_pages.max(1));
    Ok(())
}
