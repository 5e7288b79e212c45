//! Statistics snapshot view. One fetch, no pagination, no filters.

use std::sync::Arc;

use async_trait::async_trait;
use skyscan_core::models::StatisticsSnapshot;
use skyscan_core::statistics::{class_bars, severity_rows, ClassBar, SeverityRow};
use tokio_util::sync::CancellationToken;

use crate::backend::DetectionBackend;
use crate::refresh::{RefreshCoordinator, Refreshable};
use crate::view::{Commit, ViewCell, ViewState};

pub struct StatisticsView {
    backend: Arc<dyn DetectionBackend>,
    snapshot: ViewCell<StatisticsSnapshot>,
    cancel: CancellationToken,
}

impl StatisticsView {
    pub fn new(backend: Arc<dyn DetectionBackend>, refresh: &RefreshCoordinator) -> Self {
        let cancel = CancellationToken::new();
        Self {
            backend,
            snapshot: ViewCell::new("statistics", refresh.clone(), cancel.clone()),
            cancel,
        }
    }

    pub async fn load(&self) -> Commit {
        let ticket = self.snapshot.begin().await;
        let result = self.backend.get_statistics().await;
        self.snapshot.commit(ticket, result).await
    }

    pub async fn state(&self) -> ViewState<StatisticsSnapshot> {
        self.snapshot.snapshot().await
    }

    /// Class bars derived from the displayed snapshot.
    pub async fn class_bars(&self) -> Vec<ClassBar> {
        self.snapshot
            .data()
            .await
            .map(|s| class_bars(&s))
            .unwrap_or_default()
    }

    pub async fn severity_rows(&self) -> Vec<SeverityRow> {
        self.snapshot
            .data()
            .await
            .map(|s| severity_rows(&s))
            .unwrap_or_default()
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl Refreshable for StatisticsView {
    fn name(&self) -> &'static str {
        "statistics"
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn on_generation_change(&self) {
        self.load().await;
    }
}
