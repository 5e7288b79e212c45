//! Alert triage: filtered, paginated alert list plus acknowledgement.
//!
//! Each refresh trigger (page change, filter change, generation change)
//! issues exactly one `list_alerts` call built from the current filter
//! selection and page. Acknowledging never patches the list locally: after
//! a successful mutation the current list is fetched again, so what is
//! shown is always what the server holds.

use std::sync::Arc;

use async_trait::async_trait;
use skyscan_core::filter::{AckFilter, AlertFilters, PageReset};
use skyscan_core::models::{Alert, Page, Severity};
use skyscan_core::pagination::PageInfo;
use skyscan_core::types::DbId;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::backend::DetectionBackend;
use crate::error::{FetchError, MutationError};
use crate::refresh::{RefreshCoordinator, Refreshable};
use crate::view::{Commit, FetchTicket, PagedCell, ViewState};

/// Alerts per page.
pub const ALERTS_PAGE_SIZE: u32 = 15;

pub struct AlertTriageService {
    backend: Arc<dyn DetectionBackend>,
    filters: RwLock<AlertFilters>,
    page: PagedCell<Alert>,
    cancel: CancellationToken,
}

impl AlertTriageService {
    pub fn new(backend: Arc<dyn DetectionBackend>, refresh: &RefreshCoordinator) -> Self {
        let cancel = CancellationToken::new();
        Self {
            backend,
            filters: RwLock::new(AlertFilters::new()),
            page: PagedCell::new("alerts", refresh.clone(), cancel.clone()),
            cancel,
        }
    }

    /// Fetch the current page under the current filters.
    pub async fn load(&self) -> Commit {
        let (ticket, page) = self.page.begin().await;
        let filters = self.filters.read().await.clone();
        let result = self.fetch(page, &filters, &ticket).await;
        self.page.commit(ticket, result).await
    }

    /// Replace the filter selection and fetch `page` under it in a single
    /// `list_alerts` call. The cursor lands on `page`, clamped to the page
    /// count the server reports.
    pub async fn show(&self, filters: AlertFilters, page: u32) -> Commit {
        *self.filters.write().await = filters.clone();
        let (ticket, page) = self.page.begin_at(page).await;
        let result = self.fetch(page, &filters, &ticket).await;
        self.page.commit_at(ticket, page, result).await
    }

    async fn fetch(
        &self,
        page: u32,
        filters: &AlertFilters,
        ticket: &FetchTicket,
    ) -> Result<Page<Alert>, FetchError> {
        tracing::debug!(
            page,
            filters = ?filters.query_pairs(),
            generation = %ticket.generation(),
            "Loading alerts",
        );

        let result = self
            .backend
            .list_alerts(page, ALERTS_PAGE_SIZE, filters)
            .await;
        if let Ok(alerts) = &result {
            warn_inconsistent(alerts);
        }
        result
    }

    pub async fn set_severity(&self, severity: Option<Severity>) -> Commit {
        let reset = self.filters.write().await.set_severity(severity);
        self.apply_reset(reset).await;
        self.load().await
    }

    pub async fn set_acknowledged(&self, ack: Option<AckFilter>) -> Commit {
        let reset = self.filters.write().await.set_acknowledged(ack);
        self.apply_reset(reset).await;
        self.load().await
    }

    pub async fn clear_filters(&self) -> Commit {
        let reset = self.filters.write().await.clear();
        self.apply_reset(reset).await;
        self.load().await
    }

    pub async fn filters(&self) -> AlertFilters {
        self.filters.read().await.clone()
    }

    pub async fn go_to(&self, page: u32) -> Commit {
        self.page.go_to(page).await;
        self.load().await
    }

    pub async fn next_page(&self) -> Commit {
        self.page.next().await;
        self.load().await
    }

    pub async fn previous_page(&self) -> Commit {
        self.page.previous().await;
        self.load().await
    }

    /// Acknowledge `alert_id`, then re-fetch the current list.
    ///
    /// On failure the list is left as displayed, the error is surfaced on
    /// the view and returned, and no re-fetch happens. Nothing is retried.
    pub async fn acknowledge(&self, alert_id: DbId) -> Result<Commit, MutationError> {
        if let Err(e) = self.backend.acknowledge_alert(alert_id).await {
            tracing::warn!(
                alert_id,
                error = %e,
                retry_safe = e.is_retry_safe(),
                "Acknowledge failed",
            );
            self.page.cell().record_error(e.to_string()).await;
            return Err(e);
        }

        tracing::info!(alert_id, "Alert acknowledged");
        Ok(self.load().await)
    }

    pub async fn state(&self) -> ViewState<Page<Alert>> {
        self.page.snapshot().await
    }

    pub async fn alerts(&self) -> Vec<Alert> {
        self.page.items().await
    }

    pub async fn page_info(&self) -> PageInfo {
        self.page.page_info().await
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    async fn apply_reset(&self, reset: PageReset) {
        self.page.with_pagination(|pagination| reset.apply(pagination)).await;
    }
}

fn warn_inconsistent(alerts: &Page<Alert>) {
    for alert in alerts.items.iter().filter(|a| !a.is_acknowledgement_consistent()) {
        tracing::warn!(
            alert_id = alert.id,
            acknowledged = alert.acknowledged,
            "Alert acknowledgement timestamp is inconsistent",
        );
    }
}

#[async_trait]
impl Refreshable for AlertTriageService {
    fn name(&self) -> &'static str {
        "alerts"
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn on_generation_change(&self) {
        self.page.reset().await;
        self.load().await;
    }
}
