//! Detection results: a page of images, each expanded to its detections
//! and alerts through the [`DetailAggregator`].

use std::sync::Arc;

use async_trait::async_trait;
use skyscan_core::models::{ImageDetail, Page};
use skyscan_core::pagination::PageInfo;
use tokio_util::sync::CancellationToken;

use crate::aggregator::DetailAggregator;
use crate::backend::DetectionBackend;
use crate::error::FetchError;
use crate::refresh::{RefreshCoordinator, Refreshable};
use crate::view::{Commit, FetchTicket, PagedCell, ViewState};

/// Images per results page.
pub const RESULTS_PAGE_SIZE: u32 = 10;

pub struct DetectionResultsView {
    backend: Arc<dyn DetectionBackend>,
    aggregator: DetailAggregator,
    page: PagedCell<ImageDetail>,
    cancel: CancellationToken,
}

impl DetectionResultsView {
    pub fn new(
        backend: Arc<dyn DetectionBackend>,
        refresh: &RefreshCoordinator,
        detail_concurrency: usize,
    ) -> Self {
        let cancel = CancellationToken::new();
        Self {
            aggregator: DetailAggregator::new(backend.clone(), detail_concurrency),
            backend,
            page: PagedCell::new("results", refresh.clone(), cancel.clone()),
            cancel,
        }
    }

    /// Fetch the current page of images and their details.
    pub async fn load(&self) -> Commit {
        let (ticket, page) = self.page.begin().await;
        self.fetch(ticket, page, None).await
    }

    /// Fetch `page` directly, landing on it once the page count is known.
    pub async fn show(&self, page: u32) -> Commit {
        let (ticket, page) = self.page.begin_at(page).await;
        self.fetch(ticket, page, Some(page)).await
    }

    async fn fetch(&self, ticket: FetchTicket, page: u32, requested: Option<u32>) -> Commit {
        tracing::debug!(page, generation = %ticket.generation(), "Loading detection results");

        let result = match self.backend.list_images(page, RESULTS_PAGE_SIZE).await {
            Ok(images) => {
                // No point fanning out for a response nobody will see.
                let outcome = self.page.cell().release_if_superseded(&ticket).await;
                if outcome != Commit::Applied {
                    return outcome;
                }
                let details = self.aggregator.aggregate(images.items).await;
                Ok(Page::new(details, images.total_pages))
            }
            Err(e) => Err::<Page<ImageDetail>, FetchError>(e),
        };

        match requested {
            Some(page) => self.page.commit_at(ticket, page, result).await,
            None => self.page.commit(ticket, result).await,
        }
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

    pub async fn state(&self) -> ViewState<Page<ImageDetail>> {
        self.page.snapshot().await
    }

    pub async fn details(&self) -> Vec<ImageDetail> {
        self.page.items().await
    }

    pub async fn page_info(&self) -> PageInfo {
        self.page.page_info().await
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl Refreshable for DetectionResultsView {
    fn name(&self) -> &'static str {
        "results"
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn on_generation_change(&self) {
        self.page.reset().await;
        self.load().await;
    }
}
