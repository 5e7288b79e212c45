//! Paginated image gallery with an on-demand detail panel.

use std::sync::Arc;

use async_trait::async_trait;
use skyscan_core::models::{Image, ImageDetail, Page};
use skyscan_core::pagination::PageInfo;
use skyscan_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::backend::DetectionBackend;
use crate::refresh::{RefreshCoordinator, Refreshable};
use crate::view::{Commit, PagedCell, ViewCell, ViewState};

/// Images per gallery page.
pub const GALLERY_PAGE_SIZE: u32 = 12;

pub struct GalleryView {
    backend: Arc<dyn DetectionBackend>,
    page: PagedCell<Image>,
    selected: ViewCell<ImageDetail>,
    cancel: CancellationToken,
}

impl GalleryView {
    pub fn new(backend: Arc<dyn DetectionBackend>, refresh: &RefreshCoordinator) -> Self {
        let cancel = CancellationToken::new();
        Self {
            backend,
            page: PagedCell::new("gallery", refresh.clone(), cancel.clone()),
            selected: ViewCell::new("gallery.detail", refresh.clone(), cancel.clone()),
            cancel,
        }
    }

    /// Fetch the current page.
    pub async fn load(&self) -> Commit {
        let (ticket, page) = self.page.begin().await;
        tracing::debug!(page, generation = %ticket.generation(), "Loading gallery");
        let result = self.backend.list_images(page, GALLERY_PAGE_SIZE).await;
        self.page.commit(ticket, result).await
    }

    /// Fetch `page` directly, landing on it once the page count is known.
    pub async fn show(&self, page: u32) -> Commit {
        let (ticket, page) = self.page.begin_at(page).await;
        tracing::debug!(page, generation = %ticket.generation(), "Loading gallery");
        let result = self.backend.list_images(page, GALLERY_PAGE_SIZE).await;
        self.page.commit_at(ticket, page, result).await
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

    /// Open the detail panel for one image. A failure is shown on the panel;
    /// the gallery page is left as it is.
    pub async fn select(&self, image_id: DbId) -> Commit {
        let ticket = self.selected.begin().await;
        let result = self.backend.get_image_detail(image_id).await;
        self.selected.commit(ticket, result).await
    }

    pub async fn close_detail(&self) {
        self.selected.clear().await;
    }

    pub async fn state(&self) -> ViewState<Page<Image>> {
        self.page.snapshot().await
    }

    pub async fn images(&self) -> Vec<Image> {
        self.page.items().await
    }

    pub async fn selected(&self) -> ViewState<ImageDetail> {
        self.selected.snapshot().await
    }

    pub async fn page_info(&self) -> PageInfo {
        self.page.page_info().await
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl Refreshable for GalleryView {
    fn name(&self) -> &'static str {
        "gallery"
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    async fn on_generation_change(&self) {
        self.page.reset().await;
        self.load().await;
    }
}
