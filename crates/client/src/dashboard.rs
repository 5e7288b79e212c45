//! Composition root: one backend, one refresh coordinator, every view.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::backend::DetectionBackend;
use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::gallery::GalleryView;
use crate::http::HttpBackend;
use crate::refresh::{spawn_auto_refresh, RefreshCoordinator, Refreshable};
use crate::results::DetectionResultsView;
use crate::statistics::StatisticsView;
use crate::triage::AlertTriageService;
use crate::upload::UploadService;

pub struct Dashboard {
    backend: Arc<dyn DetectionBackend>,
    refresh: RefreshCoordinator,
    pub gallery: Arc<GalleryView>,
    pub results: Arc<DetectionResultsView>,
    pub alerts: Arc<AlertTriageService>,
    pub statistics: Arc<StatisticsView>,
    pub uploads: UploadService,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn DetectionBackend>, config: &ClientConfig) -> Self {
        let refresh = RefreshCoordinator::new();
        Self {
            gallery: Arc::new(GalleryView::new(backend.clone(), &refresh)),
            results: Arc::new(DetectionResultsView::new(
                backend.clone(),
                &refresh,
                config.detail_concurrency,
            )),
            alerts: Arc::new(AlertTriageService::new(backend.clone(), &refresh)),
            statistics: Arc::new(StatisticsView::new(backend.clone(), &refresh)),
            uploads: UploadService::new(backend.clone(), refresh.clone()),
            backend,
            refresh,
        }
    }

    /// Dashboard over the HTTP backend described by `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self, FetchError> {
        let backend = HttpBackend::new(config)?;
        tracing::info!(api_url = backend.api_url(), "Dashboard backend configured");
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn backend(&self) -> &Arc<dyn DetectionBackend> {
        &self.backend
    }

    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Start one watcher per view that re-fetches on every generation
    /// advance. The tasks end when [`shutdown`](Self::shutdown) is called.
    pub fn spawn_auto_refresh(&self) -> Vec<JoinHandle<()>> {
        let views: [Arc<dyn Refreshable>; 4] = [
            self.gallery.clone(),
            self.results.clone(),
            self.alerts.clone(),
            self.statistics.clone(),
        ];
        views
            .into_iter()
            .map(|view| spawn_auto_refresh(view, &self.refresh))
            .collect()
    }

    /// Load every view once.
    pub async fn load_all(&self) {
        tokio::join!(
            self.gallery.load(),
            self.results.load(),
            self.alerts.load(),
            self.statistics.load(),
        );
    }

    /// Tear every view down; in-flight results are discarded.
    pub fn shutdown(&self) {
        self.gallery.teardown();
        self.results.teardown();
        self.alerts.teardown();
        self.statistics.teardown();
    }
}
