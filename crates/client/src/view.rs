//! Generation-stamped view state.
//!
//! A [`ViewCell`] holds the last good data of one view plus the last error.
//! Fetches go through a ticket: [`ViewCell::begin`] stamps the request with
//! the current refresh generation and a per-view sequence number, and
//! [`ViewCell::commit`] applies the result only if the ticket is still the
//! newest one, the generation has not moved, and the view has not been torn
//! down. Errors never clear data that is already displayed.
//!
//! The state lock is never held across a fetch.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use skyscan_core::models::Page;
use skyscan_core::pagination::{PageInfo, Pagination};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::refresh::{Generation, RefreshCoordinator};

/// What a view currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    /// Last successfully fetched data, kept across later failures.
    pub data: Option<T>,
    /// Message of the most recent failure, cleared by the next success.
    pub error: Option<String>,
    pub loading: bool,
    /// Generation the displayed data was fetched under.
    pub generation: Generation,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            generation: Generation::INITIAL,
        }
    }
}

/// Stamp of one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: Generation,
    seq: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Fate of a fetch result handed to [`ViewCell::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The result (data or error) is now what the view shows.
    Applied,
    /// A newer fetch or a newer generation superseded this one.
    Stale,
    /// The view was torn down while the fetch was in flight.
    Detached,
}

pub struct ViewCell<T> {
    name: &'static str,
    state: RwLock<ViewState<T>>,
    refresh: RefreshCoordinator,
    cancel: CancellationToken,
    seq: AtomicU64,
}

impl<T: Clone + Send + Sync> ViewCell<T> {
    pub fn new(name: &'static str, refresh: RefreshCoordinator, cancel: CancellationToken) -> Self {
        Self {
            name,
            state: RwLock::new(ViewState::default()),
            refresh,
            cancel,
            seq: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Issue a ticket for a new fetch and mark the view as loading. Any
    /// older ticket becomes stale.
    pub async fn begin(&self) -> FetchTicket {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let ticket = FetchTicket {
            generation: self.refresh.current(),
            seq,
        };
        self.state.write().await.loading = true;
        ticket
    }

    /// Whether a result for `ticket` would still be applied.
    fn check(&self, ticket: &FetchTicket) -> Commit {
        if self.cancel.is_cancelled() {
            Commit::Detached
        } else if ticket.seq != self.seq.load(Ordering::SeqCst)
            || ticket.generation != self.refresh.current()
        {
            Commit::Stale
        } else {
            Commit::Applied
        }
    }

    /// Apply a fetch result if `ticket` is still current.
    pub async fn commit<E: Display>(&self, ticket: FetchTicket, result: Result<T, E>) -> Commit {
        let mut state = self.state.write().await;

        // Checked under the lock so two commits cannot interleave.
        let outcome = self.check(&ticket);
        if outcome != Commit::Applied {
            self.settle_discarded(&mut state, &ticket, outcome);
            return outcome;
        }

        state.loading = false;
        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
                state.generation = ticket.generation;
            }
            Err(e) => {
                tracing::warn!(view = self.name, error = %e, "Fetch failed");
                state.error = Some(e.to_string());
            }
        }
        outcome
    }

    /// Whether a result for `ticket` would still be applied. A ticket that
    /// is no longer current is abandoned here: the loading flag is released
    /// unless a newer fetch is still in flight.
    pub async fn release_if_superseded(&self, ticket: &FetchTicket) -> Commit {
        let mut state = self.state.write().await;
        let outcome = self.check(ticket);
        if outcome != Commit::Applied {
            self.settle_discarded(&mut state, ticket, outcome);
        }
        outcome
    }

    fn settle_discarded(&self, state: &mut ViewState<T>, ticket: &FetchTicket, outcome: Commit) {
        // A newer ticket owns the loading flag until it commits.
        if ticket.seq == self.seq.load(Ordering::SeqCst) {
            state.loading = false;
        }
        match outcome {
            Commit::Stale => tracing::debug!(
                view = self.name,
                issued = %ticket.generation,
                current = %self.refresh.current(),
                "Discarding stale response",
            ),
            _ => tracing::debug!(view = self.name, "Discarding response for torn-down view"),
        }
    }

    /// Surface an error that did not come from a ticketed fetch (a failed
    /// mutation). Displayed data is left untouched.
    pub async fn record_error(&self, message: String) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.state.write().await.error = Some(message);
    }

    /// Drop displayed data and any in-flight result.
    pub async fn clear(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
        *self.state.write().await = ViewState::default();
    }

    pub async fn snapshot(&self) -> ViewState<T> {
        self.state.read().await.clone()
    }

    pub async fn data(&self) -> Option<T> {
        self.state.read().await.data.clone()
    }

    /// Tear the view down. In-flight results are discarded from now on.
    pub fn detach(&self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Paged views
// ---------------------------------------------------------------------------

/// A [`ViewCell`] over one page of `T`, with its [`Pagination`].
pub struct PagedCell<T> {
    cell: ViewCell<Page<T>>,
    pagination: RwLock<Pagination>,
}

impl<T: Clone + Send + Sync> PagedCell<T> {
    pub fn new(name: &'static str, refresh: RefreshCoordinator, cancel: CancellationToken) -> Self {
        Self {
            cell: ViewCell::new(name, refresh, cancel),
            pagination: RwLock::new(Pagination::new()),
        }
    }

    pub fn cell(&self) -> &ViewCell<Page<T>> {
        &self.cell
    }

    /// Ticket plus the page number the fetch must request.
    pub async fn begin(&self) -> (FetchTicket, u32) {
        let page = self.pagination.read().await.current_page();
        (self.cell.begin().await, page)
    }

    /// Ticket for a fetch of an explicitly requested page. The cursor is
    /// not moved until [`commit_at`](Self::commit_at) applies the result.
    pub async fn begin_at(&self, page: u32) -> (FetchTicket, u32) {
        (self.cell.begin().await, page.max(1))
    }

    /// Commit a page and, when applied, record its page count.
    pub async fn commit<E: Display>(
        &self,
        ticket: FetchTicket,
        result: Result<Page<T>, E>,
    ) -> Commit {
        self.commit_inner(ticket, None, result).await
    }

    /// Commit a page fetched through [`begin_at`](Self::begin_at) and, when
    /// applied, move the cursor to it.
    pub async fn commit_at<E: Display>(
        &self,
        ticket: FetchTicket,
        page: u32,
        result: Result<Page<T>, E>,
    ) -> Commit {
        self.commit_inner(ticket, Some(page), result).await
    }

    async fn commit_inner<E: Display>(
        &self,
        ticket: FetchTicket,
        requested: Option<u32>,
        result: Result<Page<T>, E>,
    ) -> Commit {
        let total_pages = result.as_ref().ok().map(|page| page.total_pages);
        let outcome = self.cell.commit(ticket, result).await;
        if let (Commit::Applied, Some(total_pages)) = (outcome, total_pages) {
            let mut pagination = self.pagination.write().await;
            match requested {
                Some(page) => pagination.on_fetch_result_for(page, total_pages),
                None => pagination.on_fetch_result(total_pages),
            }
        }
        outcome
    }

    pub async fn go_to(&self, page: u32) -> u32 {
        self.pagination.write().await.go_to(page)
    }

    pub async fn next(&self) -> u32 {
        self.pagination.write().await.next()
    }

    pub async fn previous(&self) -> u32 {
        self.pagination.write().await.previous()
    }

    pub async fn reset(&self) {
        self.pagination.write().await.reset();
    }

    /// Run `f` against the pagination under its lock (filter resets).
    pub async fn with_pagination<R>(&self, f: impl FnOnce(&mut Pagination) -> R) -> R {
        f(&mut *self.pagination.write().await)
    }

    pub async fn page_info(&self) -> PageInfo {
        self.pagination.read().await.info()
    }

    pub async fn snapshot(&self) -> ViewState<Page<T>> {
        self.cell.snapshot().await
    }

    pub async fn items(&self) -> Vec<T> {
        self.cell
            .data()
            .await
            .map(|page| page.items)
            .unwrap_or_default()
    }
}
