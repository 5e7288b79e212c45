//! Upload-driven refresh generation.
//!
//! [`RefreshCoordinator`] holds a monotonically increasing [`Generation`],
//! starting at 0 and advanced exactly once per successful upload. Views
//! stamp each fetch with the generation current at issue time and drop the
//! response if the generation has moved on by the time it arrives.
//!
//! The coordinator is passed explicitly to every view that needs it; there
//! is no global instance.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Value of the refresh counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Generation {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared handle to the refresh counter. Cheap to clone.
///
/// One writer (the upload path calls [`advance`](Self::advance)), any number
/// of readers.
#[derive(Debug, Clone)]
pub struct RefreshCoordinator {
    sender: Arc<watch::Sender<Generation>>,
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Generation::INITIAL);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn current(&self) -> Generation {
        *self.sender.borrow()
    }

    /// Bump the generation and wake every subscriber. Returns the new value.
    pub fn advance(&self) -> Generation {
        self.sender.send_modify(|generation| *generation = generation.next());
        let generation = self.current();
        tracing::debug!(%generation, "Refresh generation advanced");
        generation
    }

    /// Receiver that treats the current value as already seen.
    pub fn subscribe(&self) -> watch::Receiver<Generation> {
        self.sender.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Auto refresh
// ---------------------------------------------------------------------------

/// A view that re-fetches when the generation advances.
#[async_trait]
pub trait Refreshable: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Cancelled when the view is torn down.
    fn cancel_token(&self) -> CancellationToken;

    /// Invalidate and re-fetch under the new generation.
    async fn on_generation_change(&self);
}

/// Spawn a task that calls [`Refreshable::on_generation_change`] every time
/// `coordinator` advances, until the view is torn down.
///
/// Several advances that land while a re-fetch is running collapse into a
/// single follow-up re-fetch.
pub fn spawn_auto_refresh(
    view: Arc<dyn Refreshable>,
    coordinator: &RefreshCoordinator,
) -> JoinHandle<()> {
    let mut rx = coordinator.subscribe();
    let cancel = view.cancel_token();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(view = view.name(), "Auto refresh stopped");
                    break;
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let generation = *rx.borrow_and_update();
                    tracing::debug!(view = view.name(), %generation, "Refreshing view");
                    view.on_generation_change().await;
                }
            }
        }
    })
}
