//! Read-model layer of the skyscan dashboard.
//!
//! Talks to the detection backend over HTTP+JSON and shapes its three
//! paginated resources (images, detections, alerts) into per-view state:
//!
//! - [`backend`]: the resource contract, with [`http::HttpBackend`] as the
//!   production implementation.
//! - [`refresh`]: the upload-driven generation counter every view watches.
//! - [`view`]: generation-stamped view state that drops stale responses.
//! - [`aggregator`]: order-preserving per-image detail fan-out.
//! - [`gallery`], [`results`], [`triage`], [`statistics`]: the views.
//! - [`upload`]: validated image upload that advances the generation.
//! - [`dashboard`]: wires one backend and coordinator into every view.

pub mod aggregator;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gallery;
pub mod http;
pub mod refresh;
pub mod results;
pub mod statistics;
pub mod triage;
pub mod upload;
pub mod view;

pub use backend::DetectionBackend;
pub use config::ClientConfig;
pub use dashboard::Dashboard;
pub use error::{ClientError, FetchError, MutationError};
pub use refresh::{Generation, RefreshCoordinator};
pub use view::{Commit, ViewState};
