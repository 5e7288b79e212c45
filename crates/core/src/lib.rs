//! Domain model and pure state machines for the skyscan dashboard.
//!
//! Nothing in this crate performs IO. The HTTP layer, view lifecycle and
//! refresh coordination live in `skyscan-client`.

pub mod error;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod statistics;
pub mod timestamp;
pub mod types;
pub mod upload;
