//! Cart module
//!
//! - [`merge`] - pure reconciliation (the merge engine)
//! - [`CartService`] - cart persistence and mutations

pub mod merge;
pub mod service;

pub use merge::{MergeOutcome, SellableProducts};
pub use service::CartService;
