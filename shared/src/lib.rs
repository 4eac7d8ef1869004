//! Shared types for the storefront backend
//!
//! Wire-level request/response types and the unified error-code table,
//! used by both `store-server` and its integration tests.

pub mod dto;
pub mod error;

// Re-exports
pub use error::ErrorCode;
pub use serde::{Deserialize, Serialize};

pub use dto::cart::{CartConflict, ConflictResolution, MergeStrategy};
pub use dto::order::{OrderStatus, PaymentStatus};
