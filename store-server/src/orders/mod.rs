//! Orders module
//!
//! - [`OrderPlacer`] - checkout validation, stock reservation, creation
//! - [`number`] - order number generation

pub mod number;
pub mod placer;

pub use number::generate_order_number;
pub use placer::{MONEY_TOLERANCE, OrderPlacer, validate_totals};
