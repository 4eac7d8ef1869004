//! Store Server - online storefront backend
//!
//! # Architecture
//!
//! ```text
//! store-server/src/
//! ├── core/          # configuration, state, server lifecycle
//! ├── auth/          # JWT access tokens, refresh rotation, extractors
//! ├── api/           # HTTP routes and handlers
//! ├── cart/          # cart persistence and merge engine
//! ├── orders/        # checkout pipeline and stock reservation
//! ├── services/      # injected external collaborators (mail)
//! ├── db/            # embedded SurrealDB, models, repositories
//! └── utils/         # errors, logging, validation helpers
//! ```
//!
//! The interesting parts are the cart merge engine (`cart::merge`), the
//! order placement pipeline (`orders::placer`) and refresh-token rotation
//! (`auth::refresh`); everything else is boundary validation and
//! pass-through persistence.

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService, RefreshTokenService};
pub use cart::CartService;
pub use core::{Config, Server, ServerState};
pub use orders::OrderPlacer;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - tracing with a dedicated target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Prepare the process environment: dotenv, logging
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
