//! Server state
//!
//! Shared references to every service. Cloning is shallow (Arc / handle
//! clones); there is no shared in-process mutable state, all coordination
//! goes through the database's per-record atomicity.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, RefreshTokenService};
use crate::cart::CartService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderPlacer;
use crate::services::{LogMailer, Mailer};

/// Server state - holds shared handles to all services
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable)
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Access token service
    pub jwt_service: Arc<JwtService>,
    /// Refresh token chains (issue / rotate / revoke)
    pub refresh_tokens: RefreshTokenService,
    /// Cart persistence and reconciliation
    pub cart_service: CartService,
    /// Checkout pipeline
    pub order_placer: OrderPlacer,
    /// Mail collaborator, injected everywhere mail is triggered
    pub mailer: Arc<dyn Mailer>,
}

impl ServerState {
    /// Initialize all services in dependency order
    ///
    /// # Panics
    ///
    /// Panics when the work directory or database cannot be initialized;
    /// the process cannot meaningfully run without them.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("store.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

        let refresh_tokens =
            RefreshTokenService::new(db.clone(), jwt_service.clone(), config.refresh_token_days);
        let cart_service = CartService::new(db.clone());
        let order_placer = OrderPlacer::new(
            db.clone(),
            mailer.clone(),
            config.order_number_prefix.clone(),
            config.allow_unlisted_order_items,
        );

        Self {
            config: config.clone(),
            db,
            jwt_service,
            refresh_tokens,
            cart_service,
            order_placer,
            mailer,
        }
    }
}
