//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine). Schema is defined at startup; the
//! unique indexes are load-bearing: they are what turns "one cart per
//! identity" and "one record per token hash" into storage-level guarantees
//! instead of application-level locking.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "store";
const DATABASE: &str = "store";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the database at `db_path` and define the schema
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db: Surreal<Db> = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database ready at {db_path}");
        Ok(Self { db })
    }
}

/// Idempotent schema definition, run on every startup
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    let statements = [
        "DEFINE INDEX IF NOT EXISTS user_email ON TABLE user COLUMNS email UNIQUE",
        "DEFINE INDEX IF NOT EXISTS cart_owner ON TABLE cart COLUMNS owner UNIQUE",
        "DEFINE INDEX IF NOT EXISTS refresh_token_hash ON TABLE refresh_token COLUMNS tokenHash UNIQUE",
        "DEFINE INDEX IF NOT EXISTS order_number ON TABLE order COLUMNS orderNumber UNIQUE",
        "DEFINE INDEX IF NOT EXISTS order_user ON TABLE order COLUMNS userId",
    ];

    for statement in statements {
        db.query(statement)
            .await
            .map_err(|e| AppError::database(format!("Schema definition failed: {e}")))?;
    }

    Ok(())
}
