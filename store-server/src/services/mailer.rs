//! Mail collaborator
//!
//! Transactional email is an external concern; the core only needs a seam
//! to trigger sends through. The implementation is constructed once at
//! process start and injected, never reached through a global.

use async_trait::async_trait;

use crate::db::models::Order;
use crate::utils::AppResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Notify a customer that their order was placed
    async fn send_order_confirmation(&self, order: &Order) -> AppResult<()>;

    /// Deliver a password-reset token to a user
    async fn send_password_reset(&self, email: &str, reset_token: &str) -> AppResult<()>;
}

/// Log-only mailer; template rendering and delivery live outside this
/// service
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_order_confirmation(&self, order: &Order) -> AppResult<()> {
        tracing::info!(
            order_number = %order.order_number,
            total = order.totals.total,
            "Order confirmation queued"
        );
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, _reset_token: &str) -> AppResult<()> {
        tracing::info!(email = %email, "Password reset mail queued");
        Ok(())
    }
}
