//! API routing
//!
//! # Structure
//!
//! - [`auth`] - registration, login, refresh rotation, logout
//! - [`cart`] - cart CRUD, sync, guest merge
//! - [`orders`] - checkout and order queries
//! - [`products`] - catalog CRUD
//! - [`health`] - health check
//!
//! Each resource module exposes a `router()`; `build_app` layers the
//! cross-cutting middleware on the merged router.

pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware)
///
/// The state reference is only used to wire the staff gate onto admin
/// routes; handlers receive state through the usual `State` extractor.
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(auth::router())
        .merge(cart::router())
        .merge(orders::router(state))
        .merge(products::router(state))
        .merge(health::router())
}

/// Build the fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router(state)
        // CORS - handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - gzip responses
        .layer(CompressionLayer::new())
        // Trace - request logging at INFO level
        .layer(TraceLayer::new_for_http())
        // Request ID - unique id per request, propagated to the response
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
}
