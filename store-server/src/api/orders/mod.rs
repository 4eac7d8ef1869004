//! Orders API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes(state))
}

fn order_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::my_orders))
        .route("/{id}", get(handler::get_by_id))
        .merge(admin_routes(state))
}

fn admin_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/admin/list", get(handler::admin_list))
        .route("/admin/{id}", patch(handler::admin_update))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff))
}
