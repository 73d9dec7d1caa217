// API module - HTTP endpoints

pub mod dashboard;
pub mod middleware;
pub mod tickets;

use axum::{routing::get, Router};

use crate::api::middleware::session::AppState;

/// Every route of the application, ready for the session and tracing layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(tickets::router())
        .merge(dashboard::router())
        .route("/ws", get(crate::realtime::ws::ws_handler))
}
