use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::realtime::Broadcaster;

/// Creates the session layer backing the dashboard's flash notices.
pub async fn create_session_layer(
    pool: SqlitePool,
) -> Result<SessionManagerLayer<SqliteStore>, sqlx::Error> {
    let session_store = SqliteStore::new(pool);
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)));

    Ok(session_layer)
}

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub broadcaster: Arc<Broadcaster>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.pool.clone()
    }
}
