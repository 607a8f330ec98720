use tower_sessions::{
    Expiry, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;

use crate::db::DbPool;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sf_session";

/// Sessions live for a fixed 24 hours. The layer default below only covers
/// pre-login sessions; login pins an absolute deadline so the lifetime does
/// not slide with activity.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Create the Postgres-backed session layer. Runs the store's own migration
/// for the sessions table.
pub async fn create_session_layer(
    pool: &DbPool,
    secure: bool,
) -> anyhow::Result<SessionManagerLayer<PostgresStore>> {
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_LIFETIME_HOURS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/"))
}
