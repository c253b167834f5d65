use axum::Router;

pub mod health;
pub mod tags;

/// API routes without the `/api` prefix, which `create_router` adds.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().nest("/tag", tags::router(state))
}

/// `/ready`, checking Postgres and the search index.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
