use axum::Router;
use domain_tags::handlers;

pub fn router(state: &crate::state::AppState) -> Router {
    handlers::router(state.tags.clone())
}
