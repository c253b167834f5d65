use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_tags::TagIndex;

/// Readiness: Postgres `SELECT 1` and an Elasticsearch ping.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
        (
            "search_index",
            Box::pin(async {
                state
                    .tags
                    .index()
                    .ping()
                    .await
                    .map_err(|e| format!("Search index ping failed: {}", e))
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
