use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_tags::{ElasticsearchIndex, PgTagStore, TagIndex, TagService};
use migration::Migrator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation so startup errors are reported in colour
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    if config.run_migrations {
        database::postgres::run_migrations::<Migrator>(&db, config.app.name)
            .await
            .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
    }

    let index = ElasticsearchIndex::new(config.elasticsearch.clone())
        .map_err(|e| eyre::eyre!("Failed to build Elasticsearch client: {}", e))?;

    // Tag creation does not depend on the index, so an unreachable index only degrades search
    match index.ping().await {
        Ok(()) => info!(url = %config.elasticsearch.url, "Elasticsearch reachable"),
        Err(e) => warn!(
            url = %config.elasticsearch.url,
            error = %e,
            "Elasticsearch unreachable at startup"
        ),
    }

    let tags = Arc::new(TagService::new(
        Arc::new(PgTagStore::new(db.clone())),
        Arc::new(index),
        &config.tags,
    ));

    let state = AppState {
        config,
        db,
        tags,
    };

    let api_routes = api::routes(&state);

    let router = create_router::<openapi::ApiDoc>(api_routes, Duration::from_secs(30))?;

    // /health: liveness with app name/version; /ready: Postgres and index checks
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting tags API (30s graceful shutdown)");

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: draining index publisher");
            state.tags.publisher().shutdown().await;

            let stats = state.tags.publisher().stats();
            info!(
                published = stats.published,
                failed = stats.failed,
                dropped = stats.dropped,
                "Index publisher stopped"
            );

            match state.db.close().await {
                Ok(()) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Tags API shutdown complete");
    Ok(())
}
