//! Shared application state.

use domain_tags::{ElasticsearchIndex, PgTagStore, TagService};
use std::sync::Arc;

pub type Tags = TagService<PgTagStore, ElasticsearchIndex>;

/// Cloned per handler; every field is a cheap handle
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    pub tags: Arc<Tags>,
}
