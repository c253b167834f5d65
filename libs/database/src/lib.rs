//! Connection management for the tag service's PostgreSQL store.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL support with SeaORM
//! - `config` - `core_config::FromEnv` for [`postgres::PostgresConfig`]
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//! use database::common::RetryConfig;
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(config, Some(RetryConfig::new())).await?;
//! postgres::run_migrations::<Migrator>(&db, "tags_api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
