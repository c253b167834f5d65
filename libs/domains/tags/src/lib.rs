//! Tags Domain
//!
//! Get-or-create tags by name, prefix search over a search index, and
//! ordered entity-to-tag links.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌────────────────┐
//! │   Service   │ ───► │ IndexPublisher │  ← best-effort background upserts
//! └──┬───────┬──┘      └───────┬────────┘
//!    │       │                 │
//! ┌──▼───┐ ┌─▼─────────────────▼┐
//! │Store │ │      TagIndex      │
//! └──────┘ └────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tags::{
//!     InMemoryTagIndex, InMemoryTagStore, TagService, TagServiceConfig, handlers,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let service = Arc::new(TagService::new(
//!     Arc::new(InMemoryTagStore::new()),
//!     Arc::new(InMemoryTagIndex::new()),
//!     &TagServiceConfig::default(),
//! ));
//!
//! let router = axum::Router::new().nest("/tag", handlers::router(service));
//! # }
//! ```

pub mod config;
pub mod elasticsearch;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod index;
pub mod models;
pub mod postgres;
pub mod publisher;
pub mod repository;
pub mod service;

pub use config::TagServiceConfig;
pub use elasticsearch::{ElasticsearchConfig, ElasticsearchIndex, RefreshPolicy};
pub use error::{IndexError, TagError, TagResult};
pub use handlers::ApiDoc;
pub use index::{InMemoryTagIndex, TagIndex};
pub use models::{EntityTagLink, Tag, Upserted};
pub use postgres::PgTagStore;
pub use publisher::{IndexPublisher, PublisherStats};
pub use repository::{InMemoryTagStore, TagStore};
pub use service::{TagService, order_by_links};
