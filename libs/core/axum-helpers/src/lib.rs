//! # Axum Helpers
//!
//! Shared HTTP plumbing for the workspace's axum services.
//!
//! - **[`errors`]**: [`AppError`] and the JSON [`ErrorResponse`] body with stable [`ErrorCode`]s
//! - **[`extractors`]**: [`ValidatedJson`] and [`ValidatedQuery`]
//! - **[`server`]**: router assembly with OpenAPI UIs, health/readiness, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{ValidatedJson, ValidatedQuery};
