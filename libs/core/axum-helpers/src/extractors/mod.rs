//! Extractors that reject with the shared [`ErrorResponse`](crate::errors::ErrorResponse) body.

pub mod validated_json;
pub mod validated_query;

pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
