use crate::errors::AppError;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Query string counterpart of [`ValidatedJson`](super::ValidatedJson).
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state).await?;
        data.validate()?;
        Ok(ValidatedQuery(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Params {
        #[validate(range(min = 1))]
        entity_id: i64,
    }

    async fn extract(uri: &str) -> Result<ValidatedQuery<Params>, AppError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ValidatedQuery::<Params>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_query() {
        let ValidatedQuery(params) = extract("/x?entity_id=5").await.unwrap();
        assert_eq!(params.entity_id, 5);
    }

    #[tokio::test]
    async fn test_missing_param_is_bad_request() {
        let err = extract("/x").await.err().unwrap();
        assert!(matches!(err, AppError::QueryExtractorRejection(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_is_validation_error() {
        let err = extract("/x?entity_id=0").await.err().unwrap();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
