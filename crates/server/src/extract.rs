//! Request body extractors that answer with the JSON error envelope.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::errors::JsonApiError;

/// `Json<T>` whose rejections become `400 Validation Error` bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// A body that may be omitted entirely.
///
/// An empty body yields `T::default()`. Anything else must parse as `T`; a
/// malformed body is rejected like [`ApiJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Completion {
        duration_hours: Option<f64>,
    }

    fn request(body: &'static str) -> Request {
        http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn empty_body_means_default() {
        let OptionalJson(value) = OptionalJson::<Completion>::from_request(request(""), &()).await.unwrap();
        assert_eq!(value, Completion::default());
    }

    #[tokio::test]
    async fn malformed_optional_body_is_rejected() {
        let err = OptionalJson::<Completion>::from_request(request(r#"{"durationHours":"two"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "Validation Error");
        assert!(err.detail.is_some());

        let err = OptionalJson::<Completion>::from_request(request("{not json"), &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn api_json_parses_and_rejects() {
        let ApiJson(value) = ApiJson::<Completion>::from_request(request(r#"{"durationHours":2.5}"#), &()).await.unwrap();
        assert_eq!(value.duration_hours, Some(2.5));

        let err = ApiJson::<Completion>::from_request(request(r#"{"durationHours":"two"}"#), &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error, "Validation Error");
    }
}
