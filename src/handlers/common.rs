use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{errors::ServiceError, ApiResponse};

/// Standard success response
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// Standard created response
pub fn created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Success response with a human readable note
pub fn ok_with_message<T>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::with_message(data, message))
}

/// JSON body that is deserialized and validated before the handler runs.
///
/// Malformed JSON and failed validation both surface as a 400 in the
/// standard error envelope.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ServiceError {
    ServiceError::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Probe {
        #[validate(length(min = 2))]
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_bodies() {
        let ValidatedJson(probe) =
            ValidatedJson::<Probe>::from_request(json_request(r#"{"name":"ok"}"#), &())
                .await
                .unwrap();
        assert_eq!(probe.name, "ok");
    }

    #[tokio::test]
    async fn rejects_invalid_and_malformed_bodies() {
        let short =
            ValidatedJson::<Probe>::from_request(json_request(r#"{"name":"x"}"#), &()).await;
        assert_matches!(short, Err(ServiceError::ValidationError(_)));

        let broken = ValidatedJson::<Probe>::from_request(json_request("{"), &()).await;
        assert_matches!(broken, Err(ServiceError::ValidationError(_)));
    }
}
