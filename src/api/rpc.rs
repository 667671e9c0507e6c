//! Procedure-call plumbing
//!
//! Queries carry their input as `?input=<url-encoded JSON>`, mutations as
//! a JSON body. Outputs are wrapped as `{"result": {"data": ...}}`.

use axum::{
    Json, async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::Method,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, FieldErrors};

/// Procedure output, serialized inside the result envelope
#[derive(Debug)]
pub struct RpcOutput<T>(pub T);

#[derive(Serialize)]
struct RpcEnvelope<T> {
    result: RpcResult<T>,
}

#[derive(Serialize)]
struct RpcResult<T> {
    data: T,
}

impl<T: Serialize> IntoResponse for RpcOutput<T> {
    fn into_response(self) -> Response {
        Json(RpcEnvelope {
            result: RpcResult { data: self.0 },
        })
        .into_response()
    }
}

/// Typed procedure input
///
/// Rejections are `BAD_REQUEST` validation errors so callers always get
/// the same error envelope.
#[derive(Debug)]
pub struct RpcInput<T>(pub T);

fn query_input(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "input")
        .map(|(_, value)| value.into_owned())
}

fn invalid_input(message: impl std::fmt::Display) -> AppError {
    AppError::Validation(FieldErrors::form(format!("Invalid input: {message}")))
}

#[async_trait]
impl<S, T> FromRequest<S> for RpcInput<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = if req.method() == Method::GET {
            query_input(req.uri().query())
                .ok_or_else(|| invalid_input("missing `input` query parameter"))?
                .into_bytes()
        } else {
            Bytes::from_request(req, state)
                .await
                .map_err(|rejection| invalid_input(rejection.body_text()))?
                .to_vec()
        };

        serde_json::from_slice(&raw)
            .map(RpcInput)
            .map_err(invalid_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct NameInput {
        name: String,
    }

    #[tokio::test]
    async fn reads_query_input_for_get() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/profiles.getUserByName?input=%7B%22name%22%3A%22ferris%22%7D")
            .body(Body::empty())
            .unwrap();

        let RpcInput(input) = <RpcInput<NameInput> as FromRequest<()>>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(input.name, "ferris");
    }

    #[tokio::test]
    async fn reads_body_for_post() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/posts.create")
            .body(Body::from(r#"{"name":"corro","extra":1}"#))
            .unwrap();

        let RpcInput(input) = <RpcInput<NameInput> as FromRequest<()>>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(input.name, "corro");
    }

    #[tokio::test]
    async fn missing_or_malformed_input_is_bad_request() {
        let request = Request::builder()
            .uri("/profiles.getUserByName")
            .body(Body::empty())
            .unwrap();
        let error = <RpcInput<NameInput> as FromRequest<()>>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(error.code(), "BAD_REQUEST");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/posts.create")
            .body(Body::from(r#"{"nam":"x"}"#))
            .unwrap();
        let error = <RpcInput<NameInput> as FromRequest<()>>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }
}
