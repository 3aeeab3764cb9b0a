use std::fmt::Debug;

use axum::{
    body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `{"_status": <code>, "data": ...}` envelope used by the informational
/// endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponse<T> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// `{"_status": <code>, "error": ...}` envelope.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponseError<E> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    error: Option<E>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJson<T>(pub EncapsulatedResponse<T>);

impl<T> EncapsulatedJson<T> {
    #[inline]
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self(EncapsulatedResponse { status_code: StatusCode::OK, data: Some(data) })
    }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJsonError<E>(pub EncapsulatedResponseError<E>);

impl<E> EncapsulatedJsonError<E> {
    #[inline]
    #[must_use]
    pub const fn err(error: E) -> Self {
        Self(EncapsulatedResponseError {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            error: Some(error),
        })
    }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }
}

impl<T> IntoResponse for EncapsulatedJson<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response { json_body(self.0.status_code, &self.0) }
}

impl<E> IntoResponse for EncapsulatedJsonError<E>
where
    E: Debug + Serialize,
{
    fn into_response(self) -> Response { json_body(self.0.status_code, &self.0) }
}

/// Bare `{"error": "<message>"}` body, for endpoints whose success payload is
/// not wrapped in an envelope either.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorMessage {
    pub error: String,
}

impl ErrorMessage {
    #[inline]
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self { Self { error: error.into() } }

    #[must_use]
    pub fn into_response_with(self, status_code: StatusCode) -> Response {
        json_body(status_code, &self)
    }
}

fn json_body<B: Serialize>(status_code: StatusCode, body: &B) -> Response {
    let body = body::Body::from(serde_json::to_vec(body).expect("body is serializable"));

    Response::builder()
        .status(status_code)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(body)
        .expect("Build `Axum` response successfully; qed")
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Error {
    #[serde(rename = "type")]
    pub type_: ErrorType,

    pub message: String,

    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty")]
    pub additional_fields: IndexMap<String, serde_json::Value>,
}

#[macro_export]
macro_rules! json_response {
    (status: $status:expr,data: $data:expr) => {
        $crate::response::EncapsulatedJson::ok($data).status_code($status).into_response()
    };

    (status: $status:expr,error: $error:expr) => {
        $crate::response::EncapsulatedJsonError::err($error).status_code($status).into_response()
    };

    (reason: $reason:expr,status: $status:expr,error: $error:expr) => {{
        if $status == ::axum::http::StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(status_code = $status.as_u16(), "Internal Server Error: {:?}", $reason);
        } else {
            tracing::warn!(status_code = $status.as_u16(), "Response Error: {:?}", $reason);
        }

        $crate::json_response! { status: $status, error: $error }
    }};
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    NotFound,
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::{EncapsulatedJson, ErrorMessage};

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(EncapsulatedJson::ok(7_u32).0).unwrap();
        assert_eq!(value, serde_json::json!({ "_status": 200, "data": 7 }));
    }

    #[tokio::test]
    async fn test_error_message_response() {
        let response = ErrorMessage::new("boom").into_response_with(StatusCode::BAD_GATEWAY);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "boom" }));
    }

    #[test]
    fn test_not_found_macro() {
        let response = json_response! {
            status: StatusCode::NOT_FOUND,
            error: super::Error {
                type_: super::ErrorType::NotFound,
                message: "nothing here".to_string(),
                additional_fields: indexmap::IndexMap::default(),
            }
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
