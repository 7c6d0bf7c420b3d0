// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A minimal client for the [Cloud Storage JSON API].
//!
//! The client covers the handful of RPCs needed to create and inspect a
//! bucket, list its objects, and move object data in and out of it. The
//! operations are defined by the [stub::Storage] trait, so applications can
//! substitute a test double for [client::Client].
//!
//! [Cloud Storage JSON API]: https://cloud.google.com/storage/docs/json_api

pub mod checksum;
pub mod client;
pub mod model;
pub mod paginator;
pub mod stub;
pub mod upload_source;

pub use client::Client;

/// The error type for all operations in this crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The service rejected the request with a structured error.
    #[error("the service returned an error: {error}")]
    Service {
        status: http::StatusCode,
        error: ApiError,
    },
    /// The service returned an error without a structured payload.
    #[error("the service returned HTTP status {status}")]
    Http {
        status: http::StatusCode,
        headers: http::HeaderMap,
        body: bytes::Bytes,
    },
    /// The request could not be sent, or the response could not be received.
    #[error("the request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Reading the payload or writing the downloaded data failed.
    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot serialize or deserialize a message: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("cannot obtain an access token: {0}")]
    Auth(#[from] google_cloud_auth::Error),
    /// The client is misconfigured.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl Error {
    /// The structured service error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Service { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The HTTP status code returned by the service, if any.
    pub fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Service { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error payload returned by the service.
///
/// See <https://cloud.google.com/storage/docs/json_api/v1/status-codes>.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct ApiError {
    /// The HTTP status code, repeated in the payload.
    pub code: i32,
    pub message: String,
    /// Additional details, such as the error reason.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Appends an entry to `errors`.
    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.errors.push(detail);
        self
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// One entry in [ApiError::errors].
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[non_exhaustive]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reason(mut self, v: impl Into<String>) -> Self {
        self.reason = Some(v.into());
        self
    }

    pub fn set_domain(mut self, v: impl Into<String>) -> Self {
        self.domain = Some(v.into());
        self
    }

    pub fn set_message(mut self, v: impl Into<String>) -> Self {
        self.message = Some(v.into());
        self
    }
}

/// The shape of error responses: `{"error": {...}}`.
#[derive(serde::Deserialize)]
pub(crate) struct ApiErrorReply {
    pub(crate) error: ApiError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_parse() -> anyhow::Result<()> {
        let body = json!({"error": {
            "code": 404,
            "message": "The specified bucket does not exist.",
            "errors": [{
                "domain": "global",
                "reason": "notFound",
                "message": "The specified bucket does not exist.",
            }],
        }});
        let reply: ApiErrorReply = serde_json::from_value(body)?;
        let want = ApiError::new(404, "The specified bucket does not exist.").with_detail(
            ErrorDetail::new()
                .set_domain("global")
                .set_reason("notFound")
                .set_message("The specified bucket does not exist."),
        );
        assert_eq!(reply.error, want);
        assert_eq!(
            reply.error.to_string(),
            "404: The specified bucket does not exist."
        );
        Ok(())
    }

    #[test]
    fn accessors() {
        let err = Error::Service {
            status: http::StatusCode::NOT_FOUND,
            error: ApiError::new(404, "not found"),
        };
        assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
        assert_eq!(err.api_error().map(|e| e.code), Some(404));

        let err = Error::Http {
            status: http::StatusCode::BAD_GATEWAY,
            headers: http::HeaderMap::new(),
            body: bytes::Bytes::from_static(b"<html>bad gateway</html>"),
        };
        assert_eq!(err.status(), Some(http::StatusCode::BAD_GATEWAY));
        assert!(err.api_error().is_none());

        let err = Error::from(std::io::Error::other("disk full"));
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("disk full"), "{err}");
    }
}
