// Copyright 2021 Google LLC
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

//! The `google-cloud-auth` crate obtains OAuth2 access tokens for a desktop
//! (installed) application.
//!
//! The first run walks the user through the [installed application flow]:
//! the user visits an authorization URL in a browser, the browser redirects to
//! a loopback address served by this crate, and the authorization code is
//! exchanged for an access token and a refresh token. The tokens are persisted
//! in a [FileTokenStore], and later runs reuse the refresh token without any
//! user interaction.
//!
//! [installed application flow]: https://developers.google.com/identity/protocols/oauth2/native-app

use chrono::{DateTime, Duration, Utc};
use source::{RefresherSource, Source, StaticSource};
use std::error::Error as StdError;
use std::sync::Arc;

mod installed;
mod receiver;
mod secrets;
mod source;
mod store;

pub use installed::{InstalledFlow, InstalledFlowBuilder};
pub use secrets::ClientSecrets;
pub use store::{FileTokenStore, StoredCredential};

/// Grants full control over Cloud Storage buckets and objects.
pub const DEVSTORAGE_FULL_CONTROL: &str = "https://www.googleapis.com/auth/devstorage.full_control";

/// Tokens are treated as expired this long before their actual expiration, to
/// avoid races with clock skew and in-flight requests.
const EXPIRATION_SLACK_SECONDS: i64 = 10;

/// The categories of errors produced by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Reading or writing a local file failed.
    Io,
    /// A JSON document could not be parsed or produced.
    Serialization,
    /// The token endpoint could not be reached, or it rejected the request.
    Http,
    /// The configuration (client secrets, scopes) is invalid.
    Validation,
    /// The user denied the request, or the redirect was malformed.
    Authorization,
    /// Anything else.
    Other,
}

/// The error type for all operations in this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    /// Creates an error from a message.
    ///
    /// Applications may need this to test code that handles these errors.
    pub fn new(msg: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            kind,
            message: Some(msg.into()),
            source: None,
        }
    }

    pub(crate) fn new_with_error<E>(msg: impl Into<String>, error: E, kind: ErrorKind) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: Some(msg.into()),
            source: Some(Box::new(error)),
        }
    }

    pub(crate) fn wrap<E>(error: E, kind: ErrorKind) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind,
            message: None,
            source: Some(Box::new(error)),
        }
    }

    pub(crate) fn wrap_io(error: std::io::Error) -> Self {
        Self::wrap(error, ErrorKind::Io)
    }

    pub(crate) fn wrap_serialization(error: serde_json::Error) -> Self {
        Self::wrap(error, ErrorKind::Serialization)
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.message, &self.source) {
            (Some(msg), Some(source)) => write!(f, "{msg}: {source}"),
            (Some(msg), None) => write!(f, "{msg}"),
            (None, Some(source)) => write!(f, "{source}"),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// AccessToken holds a token value that can be used in Authorization headers to
/// authenticate with Google Cloud APIs.
#[derive(Clone, PartialEq)]
pub struct AccessToken {
    /// The actual token.
    pub value: String,
    /// The time when a token expires, if known.
    pub expires: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Returns true if the token can still be used.
    ///
    /// Tokens without a known expiration are valid as long as they are not
    /// empty.
    pub fn is_valid(&self) -> bool {
        if self.value.is_empty() {
            return false;
        }
        match self.expires {
            Some(expires) => expires - Duration::seconds(EXPIRATION_SLACK_SECONDS) > Utc::now(),
            None => true,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[censored]")
            .field("expires", &self.expires)
            .finish()
    }
}

/// A [AccessToken] producer that is automatically refreshed and can be shared
/// across tasks.
#[derive(Clone)]
pub struct Credential {
    source: Arc<dyn Source>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").finish_non_exhaustive()
    }
}

impl Credential {
    /// Returns a valid [AccessToken], refreshing it first if needed.
    pub async fn access_token(&self) -> Result<AccessToken> {
        self.source.token().await
    }

    /// Creates a credential that always returns `value`.
    ///
    /// Useful when the token is minted out of band, for example with
    /// `gcloud auth print-access-token`, and in tests.
    pub fn from_static_token(value: impl Into<String>) -> Self {
        Self::from_source(StaticSource {
            token: AccessToken {
                value: value.into(),
                expires: None,
            },
        })
    }

    /// Wraps `source` in an in-memory cache.
    pub(crate) fn from_source<S>(source: S) -> Self
    where
        S: Source + 'static,
    {
        Self {
            source: Arc::new(RefresherSource::new(source)),
        }
    }

    /// Like [Credential::from_source], with an already fetched token.
    pub(crate) fn from_source_with_token<S>(source: S, token: AccessToken) -> Self
    where
        S: Source + 'static,
    {
        Self {
            source: Arc::new(RefresherSource::with_token(source, token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, true; "no expiration")]
    #[test_case(Some(3600), true; "far in the future")]
    #[test_case(Some(5), false; "inside slack")]
    #[test_case(Some(-60), false; "expired")]
    fn access_token_validity(offset: Option<i64>, want: bool) {
        let token = AccessToken {
            value: "test-only-token".into(),
            expires: offset.map(|s| Utc::now() + Duration::seconds(s)),
        };
        assert_eq!(token.is_valid(), want, "{token:?}");
    }

    #[test]
    fn empty_token_is_invalid() {
        let token = AccessToken {
            value: String::new(),
            expires: None,
        };
        assert!(!token.is_valid());
    }

    #[test]
    fn debug_censors_token() {
        let token = AccessToken {
            value: "test-only-secret".into(),
            expires: None,
        };
        let fmt = format!("{token:?}");
        assert!(!fmt.contains("test-only-secret"), "{fmt}");
    }

    #[test]
    fn error_display() {
        let err = Error::new("bad scopes", ErrorKind::Validation);
        assert_eq!(err.to_string(), "bad scopes");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.source().is_none());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::new_with_error("cannot read secrets", io, ErrorKind::Io);
        assert_eq!(err.to_string(), "cannot read secrets: no such file");
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn static_token() -> anyhow::Result<()> {
        let cred = Credential::from_static_token("test-only-token");
        let token = cred.access_token().await?;
        assert_eq!(token.value, "test-only-token");
        assert_eq!(token.expires, None);
        Ok(())
    }
}
