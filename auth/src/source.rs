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

use crate::store::{FileTokenStore, StoredCredential};
use crate::{AccessToken, Error, ErrorKind, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const REFRESH_GRANT: &str = "refresh_token";

/// A producer of [AccessToken].
#[async_trait]
pub(crate) trait Source: Send + Sync {
    async fn token(&self) -> Result<AccessToken>;
}

/// Always returns the same token.
pub(crate) struct StaticSource {
    pub(crate) token: AccessToken,
}

#[async_trait]
impl Source for StaticSource {
    async fn token(&self) -> Result<AccessToken> {
        Ok(self.token.clone())
    }
}

/// A [Source] that trades a refresh token for new access tokens.
///
/// Each new token is written back to the token store, so the next run of the
/// application can start from it.
pub(crate) struct RefreshTokenSource {
    pub(crate) http: reqwest::Client,
    pub(crate) token_uri: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) store: FileTokenStore,
    pub(crate) user: String,
}

impl RefreshTokenSource {
    async fn fetch_access_token(&self) -> Result<AccessToken> {
        let Some(refresh_token) = self.refresh_token.as_deref() else {
            return Err(Error::new(
                format!(
                    "the stored credential for {} expired and has no refresh token, delete {} to authorize again",
                    self.user,
                    self.store.path().display()
                ),
                ErrorKind::Authorization,
            ));
        };
        tracing::debug!(user = %self.user, "refreshing access token");
        let response = request_token(
            &self.http,
            &self.token_uri,
            &RefreshTokenRequest {
                grant_type: REFRESH_GRANT,
                refresh_token,
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            },
        )
        .await?;

        let stored = StoredCredential::from_response(&response, Some(refresh_token));
        self.store.store(&self.user, &stored).await?;
        Ok(response.access_token())
    }
}

#[async_trait]
impl Source for RefreshTokenSource {
    async fn token(&self) -> Result<AccessToken> {
        self.fetch_access_token().await
    }
}

/// Wraps another [Source] and keeps returning the same [AccessToken] as long
/// as it is valid.
pub(crate) struct RefresherSource {
    current_token: Mutex<AccessToken>,
    source: Box<dyn Source>,
}

impl RefresherSource {
    pub(crate) fn new<S: Source + 'static>(source: S) -> Self {
        Self::with_token(
            source,
            AccessToken {
                value: String::new(),
                expires: None,
            },
        )
    }

    pub(crate) fn with_token<S: Source + 'static>(source: S, token: AccessToken) -> Self {
        Self {
            current_token: Mutex::new(token),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl Source for RefresherSource {
    async fn token(&self) -> Result<AccessToken> {
        let mut cur_token = self.current_token.lock().await;
        if cur_token.is_valid() {
            return Ok(cur_token.clone());
        }
        let new_token = self.source.token().await?;
        *cur_token = new_token;
        Ok(cur_token.clone())
    }
}

/// POSTs a form to the token endpoint and parses the response.
pub(crate) async fn request_token<T>(
    http: &reqwest::Client,
    token_uri: &str,
    form: &T,
) -> Result<TokenResponse>
where
    T: Serialize + ?Sized,
{
    let res = http.post(token_uri).form(form).send().await.map_err(|e| {
        Error::new_with_error(
            "unable to make request to oauth endpoint",
            e,
            ErrorKind::Http,
        )
    })?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(Error::new(
            format!("bad request with status: {status}, body: {body}"),
            ErrorKind::Http,
        ));
    }
    let body = res
        .bytes()
        .await
        .map_err(|e| Error::new_with_error("unable to read token response", e, ErrorKind::Http))?;
    serde_json::from_slice(&body).map_err(Error::wrap_serialization)
}

/// The request body to refresh an access token.
#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

/// The response of a token exchange or token refresh.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    #[serde(default)]
    pub(crate) expires_in: Option<i64>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
}

impl TokenResponse {
    pub(crate) fn access_token(&self) -> AccessToken {
        AccessToken {
            value: self.access_token.clone(),
            expires: self
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Clone)]
    struct FakeSource {
        static_time: DateTime<Utc>,
        counter: Arc<Mutex<i64>>,
    }

    #[async_trait]
    impl Source for FakeSource {
        async fn token(&self) -> Result<AccessToken> {
            let mut count = self.counter.lock().await;
            let cur_count = *count;
            *count += 1;
            Ok(AccessToken {
                value: format!("token-{cur_count}"),
                expires: Some(self.static_time),
            })
        }
    }

    #[tokio::test]
    async fn refresher_returns_same_value() -> anyhow::Result<()> {
        let it = RefresherSource::new(FakeSource {
            static_time: Utc::now() + Duration::seconds(20),
            counter: Arc::new(Mutex::new(0)),
        });
        let tok1 = it.token().await?;
        let tok2 = it.token().await?;
        assert_eq!(tok1.value, "token-0");
        assert_eq!(tok1.value, tok2.value);
        Ok(())
    }

    #[tokio::test]
    async fn refresher_returns_new_value() -> anyhow::Result<()> {
        let it = RefresherSource::new(FakeSource {
            static_time: Utc::now() - Duration::seconds(20),
            counter: Arc::new(Mutex::new(0)),
        });
        let tok1 = it.token().await?;
        let tok2 = it.token().await?;
        assert_eq!(tok1.value, "token-0");
        assert_ne!(tok1.value, tok2.value);
        Ok(())
    }

    #[tokio::test]
    async fn refresher_uses_initial_token() -> anyhow::Result<()> {
        let initial = AccessToken {
            value: "initial".into(),
            expires: Some(Utc::now() + Duration::seconds(3600)),
        };
        let it = RefresherSource::with_token(
            FakeSource {
                static_time: Utc::now(),
                counter: Arc::new(Mutex::new(0)),
            },
            initial.clone(),
        );
        assert_eq!(it.token().await?, initial);
        Ok(())
    }

    fn refresh_source(server: &Server, dir: &tempfile::TempDir) -> RefreshTokenSource {
        RefreshTokenSource {
            http: reqwest::Client::new(),
            token_uri: server.url("/token").to_string(),
            client_id: "test-only-client-id".into(),
            client_secret: "test-only-client-secret".into(),
            refresh_token: Some("test-only-refresh-token".into()),
            store: FileTokenStore::new(dir.path()),
            user: "user".into(),
        }
    }

    #[tokio::test]
    async fn refresh_token_source_success() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("POST", "/token"),
                request::body(url_decoded(contains(("grant_type", "refresh_token")))),
                request::body(url_decoded(contains((
                    "refresh_token",
                    "test-only-refresh-token"
                )))),
                request::body(url_decoded(contains(("client_id", "test-only-client-id")))),
            ])
            .respond_with(json_encoded(json!({
                "access_token": "test-only-access-token",
                "expires_in": 3600,
                "token_type": "Bearer",
            }))),
        );
        let dir = tempfile::tempdir()?;
        let source = refresh_source(&server, &dir);
        let token = source.token().await?;
        assert_eq!(token.value, "test-only-access-token");
        assert!(token.is_valid(), "{token:?}");

        // The refreshed token is persisted, and the refresh token is kept.
        let stored = source.store.load("user").await?.expect("credential is stored");
        assert_eq!(stored.access_token.as_deref(), Some("test-only-access-token"));
        assert_eq!(stored.refresh_token.as_deref(), Some("test-only-refresh-token"));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_source_http_error() -> anyhow::Result<()> {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/token"))
                .respond_with(status_code(400).body(r#"{"error": "invalid_grant"}"#)),
        );
        let dir = tempfile::tempdir()?;
        let source = refresh_source(&server, &dir);
        let err = source.token().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http, "{err}");
        assert!(err.to_string().contains("invalid_grant"), "{err}");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_source_without_refresh_token() -> anyhow::Result<()> {
        let server = Server::run();
        let dir = tempfile::tempdir()?;
        let mut source = refresh_source(&server, &dir);
        source.refresh_token = None;
        let err = source.token().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization, "{err}");
        Ok(())
    }
}
