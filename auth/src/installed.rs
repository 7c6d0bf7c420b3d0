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

use crate::receiver::LocalServerReceiver;
use crate::secrets::ClientSecrets;
use crate::source::{RefreshTokenSource, request_token};
use crate::store::{FileTokenStore, StoredCredential};
use crate::{Credential, DEVSTORAGE_FULL_CONTROL, Error, ErrorKind, Result};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";
const STATE_LENGTH: usize = 32;

type Prompt = Arc<dyn Fn(&Url) + Send + Sync>;

/// Authorizes an installed application, reusing stored tokens when possible.
///
/// # Example
/// ```no_run
/// # use google_cloud_auth::{ClientSecrets, FileTokenStore, InstalledFlow};
/// # async fn sample() -> google_cloud_auth::Result<()> {
/// let secrets = ClientSecrets::from_file("client_secrets.json").await?;
/// let flow = InstalledFlow::builder(secrets)
///     .with_token_store(FileTokenStore::new("/home/me/.store/storage_sample"))
///     .build();
/// let credential = flow.authorize("user").await?;
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct InstalledFlow {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    store: FileTokenStore,
    auth_uri: String,
    token_uri: String,
    port: u16,
    prompt: Prompt,
    http: reqwest::Client,
}

impl std::fmt::Debug for InstalledFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledFlow")
            .field("secrets", &self.secrets)
            .field("scopes", &self.scopes)
            .field("store", &self.store)
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .field("port", &self.port)
            .finish()
    }
}

/// A builder for [InstalledFlow].
pub struct InstalledFlowBuilder {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    store: Option<FileTokenStore>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
    port: u16,
    prompt: Option<Prompt>,
}

impl InstalledFlowBuilder {
    /// Sets the scopes requested during authorization.
    ///
    /// Defaults to [DEVSTORAGE_FULL_CONTROL].
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets where tokens are persisted between runs.
    ///
    /// Defaults to `$HOME/.store/storage_sample`.
    pub fn with_token_store(mut self, store: FileTokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Overrides the authorization endpoint from the client secrets.
    pub fn with_auth_uri(mut self, uri: impl Into<String>) -> Self {
        self.auth_uri = Some(uri.into());
        self
    }

    /// Overrides the token endpoint from the client secrets.
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_uri = Some(uri.into());
        self
    }

    /// Sets the loopback port for the redirect. The default (0) picks any free
    /// port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Replaces how the authorization URL is shown to the user.
    ///
    /// By default the URL is printed to stdout.
    pub fn with_prompt<F>(mut self, prompt: F) -> Self
    where
        F: Fn(&Url) + Send + Sync + 'static,
    {
        self.prompt = Some(Arc::new(prompt));
        self
    }

    pub fn build(self) -> InstalledFlow {
        let auth_uri = self
            .auth_uri
            .unwrap_or_else(|| self.secrets.auth_uri().to_string());
        let token_uri = self
            .token_uri
            .unwrap_or_else(|| self.secrets.token_uri().to_string());
        InstalledFlow {
            secrets: self.secrets,
            scopes: self.scopes,
            store: self.store.unwrap_or_else(default_store),
            auth_uri,
            token_uri,
            port: self.port,
            prompt: self.prompt.unwrap_or_else(|| Arc::new(print_prompt)),
            http: reqwest::Client::new(),
        }
    }
}

impl InstalledFlow {
    pub fn builder(secrets: ClientSecrets) -> InstalledFlowBuilder {
        InstalledFlowBuilder {
            secrets,
            scopes: vec![DEVSTORAGE_FULL_CONTROL.to_string()],
            store: None,
            auth_uri: None,
            token_uri: None,
            port: 0,
            prompt: None,
        }
    }

    pub fn token_store(&self) -> &FileTokenStore {
        &self.store
    }

    /// Returns a [Credential] for `user`.
    ///
    /// Only prompts the user when there is no usable stored credential.
    pub async fn authorize(&self, user: &str) -> Result<Credential> {
        if self.scopes.is_empty() {
            return Err(Error::new("scopes must be provided", ErrorKind::Validation));
        }
        if let Some(stored) = self.store.load(user).await? {
            let usable =
                stored.refresh_token.is_some() || stored.access_token().is_some_and(|t| t.is_valid());
            if usable {
                tracing::debug!(%user, "using stored credential");
                return Ok(self.credential(user, stored));
            }
        }
        tracing::info!(%user, "no stored credential, starting authorization");
        let stored = self.authorize_interactively().await?;
        self.store.store(user, &stored).await?;
        Ok(self.credential(user, stored))
    }

    async fn authorize_interactively(&self) -> Result<StoredCredential> {
        let receiver = LocalServerReceiver::bind(self.port).await?;
        let state: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_LENGTH)
            .map(char::from)
            .collect();
        let url = self.authorization_url(receiver.redirect_uri(), &state)?;
        (self.prompt)(&url);
        let redirect_uri = receiver.redirect_uri().to_string();
        let code = receiver.wait_for_code(&state).await?;
        let response = request_token(
            &self.http,
            &self.token_uri,
            &AuthorizationCodeRequest {
                grant_type: AUTHORIZATION_CODE_GRANT,
                code: &code,
                redirect_uri: &redirect_uri,
                client_id: self.secrets.client_id(),
                client_secret: self.secrets.client_secret(),
            },
        )
        .await?;
        Ok(StoredCredential::from_response(&response, None))
    }

    /// Constructs the URL the user visits to authorize this application.
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        let scopes = self.scopes.join(" ");
        let params = [
            ("response_type", "code"),
            ("client_id", self.secrets.client_id()),
            ("redirect_uri", redirect_uri),
            ("scope", scopes.as_str()),
            ("access_type", "offline"),
            ("state", state),
        ];
        Url::parse_with_params(&self.auth_uri, &params)
            .map_err(|e| Error::new_with_error("invalid authorization URI", e, ErrorKind::Validation))
    }

    fn credential(&self, user: &str, stored: StoredCredential) -> Credential {
        let token = stored.access_token();
        let source = RefreshTokenSource {
            http: self.http.clone(),
            token_uri: self.token_uri.clone(),
            client_id: self.secrets.client_id().to_string(),
            client_secret: self.secrets.client_secret().to_string(),
            refresh_token: stored.refresh_token,
            store: self.store.clone(),
            user: user.to_string(),
        };
        match token {
            Some(token) => Credential::from_source_with_token(source, token),
            None => Credential::from_source(source),
        }
    }
}

fn default_store() -> FileTokenStore {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .unwrap_or_else(|| ".".into());
    FileTokenStore::new(std::path::Path::new(&home).join(".store").join("storage_sample"))
}

fn print_prompt(url: &Url) {
    println!("Please open the following address in your browser:");
    println!("  {url}");
}

/// The request body to exchange an authorization code.
#[derive(Serialize)]
struct AuthorizationCodeRequest<'a> {
    grant_type: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}
