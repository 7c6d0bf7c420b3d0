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

use crate::{Error, ErrorKind, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const CONSOLE_URL: &str = "https://console.cloud.google.com/apis/credentials";
const PLACEHOLDER_PREFIX: &str = "Enter ";

/// The OAuth2 client of a desktop application.
///
/// This is the `client_secret_*.json` file downloaded from the Google Cloud
/// console, for a client of type "Desktop app":
///
/// ```json
/// {
///   "installed": {
///     "client_id": "...",
///     "client_secret": "...",
///     "auth_uri": "https://accounts.google.com/o/oauth2/auth",
///     "token_uri": "https://oauth2.googleapis.com/token",
///     "redirect_uris": ["http://localhost"]
///   }
/// }
/// ```
#[derive(Clone, PartialEq)]
pub struct ClientSecrets {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<InstalledClient>,
}

#[derive(Deserialize)]
struct InstalledClient {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    auth_uri: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl ClientSecrets {
    /// Loads the client secrets from `path`.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await.map_err(|e| {
            Error::new_with_error(
                format!(
                    "cannot read client secrets from {}, download them from {CONSOLE_URL}",
                    path.display()
                ),
                e,
                ErrorKind::Io,
            )
        })?;
        Self::from_json(&contents)
    }

    /// Parses the client secrets from the contents of a JSON file.
    pub fn from_json(contents: &[u8]) -> Result<Self> {
        let file: ClientSecretsFile =
            serde_json::from_slice(contents).map_err(Error::wrap_serialization)?;
        let installed = file.installed.ok_or_else(|| {
            Error::new(
                "client secrets must be for an installed (desktop) application",
                ErrorKind::Validation,
            )
        })?;
        if installed.client_id.starts_with(PLACEHOLDER_PREFIX)
            || installed.client_secret.starts_with(PLACEHOLDER_PREFIX)
        {
            return Err(Error::new(
                format!(
                    "enter the client id and secret from {CONSOLE_URL} into the client secrets file"
                ),
                ErrorKind::Validation,
            ));
        }
        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
            auth_uri: installed
                .auth_uri
                .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: installed
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn auth_uri(&self) -> &str {
        &self.auth_uri
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }
}

impl std::fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[censored]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}
