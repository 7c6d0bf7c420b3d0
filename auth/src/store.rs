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

use crate::source::TokenResponse;
use crate::{AccessToken, Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const STORE_FILE_NAME: &str = "StoredCredential.json";

/// The tokens persisted for one user between runs.
#[derive(Clone, Default, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct StoredCredential {
    /// The most recent access token, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// The long-lived refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When `access_token` expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    pub(crate) fn from_response(response: &TokenResponse, previous_refresh: Option<&str>) -> Self {
        Self {
            access_token: Some(response.access_token.clone()),
            // The token endpoint may rotate the refresh token, otherwise the
            // previous one remains valid.
            refresh_token: response
                .refresh_token
                .clone()
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// The stored access token, if there is one.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.access_token.as_ref().map(|value| AccessToken {
            value: value.clone(),
            expires: self.expires_at,
        })
    }
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredCredential")
            .field("access_token", &self.access_token.as_ref().map(|_| "[censored]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[censored]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Persists [StoredCredential] values in a directory.
///
/// All users share a single JSON file, a map from the user id to its
/// credential. The directory is created the first time a credential is
/// stored.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The path of the file holding the credentials.
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE_NAME)
    }

    /// Returns the credential stored for `user`, if any.
    pub async fn load(&self, user: &str) -> Result<Option<StoredCredential>> {
        let mut all = self.read_all().await?;
        Ok(all.remove(user))
    }

    /// Saves `credential` for `user`, replacing any previous value.
    pub async fn store(&self, user: &str, credential: &StoredCredential) -> Result<()> {
        let mut all = self.read_all().await?;
        all.insert(user.to_string(), credential.clone());
        self.write_all(&all).await
    }

    /// Removes any credential stored for `user`.
    pub async fn delete(&self, user: &str) -> Result<()> {
        let mut all = self.read_all().await?;
        if all.remove(user).is_some() {
            self.write_all(&all).await?;
        }
        Ok(())
    }

    async fn read_all(&self) -> Result<BTreeMap<String, StoredCredential>> {
        let contents = match tokio::fs::read(self.path()).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(Error::wrap_io(e)),
        };
        serde_json::from_slice(&contents).map_err(Error::wrap_serialization)
    }

    async fn write_all(&self, all: &BTreeMap<String, StoredCredential>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(Error::wrap_io)?;
        let contents = serde_json::to_vec_pretty(all).map_err(Error::wrap_serialization)?;
        let path = self.path();
        let temp = self.temp_path();
        // The mode only applies to new files, discard any leftover.
        match tokio::fs::remove_file(&temp).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(Error::wrap_io(e)),
            _ => {}
        }
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options.open(&temp).await.map_err(Error::wrap_io)?;
        file.write_all(&contents).await.map_err(Error::wrap_io)?;
        file.sync_all().await.map_err(Error::wrap_io)?;
        drop(file);
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(Error::wrap_io)?;
        tracing::debug!(path = %path.display(), "updated token store");
        Ok(())
    }

    /// Written in full, then renamed over [Self::path].
    fn temp_path(&self) -> PathBuf {
        self.dir
            .join(format!("{STORE_FILE_NAME}.{}.tmp", std::process::id()))
    }
}
