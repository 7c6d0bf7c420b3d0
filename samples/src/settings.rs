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

//! Loads the sample settings from a JSON file.
//!
//! ```json
//! {
//!   "project": "my-project",
//!   "bucket": "my-project-storage-sample",
//!   "prefix": "storage-sample/"
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The template users copy to create their settings file.
pub const TEMPLATE_FILE: &str = "sample_settings.json.template";
/// The default location of the settings file.
pub const DEFAULT_FILE: &str = "sample_settings.json";

const PROJECT_VAR: &str = "GOOGLE_CLOUD_PROJECT";
const DEFAULT_PREFIX: &str = "storage-sample/";

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("cannot find the settings file {}, create it from sample_settings.json.template", path.display())]
    NotFound { path: PathBuf },
    #[error("cannot read the settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse the settings file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("the settings file has no project, set it in the file or in $GOOGLE_CLOUD_PROJECT")]
    MissingProject,
}

/// The settings used by the sample. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// The project that owns the bucket.
    pub project: String,
    /// The bucket used by the sample, created if needed.
    pub bucket: String,
    /// All objects created by the sample start with this prefix.
    pub prefix: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    project: Option<String>,
    bucket: Option<String>,
    prefix: Option<String>,
}

impl Settings {
    /// Loads the settings from `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = match tokio::fs::read(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SettingsError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let settings = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Parses the settings, applying the defaults for any missing field.
    pub fn from_json(contents: &[u8]) -> Result<Self, SettingsError> {
        let file: SettingsFile = serde_json::from_slice(contents)?;
        let project = file
            .project
            .filter(|p| !p.is_empty())
            .or_else(|| std::env::var(PROJECT_VAR).ok().filter(|p| !p.is_empty()))
            .ok_or(SettingsError::MissingProject)?;
        let bucket = file
            .bucket
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| format!("{project}-storage-sample"));
        let prefix = file.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        Ok(Self {
            project,
            bucket,
            prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoped_env::ScopedEnv;
    use serde_json::json;

    #[test]
    #[serial_test::serial]
    fn full() -> anyhow::Result<()> {
        let _e = ScopedEnv::remove(PROJECT_VAR);
        let contents = json!({"project": "proj-A", "bucket": "bkt-A", "prefix": "x/"});
        let got = Settings::from_json(&serde_json::to_vec(&contents)?)?;
        let want = Settings {
            project: "proj-A".into(),
            bucket: "bkt-A".into(),
            prefix: "x/".into(),
        };
        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn defaults() -> anyhow::Result<()> {
        let _e = ScopedEnv::remove(PROJECT_VAR);
        let got = Settings::from_json(br#"{"project": "proj-A"}"#)?;
        assert_eq!(got.bucket, "proj-A-storage-sample");
        assert_eq!(got.prefix, DEFAULT_PREFIX);

        // An empty prefix is a valid choice.
        let got = Settings::from_json(br#"{"project": "proj-A", "prefix": ""}"#)?;
        assert_eq!(got.prefix, "");
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn project_from_environment() -> anyhow::Result<()> {
        let _e = ScopedEnv::set(PROJECT_VAR, "env-project");
        let got = Settings::from_json(b"{}")?;
        assert_eq!(got.project, "env-project");
        assert_eq!(got.bucket, "env-project-storage-sample");

        // The file takes precedence.
        let got = Settings::from_json(br#"{"project": "file-project"}"#)?;
        assert_eq!(got.project, "file-project");
        Ok(())
    }

    #[test]
    #[serial_test::serial]
    fn missing_project() {
        let _e = ScopedEnv::remove(PROJECT_VAR);
        let err = Settings::from_json(br#"{"bucket": "bkt-A"}"#).unwrap_err();
        assert!(matches!(err, SettingsError::MissingProject), "{err:?}");
    }

    #[test]
    fn bad_json() {
        let err = Settings::from_json(b"not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)), "{err:?}");
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn load() -> anyhow::Result<()> {
        let _e = ScopedEnv::remove(PROJECT_VAR);
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(DEFAULT_FILE);
        std::fs::write(&path, r#"{"project": "proj-A", "bucket": "bkt-A", "prefix": "x/"}"#)?;
        let got = Settings::load(&path).await?;
        assert_eq!(got.bucket, "bkt-A");
        Ok(())
    }

    #[tokio::test]
    async fn load_missing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = Settings::load(dir.path().join(DEFAULT_FILE))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::NotFound { .. }), "{err:?}");
        let msg = err.to_string();
        assert!(msg.contains(DEFAULT_FILE), "{msg}");
        assert!(msg.contains(TEMPLATE_FILE), "{msg}");
        Ok(())
    }
}
