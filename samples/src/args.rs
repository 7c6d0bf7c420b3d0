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

use clap::Parser;
use std::path::PathBuf;
use storage_samples::driver::DEFAULT_OBJECT_SIZE;
use storage_samples::settings::DEFAULT_FILE;

/// Command-line options for the sample.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = super::DESCRIPTION)]
pub struct Args {
    /// The settings file, with the project, bucket and object prefix.
    #[arg(long, env = "STORAGE_SAMPLE_SETTINGS", default_value = DEFAULT_FILE)]
    pub settings: PathBuf,

    /// The OAuth2 client secrets for an installed application.
    #[arg(long, env = "STORAGE_SAMPLE_CLIENT_SECRETS", default_value = "client_secrets.json")]
    pub client_secrets: PathBuf,

    /// The directory holding the cached OAuth2 tokens.
    ///
    /// Defaults to `$HOME/.store/storage_sample`.
    #[arg(long, env = "STORAGE_SAMPLE_TOKEN_STORE")]
    pub token_store: Option<PathBuf>,

    /// Override the service endpoint, mostly useful for testing.
    #[arg(long, env = "STORAGE_SAMPLE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// The size of the uploaded object, in bytes.
    #[arg(long, default_value_t = DEFAULT_OBJECT_SIZE)]
    pub object_size: u64,

    /// Log more details, repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// The maximum level for log events.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
