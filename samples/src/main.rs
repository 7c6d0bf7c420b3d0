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

//! Runs the Cloud Storage sample against the production service.

mod args;

use args::Args;
use clap::Parser;
use google_cloud_auth::{ClientSecrets, FileTokenStore, InstalledFlow};
use google_cloud_storage::Client;
use std::process::ExitCode;
use storage_samples::driver::{self, DriverOptions};
use storage_samples::errors::classify;
use storage_samples::settings::Settings;

const DESCRIPTION: &str = concat!(
    "Creates a bucket, uploads an object with synthetic data and downloads it",
    " again, verifying the MD5 hash reported by Cloud Storage.",
    " The first run prompts for authorization in a browser."
);

/// The key for the cached tokens in the token store.
const USER: &str = "user";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    enable_tracing(&args);
    tracing::debug!("Configuration: {args:?}");

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (category, msg) = classify(&e);
            tracing::debug!(?category, "sample failed: {e:?}");
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let settings = Settings::load(&args.settings).await?;
    let secrets = ClientSecrets::from_file(&args.client_secrets).await?;
    let flow = args
        .token_store
        .iter()
        .fold(InstalledFlow::builder(secrets), |b, dir| {
            b.with_token_store(FileTokenStore::new(dir))
        })
        .build();
    let credential = flow.authorize(USER).await?;

    let builder = Client::builder().with_credentials(credential);
    let builder = args
        .endpoint
        .iter()
        .fold(builder, |b, e| b.with_endpoint(e));
    let client = builder.build()?;

    let options = DriverOptions {
        object_size: args.object_size,
        ..DriverOptions::default()
    };
    let mut stdout = std::io::stdout().lock();
    let report = driver::run(&client, &settings, &options, &mut stdout).await?;
    tracing::info!(md5_matches = report.md5_matches, "sample completed");
    Ok(())
}

fn enable_tracing(args: &Args) {
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("cannot enable tracing: {e}");
    }
}
