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

//! Runs the example operations, in order, against one bucket.

use crate::helpers::random_data_blocks;
use crate::operations::{
    buckets_get, buckets_insert, objects_download, objects_get, objects_list, objects_upload,
};
use crate::settings::Settings;
use crate::view::{Show, header1};
use anyhow::Context;
use google_cloud_storage::checksum::Md5Writer;
use google_cloud_storage::model::{Bucket, Object};
use google_cloud_storage::stub::Storage;
use std::io::Write;

/// 100 MB, in decimal units like the service reports sizes.
pub const DEFAULT_OBJECT_SIZE: u64 = 100 * 1000 * 1000;
pub const BLOCK_SIZE: usize = 1024;
pub const WELL_KNOWN_BUCKET: &str = "pub";
pub const WELL_KNOWN_OBJECT: &str = "SomeOfTheTeam.jpg";

const UPLOADED_OBJECT: &str = "myobject";
const BUCKET_LOCATION: &str = "US";
const CONTENT_TYPE: &str = "application/octet-stream";
const CACHE_CONTROL: &str = "max-age=3600, must-revalidate";
const CONTENT_DISPOSITION: &str = "attachment";
const MATCHES: &str = "(MATCHES)";
const MISMATCHES: &str = "(MISMATCHES; data altered in transit)";

/// Knobs for [run].
#[derive(Clone, Debug)]
pub struct DriverOptions {
    /// The size of the uploaded object.
    pub object_size: u64,
    /// The bucket of the object fetched in the "get object" stage.
    pub well_known_bucket: String,
    /// The object fetched in the "get object" stage.
    pub well_known_object: String,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            object_size: DEFAULT_OBJECT_SIZE,
            well_known_bucket: WELL_KNOWN_BUCKET.to_string(),
            well_known_object: WELL_KNOWN_OBJECT.to_string(),
        }
    }
}

/// The results of a successful [run].
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub bucket: Bucket,
    /// The objects in the bucket before the upload.
    pub listed: Vec<Object>,
    pub well_known: Object,
    pub uploaded: Object,
    /// The base64-encoded MD5 of the downloaded data.
    pub computed_md5: String,
    /// Whether `computed_md5` matches the hash reported for `uploaded`.
    pub md5_matches: bool,
}

/// The name of the object uploaded by [run].
pub fn uploaded_object_name(settings: &Settings) -> String {
    format!("{}{UPLOADED_OBJECT}", settings.prefix)
}

/// Runs each stage in order, writing the results to `out`.
///
/// The first failing stage aborts the run. A digest mismatch is reported in
/// the output and in [Report::md5_matches], but it is not an error.
pub async fn run<S, O>(
    client: &S,
    settings: &Settings,
    options: &DriverOptions,
    out: &mut O,
) -> anyhow::Result<Report>
where
    S: Storage,
    O: Write + ?Sized,
{
    let bucket_name = settings.bucket.as_str();

    write!(out, "{}", header1(&format!("Trying to create a new bucket {bucket_name}")))?;
    tracing::info!(bucket = %bucket_name, project = %settings.project, "inserting bucket");
    buckets_insert::insert_in_named_project(
        client,
        &settings.project,
        Bucket::new()
            .set_name(bucket_name)
            .set_location(BUCKET_LOCATION),
    )
    .await
    .with_context(|| format!("cannot create bucket {bucket_name}"))?;

    write!(out, "{}", header1(&format!("Getting bucket {bucket_name} metadata")))?;
    tracing::info!(bucket = %bucket_name, "getting bucket");
    let bucket = buckets_get::get(client, bucket_name)
        .await
        .with_context(|| format!("cannot get bucket {bucket_name}"))?;
    write!(out, "{}", bucket.render())?;

    write!(out, "{}", header1(&format!("Listing objects in bucket {bucket_name}")))?;
    tracing::info!(bucket = %bucket_name, "listing objects");
    let listed = objects_list::list(client, bucket_name)
        .await
        .with_context(|| format!("cannot list objects in {bucket_name}"))?;
    for object in &listed {
        write!(out, "{}", object.render())?;
    }

    let (wk_bucket, wk_object) = (&options.well_known_bucket, &options.well_known_object);
    write!(
        out,
        "{}",
        header1(&format!("Getting object metadata from gs://{wk_bucket}/{wk_object}"))
    )?;
    tracing::info!(bucket = %wk_bucket, object = %wk_object, "getting object");
    let well_known = objects_get::get(client, wk_bucket, wk_object)
        .await
        .with_context(|| format!("cannot get object gs://{wk_bucket}/{wk_object}"))?;
    write!(out, "{}", well_known.render())?;

    write!(out, "{}", header1("Uploading object."))?;
    let name = uploaded_object_name(settings);
    tracing::info!(bucket = %bucket_name, object = %name, size = options.object_size, "uploading object");
    let resource = Object::new()
        .set_bucket(bucket_name)
        .set_name(&name)
        .set_content_type(CONTENT_TYPE)
        .set_metadata([("key1", "value1"), ("key2", "value2")])
        .set_cache_control(CACHE_CONTROL)
        .set_content_disposition(CONTENT_DISPOSITION);
    let uploaded = objects_upload::upload_with_metadata(
        client,
        resource,
        random_data_blocks(options.object_size, BLOCK_SIZE),
    )
    .await
    .with_context(|| format!("cannot upload gs://{bucket_name}/{name}"))?;
    write!(out, "{}", uploaded.render())?;
    writeln!(out, "md5Hash: {}", uploaded.md5_hash.as_deref().unwrap_or_default())?;

    write!(
        out,
        "{}",
        header1("Getting object data of uploaded object, calculate hashes/crcs.")
    )?;
    tracing::info!(bucket = %bucket_name, object = %name, "downloading object");
    let mut digest = Md5Writer::new(tokio::io::sink());
    let downloaded = objects_download::download_to_writer(client, bucket_name, &name, &mut digest)
        .await
        .with_context(|| format!("cannot download gs://{bucket_name}/{name}"))?;
    let computed_md5 = digest.finalize_base64();
    let md5_matches = uploaded.md5_hash.as_deref() == Some(computed_md5.as_str());
    if !md5_matches {
        tracing::warn!(expected = ?uploaded.md5_hash, %computed_md5, downloaded, "digest mismatch");
    }
    writeln!(
        out,
        "md5Hash: {computed_md5} {}",
        if md5_matches { MATCHES } else { MISMATCHES }
    )?;

    Ok(Report {
        bucket,
        listed,
        well_known,
        uploaded,
        computed_md5,
        md5_matches,
    })
}
