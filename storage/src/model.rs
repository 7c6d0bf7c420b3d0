// Copyright 2022 Google LLC
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

//! Resources and requests of the Cloud Storage JSON API.
//!
//! The JSON API encodes 64-bit integers (`size`, `generation`, ...) as
//! strings. These types hold them as integers and reject malformed values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The owner of a bucket or object.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Owner {
    /// The entity, in the form `project-owner-projectId`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// The ID for the entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

impl Owner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_entity(mut self, v: impl Into<String>) -> Self {
        self.entity = Some(v.into());
        self
    }

    pub fn set_entity_id(mut self, v: impl Into<String>) -> Self {
        self.entity_id = Some(v.into());
        self
    }
}

/// A bucket.
#[serde_with::serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Bucket {
    /// The name of the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The ID of the bucket. For buckets, the id and name properties are the
    /// same.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The location of the bucket, for example `US`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// The bucket's default storage class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// The creation time of the bucket in RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    /// The modification time of the bucket in RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// The metadata generation of this bucket.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metageneration: Option<i64>,
    /// The project number of the project the bucket belongs to.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_number: Option<u64>,
    /// HTTP 1.1 Entity tag for the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// The URI of this bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// The owner of the bucket. This is always the project team's owner
    /// group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    /// The kind of item this is. For buckets, this is always
    /// `storage#bucket`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(mut self, v: impl Into<String>) -> Self {
        self.name = Some(v.into());
        self
    }

    pub fn set_id(mut self, v: impl Into<String>) -> Self {
        self.id = Some(v.into());
        self
    }

    pub fn set_location(mut self, v: impl Into<String>) -> Self {
        self.location = Some(v.into());
        self
    }

    pub fn set_storage_class(mut self, v: impl Into<String>) -> Self {
        self.storage_class = Some(v.into());
        self
    }

    pub fn set_time_created(mut self, v: impl Into<String>) -> Self {
        self.time_created = Some(v.into());
        self
    }

    pub fn set_updated(mut self, v: impl Into<String>) -> Self {
        self.updated = Some(v.into());
        self
    }

    pub fn set_metageneration(mut self, v: i64) -> Self {
        self.metageneration = Some(v);
        self
    }

    pub fn set_project_number(mut self, v: u64) -> Self {
        self.project_number = Some(v);
        self
    }

    pub fn set_etag(mut self, v: impl Into<String>) -> Self {
        self.etag = Some(v.into());
        self
    }

    pub fn set_self_link(mut self, v: impl Into<String>) -> Self {
        self.self_link = Some(v.into());
        self
    }

    pub fn set_owner(mut self, v: Owner) -> Self {
        self.owner = Some(v);
        self
    }

    pub fn set_kind(mut self, v: impl Into<String>) -> Self {
        self.kind = Some(v.into());
        self
    }
}

/// An object.
#[serde_with::serde_as]
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Object {
    /// The name of the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The name of the bucket containing this object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// The ID of the object, including the bucket name, object name, and
    /// generation number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Content-Type of the object data. If an object is stored without a
    /// Content-Type, it is served as `application/octet-stream`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Cache-Control directive for the object data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Content-Disposition of the object data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    /// Content-Encoding of the object data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// User-provided metadata, in key/value pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Content-Length of the data in bytes.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MD5 hash of the data; encoded using base64.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_hash: Option<String>,
    /// CRC32c checksum, encoded using base64 in big-endian byte order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crc32c: Option<String>,
    /// The content generation of this object.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    /// The version of the metadata for this object at this generation.
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metageneration: Option<i64>,
    /// HTTP 1.1 Entity tag for the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// The creation time of the object in RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    /// The modification time of the object metadata in RFC 3339 format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    /// Media download link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_link: Option<String>,
    /// The link to this object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Storage class of the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// The owner of the object. This will always be the uploader of the
    /// object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    /// The kind of item this is. For objects, this is always
    /// `storage#object`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(mut self, v: impl Into<String>) -> Self {
        self.name = Some(v.into());
        self
    }

    pub fn set_bucket(mut self, v: impl Into<String>) -> Self {
        self.bucket = Some(v.into());
        self
    }

    pub fn set_id(mut self, v: impl Into<String>) -> Self {
        self.id = Some(v.into());
        self
    }

    pub fn set_content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    pub fn set_cache_control(mut self, v: impl Into<String>) -> Self {
        self.cache_control = Some(v.into());
        self
    }

    pub fn set_content_disposition(mut self, v: impl Into<String>) -> Self {
        self.content_disposition = Some(v.into());
        self
    }

    pub fn set_content_encoding(mut self, v: impl Into<String>) -> Self {
        self.content_encoding = Some(v.into());
        self
    }

    /// Replaces the user-provided metadata.
    pub fn set_metadata<I, K, V>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata = Some(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn set_size(mut self, v: u64) -> Self {
        self.size = Some(v);
        self
    }

    pub fn set_md5_hash(mut self, v: impl Into<String>) -> Self {
        self.md5_hash = Some(v.into());
        self
    }

    pub fn set_crc32c(mut self, v: impl Into<String>) -> Self {
        self.crc32c = Some(v.into());
        self
    }

    pub fn set_generation(mut self, v: i64) -> Self {
        self.generation = Some(v);
        self
    }

    pub fn set_metageneration(mut self, v: i64) -> Self {
        self.metageneration = Some(v);
        self
    }

    pub fn set_etag(mut self, v: impl Into<String>) -> Self {
        self.etag = Some(v.into());
        self
    }

    pub fn set_time_created(mut self, v: impl Into<String>) -> Self {
        self.time_created = Some(v.into());
        self
    }

    pub fn set_updated(mut self, v: impl Into<String>) -> Self {
        self.updated = Some(v.into());
        self
    }

    pub fn set_media_link(mut self, v: impl Into<String>) -> Self {
        self.media_link = Some(v.into());
        self
    }

    pub fn set_self_link(mut self, v: impl Into<String>) -> Self {
        self.self_link = Some(v.into());
        self
    }

    pub fn set_storage_class(mut self, v: impl Into<String>) -> Self {
        self.storage_class = Some(v.into());
        self
    }

    pub fn set_owner(mut self, v: Owner) -> Self {
        self.owner = Some(v);
        self
    }

    pub fn set_kind(mut self, v: impl Into<String>) -> Self {
        self.kind = Some(v.into());
        self
    }
}

/// One page of results from [crate::stub::Storage::list_objects].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ListObjectsResponse {
    /// The objects in this page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Object>,
    /// The prefixes of objects matching-but-not-listed up to and including
    /// the requested delimiter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefixes: Vec<String>,
    /// The continuation token, used to page through large result sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl ListObjectsResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items<I: IntoIterator<Item = Object>>(mut self, v: I) -> Self {
        self.items = v.into_iter().collect();
        self
    }

    pub fn set_prefixes<I, V>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.prefixes = v.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_next_page_token(mut self, v: impl Into<String>) -> Self {
        self.next_page_token = Some(v.into());
        self
    }
}

/// Set of properties to return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    /// Include all properties.
    Full,
    /// Omit the `owner` and `acl` properties.
    #[default]
    NoAcl,
}

impl Projection {
    /// The value used in the `projection` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::NoAcl => "noAcl",
        }
    }
}

impl std::fmt::Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates a new bucket.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct InsertBucketRequest {
    /// The project that owns the new bucket.
    pub project: String,
    /// The bucket metadata, the name is required.
    pub bucket: Bucket,
    pub projection: Option<Projection>,
}

impl InsertBucketRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_project(mut self, v: impl Into<String>) -> Self {
        self.project = v.into();
        self
    }

    pub fn set_bucket(mut self, v: Bucket) -> Self {
        self.bucket = v;
        self
    }

    pub fn set_projection(mut self, v: Projection) -> Self {
        self.projection = Some(v);
        self
    }
}

/// Returns the metadata of a bucket.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct GetBucketRequest {
    pub bucket: String,
    pub projection: Option<Projection>,
}

impl GetBucketRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bucket(mut self, v: impl Into<String>) -> Self {
        self.bucket = v.into();
        self
    }

    pub fn set_projection(mut self, v: Projection) -> Self {
        self.projection = Some(v);
        self
    }
}

/// Lists one page of objects in a bucket.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct ListObjectsRequest {
    pub bucket: String,
    /// Only list objects whose names begin with this prefix.
    pub prefix: Option<String>,
    /// Returns results in a directory-like mode.
    pub delimiter: Option<String>,
    /// A previously-returned page token.
    pub page_token: Option<String>,
    /// The maximum number of items per page.
    pub max_results: Option<u32>,
    pub projection: Option<Projection>,
}

impl ListObjectsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bucket(mut self, v: impl Into<String>) -> Self {
        self.bucket = v.into();
        self
    }

    pub fn set_prefix(mut self, v: impl Into<String>) -> Self {
        self.prefix = Some(v.into());
        self
    }

    pub fn set_delimiter(mut self, v: impl Into<String>) -> Self {
        self.delimiter = Some(v.into());
        self
    }

    pub fn set_page_token(mut self, v: impl Into<String>) -> Self {
        self.page_token = Some(v.into());
        self
    }

    pub fn set_max_results(mut self, v: u32) -> Self {
        self.max_results = Some(v);
        self
    }

    pub fn set_projection(mut self, v: Projection) -> Self {
        self.projection = Some(v);
        self
    }
}

/// Returns the metadata of an object.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct GetObjectRequest {
    pub bucket: String,
    pub object: String,
    pub projection: Option<Projection>,
}

impl GetObjectRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bucket(mut self, v: impl Into<String>) -> Self {
        self.bucket = v.into();
        self
    }

    pub fn set_object(mut self, v: impl Into<String>) -> Self {
        self.object = v.into();
        self
    }

    pub fn set_projection(mut self, v: Projection) -> Self {
        self.projection = Some(v);
        self
    }
}

/// Uploads a new object.
///
/// The bucket and name of the new object come from `resource`.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct InsertObjectRequest {
    pub resource: Object,
    /// The content type of the media part. Defaults to
    /// `resource.content_type`, or `application/octet-stream`.
    pub media_content_type: Option<String>,
}

impl InsertObjectRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_resource(mut self, v: Object) -> Self {
        self.resource = v;
        self
    }

    pub fn set_media_content_type(mut self, v: impl Into<String>) -> Self {
        self.media_content_type = Some(v.into());
        self
    }
}

/// Downloads the data of an object.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct ReadObjectRequest {
    pub bucket: String,
    pub object: String,
}

impl ReadObjectRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bucket(mut self, v: impl Into<String>) -> Self {
        self.bucket = v.into();
        self
    }

    pub fn set_object(mut self, v: impl Into<String>) -> Self {
        self.object = v.into();
        self
    }
}
