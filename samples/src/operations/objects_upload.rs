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

use google_cloud_storage::Result;
use google_cloud_storage::model::{InsertObjectRequest, Object};
use google_cloud_storage::stub::Storage;
use google_cloud_storage::upload_source::UploadSource;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Uploads `data` as a new object, described by `object`.
///
/// The bucket, name, metadata and headers (e.g. `cacheControl`) all come from
/// `object`.
pub async fn upload_with_metadata<S>(client: &S, object: Object, data: UploadSource) -> Result<Object>
where
    S: Storage,
{
    let media_type = object
        .content_type
        .clone()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    client
        .insert_object(
            InsertObjectRequest::new()
                .set_resource(object)
                .set_media_content_type(media_type),
            data,
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_doubles::FakeStorage;
    use google_cloud_storage::checksum::md5_base64;

    #[tokio::test]
    async fn upload_keeps_metadata() -> anyhow::Result<()> {
        let fake = FakeStorage::new();
        fake.add_bucket("bkt-A");
        let object = Object::new()
            .set_bucket("bkt-A")
            .set_name("x/myobject")
            .set_cache_control("max-age=3600, must-revalidate")
            .set_content_disposition("attachment")
            .set_metadata([("key1", "value1"), ("key2", "value2")]);
        let got = upload_with_metadata(&fake, object, UploadSource::from("hello")).await?;
        assert_eq!(got.name.as_deref(), Some("x/myobject"));
        assert_eq!(got.cache_control.as_deref(), Some("max-age=3600, must-revalidate"));
        assert_eq!(got.content_disposition.as_deref(), Some("attachment"));
        assert_eq!(got.content_type.as_deref(), Some(DEFAULT_CONTENT_TYPE));
        assert_eq!(
            got.metadata.as_ref().and_then(|m| m.get("key2")).map(String::as_str),
            Some("value2")
        );
        assert_eq!(got.size, Some(5));
        assert_eq!(got.md5_hash, Some(md5_base64("hello")));
        Ok(())
    }
}
