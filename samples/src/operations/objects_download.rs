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
use google_cloud_storage::model::ReadObjectRequest;
use google_cloud_storage::stub::Storage;
use tokio::io::AsyncWrite;

/// Streams the data of `object` into `sink`, returns the number of bytes.
pub async fn download_to_writer<S, W>(client: &S, bucket: &str, object: &str, sink: &mut W) -> Result<u64>
where
    S: Storage,
    W: AsyncWrite + Unpin + Send,
{
    client
        .read_object(ReadObjectRequest::new().set_bucket(bucket).set_object(object), sink)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::objects_upload::upload_with_metadata;
    use crate::test_doubles::FakeStorage;
    use google_cloud_storage::checksum::{Md5Writer, md5_base64};
    use google_cloud_storage::model::Object;
    use google_cloud_storage::upload_source::UploadSource;
    use test_case::test_case;

    #[test_case(0)]
    #[test_case(1)]
    #[test_case(1024)]
    #[test_case(1025)]
    #[test_case(1_000_000)]
    #[tokio::test]
    async fn digest_matches_backend(len: usize) -> anyhow::Result<()> {
        let fake = FakeStorage::new();
        fake.add_bucket("bkt-A");
        let data: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
        let uploaded = upload_with_metadata(
            &fake,
            Object::new().set_bucket("bkt-A").set_name("x/myobject"),
            UploadSource::from(data.clone()),
        )
        .await?;

        let mut writer = Md5Writer::new(tokio::io::sink());
        let n = download_to_writer(&fake, "bkt-A", "x/myobject", &mut writer).await?;
        assert_eq!(n, len as u64);
        assert_eq!(Some(writer.finalize_base64()), uploaded.md5_hash);
        assert_eq!(writer.finalize_base64(), md5_base64(&data));
        Ok(())
    }

    #[tokio::test]
    async fn missing_object() {
        let fake = FakeStorage::new();
        fake.add_bucket("bkt-A");
        let mut sink = Vec::new();
        let err = download_to_writer(&fake, "bkt-A", "missing", &mut sink)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    }
}
