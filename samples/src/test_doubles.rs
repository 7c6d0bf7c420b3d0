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

//! Test doubles for [Storage].

use bytes::Bytes;
use google_cloud_storage::checksum::md5_base64;
use google_cloud_storage::model::{
    Bucket, GetBucketRequest, GetObjectRequest, InsertBucketRequest, InsertObjectRequest,
    ListObjectsRequest, ListObjectsResponse, Object, ReadObjectRequest,
};
use google_cloud_storage::stub::Storage;
use google_cloud_storage::upload_source::UploadSource;
use google_cloud_storage::{ApiError, Error, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::io::{AsyncWrite, AsyncWriteExt};

mockall::mock! {
    #[derive(Debug)]
    pub Storage {}
    impl google_cloud_storage::stub::Storage for Storage {
        async fn insert_bucket(&self, req: InsertBucketRequest) -> Result<Bucket>;
        async fn get_bucket(&self, req: GetBucketRequest) -> Result<Bucket>;
        async fn list_objects(&self, req: ListObjectsRequest) -> Result<ListObjectsResponse>;
        async fn get_object(&self, req: GetObjectRequest) -> Result<Object>;
    }
}

/// An in-memory backend with just enough of the service semantics for the
/// sample.
#[derive(Debug, Default)]
pub struct FakeStorage {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, Bucket>,
    objects: BTreeMap<(String, String), (Object, Bytes)>,
    generation: i64,
    page_size: Option<usize>,
    corrupt_reads: bool,
}

fn service_error(status: http::StatusCode, message: impl Into<String>) -> Error {
    Error::Service {
        status,
        error: ApiError::new(status.as_u16() as i32, message),
    }
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bucket without going through `insert_bucket`.
    pub fn add_bucket(&self, name: &str) {
        let mut state = self.state.lock().expect("lock is not poisoned");
        state
            .buckets
            .insert(name.to_string(), Bucket::new().set_name(name).set_id(name));
    }

    /// Creates an object without going through `insert_object`.
    pub fn add_object(&self, bucket: &str, name: &str, data: &'static [u8]) {
        let mut state = self.state.lock().expect("lock is not poisoned");
        state.generation += 1;
        let object = Object::new()
            .set_bucket(bucket)
            .set_name(name)
            .set_generation(state.generation)
            .set_size(data.len() as u64)
            .set_md5_hash(md5_base64(data));
        state.objects.insert(
            (bucket.to_string(), name.to_string()),
            (object, Bytes::from_static(data)),
        );
    }

    /// Splits listings in pages of (at most) `n` objects.
    pub fn set_page_size(&self, n: usize) {
        self.state.lock().expect("lock is not poisoned").page_size = Some(n);
    }

    /// Flips the first byte of every download.
    pub fn corrupt_reads(&self) {
        self.state.lock().expect("lock is not poisoned").corrupt_reads = true;
    }
}

impl Storage for FakeStorage {
    async fn insert_bucket(&self, req: InsertBucketRequest) -> Result<Bucket> {
        let mut state = self.state.lock().expect("lock is not poisoned");
        let name = req.bucket.name.clone().unwrap_or_default();
        if state.buckets.contains_key(&name) {
            return Err(service_error(
                http::StatusCode::CONFLICT,
                "You already own this bucket. Please select another name.",
            ));
        }
        let bucket = req
            .bucket
            .set_id(&name)
            .set_kind("storage#bucket")
            .set_project_number(123456)
            .set_time_created("2024-01-01T00:00:00.000Z")
            .set_metageneration(1);
        state.buckets.insert(name, bucket.clone());
        Ok(bucket)
    }

    async fn get_bucket(&self, req: GetBucketRequest) -> Result<Bucket> {
        let state = self.state.lock().expect("lock is not poisoned");
        state.buckets.get(&req.bucket).cloned().ok_or_else(|| {
            service_error(
                http::StatusCode::NOT_FOUND,
                "The specified bucket does not exist.",
            )
        })
    }

    async fn list_objects(&self, req: ListObjectsRequest) -> Result<ListObjectsResponse> {
        let state = self.state.lock().expect("lock is not poisoned");
        if !state.buckets.contains_key(&req.bucket) {
            return Err(service_error(
                http::StatusCode::NOT_FOUND,
                "The specified bucket does not exist.",
            ));
        }
        let matching: Vec<Object> = state
            .objects
            .iter()
            .filter(|((b, n), _)| {
                *b == req.bucket && n.starts_with(req.prefix.as_deref().unwrap_or_default())
            })
            .map(|(_, (o, _))| o.clone())
            .collect();
        let start: usize = req
            .page_token
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let size = state.page_size.unwrap_or(matching.len().max(1));
        let end = (start + size).min(matching.len());
        let page = ListObjectsResponse::new().set_items(matching[start.min(end)..end].to_vec());
        if end < matching.len() {
            return Ok(page.set_next_page_token(end.to_string()));
        }
        Ok(page)
    }

    async fn get_object(&self, req: GetObjectRequest) -> Result<Object> {
        let state = self.state.lock().expect("lock is not poisoned");
        state
            .objects
            .get(&(req.bucket.clone(), req.object.clone()))
            .map(|(o, _)| o.clone())
            .ok_or_else(|| {
                service_error(
                    http::StatusCode::NOT_FOUND,
                    format!("No such object: {}/{}", req.bucket, req.object),
                )
            })
    }

    async fn insert_object(&self, req: InsertObjectRequest, payload: UploadSource) -> Result<Object> {
        let data = payload.into_bytes().await?;
        let mut state = self.state.lock().expect("lock is not poisoned");
        let bucket = req.resource.bucket.clone().unwrap_or_default();
        let name = req.resource.name.clone().unwrap_or_default();
        if !state.buckets.contains_key(&bucket) {
            return Err(service_error(
                http::StatusCode::NOT_FOUND,
                "The specified bucket does not exist.",
            ));
        }
        state.generation += 1;
        let content_type = req
            .media_content_type
            .clone()
            .or_else(|| req.resource.content_type.clone())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let object = req
            .resource
            .set_id(format!("{bucket}/{name}/{}", state.generation))
            .set_kind("storage#object")
            .set_content_type(content_type)
            .set_generation(state.generation)
            .set_metageneration(1)
            .set_size(data.len() as u64)
            .set_md5_hash(md5_base64(&data));
        state
            .objects
            .insert((bucket, name), (object.clone(), data));
        Ok(object)
    }

    async fn read_object<W>(&self, req: ReadObjectRequest, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let data = {
            let state = self.state.lock().expect("lock is not poisoned");
            let (_, data) = state
                .objects
                .get(&(req.bucket.clone(), req.object.clone()))
                .ok_or_else(|| {
                    service_error(
                        http::StatusCode::NOT_FOUND,
                        format!("No such object: {}/{}", req.bucket, req.object),
                    )
                })?;
            if state.corrupt_reads && !data.is_empty() {
                let mut corrupted = data.to_vec();
                corrupted[0] ^= 0xFF;
                Bytes::from(corrupted)
            } else {
                data.clone()
            }
        };
        // Deliver the data in several writes, like a network download.
        for chunk in data.chunks(64 * 1024) {
            sink.write_all(chunk).await?;
        }
        sink.flush().await?;
        Ok(data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_pagination() -> anyhow::Result<()> {
        let fake = FakeStorage::new();
        fake.add_bucket("b");
        fake.add_object("b", "a", b"1");
        fake.add_object("b", "b", b"2");
        fake.add_object("b", "c", b"3");
        fake.set_page_size(2);
        let page = fake
            .list_objects(ListObjectsRequest::new().set_bucket("b"))
            .await?;
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("2"));
        let page = fake
            .list_objects(ListObjectsRequest::new().set_bucket("b").set_page_token("2"))
            .await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_page_token, None);
        Ok(())
    }
}
