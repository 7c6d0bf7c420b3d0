// Copyright 2025 Google LLC
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

//! Traits to mock the Cloud Storage client.

use crate::Result;
use crate::model::{
    Bucket, GetBucketRequest, GetObjectRequest, InsertBucketRequest, InsertObjectRequest,
    ListObjectsRequest, ListObjectsResponse, Object, ReadObjectRequest,
};
use crate::upload_source::UploadSource;
use tokio::io::AsyncWrite;

/// Defines the operations implemented by [crate::client::Client].
///
/// Application developers may need to implement this trait to mock
/// `client::Client`. In other use-cases, application developers only use
/// `client::Client` and need not be concerned with this trait or its
/// implementations.
///
/// The trait provides a default implementation of each method, which panics.
/// Test doubles only need to implement the methods they expect to be called.
pub trait Storage: std::fmt::Debug + Send + Sync {
    /// Creates a new bucket.
    fn insert_bucket(
        &self,
        _req: InsertBucketRequest,
    ) -> impl std::future::Future<Output = Result<Bucket>> + Send {
        unimplemented_stub::<Bucket>()
    }

    /// Returns the metadata for a bucket.
    fn get_bucket(
        &self,
        _req: GetBucketRequest,
    ) -> impl std::future::Future<Output = Result<Bucket>> + Send {
        unimplemented_stub::<Bucket>()
    }

    /// Returns one page of objects.
    ///
    /// See [crate::paginator] to iterate over all the pages.
    fn list_objects(
        &self,
        _req: ListObjectsRequest,
    ) -> impl std::future::Future<Output = Result<ListObjectsResponse>> + Send {
        unimplemented_stub::<ListObjectsResponse>()
    }

    /// Returns the metadata for an object.
    fn get_object(
        &self,
        _req: GetObjectRequest,
    ) -> impl std::future::Future<Output = Result<Object>> + Send {
        unimplemented_stub::<Object>()
    }

    /// Uploads a new object, in a single request.
    fn insert_object(
        &self,
        _req: InsertObjectRequest,
        _payload: UploadSource,
    ) -> impl std::future::Future<Output = Result<Object>> + Send {
        unimplemented_stub::<Object>()
    }

    /// Downloads the object data into `sink`, returns the number of bytes
    /// written.
    ///
    /// The data is written as it arrives, it is never buffered in full.
    fn read_object<W>(
        &self,
        _req: ReadObjectRequest,
        _sink: &mut W,
    ) -> impl std::future::Future<Output = Result<u64>> + Send
    where
        W: AsyncWrite + Unpin + Send,
    {
        unimplemented_stub::<u64>()
    }
}

async fn unimplemented_stub<T>() -> Result<T> {
    unimplemented!("this method is not implemented by the stub");
}
