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
use google_cloud_storage::model::{GetObjectRequest, Object};
use google_cloud_storage::stub::Storage;

/// Returns the metadata for `object` in `bucket`.
pub async fn get<S>(client: &S, bucket: &str, object: &str) -> Result<Object>
where
    S: Storage,
{
    client
        .get_object(GetObjectRequest::new().set_bucket(bucket).set_object(object))
        .await
}
