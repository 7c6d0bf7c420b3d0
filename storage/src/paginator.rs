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

//! Iterate over all the pages of a `list_objects` call.

use crate::Result;
use crate::model::{ListObjectsRequest, ListObjectsResponse, Object};
use crate::stub::Storage;

/// Fetches the pages of a list operation, one at a time.
///
/// Follows `next_page_token` until the service returns an empty (or missing)
/// token. The iteration stops after the first error.
#[derive(Debug)]
pub struct ObjectPages<'a, S> {
    stub: &'a S,
    request: ListObjectsRequest,
    done: bool,
}

impl<'a, S> ObjectPages<'a, S>
where
    S: Storage,
{
    pub fn new(stub: &'a S, request: ListObjectsRequest) -> Self {
        Self {
            stub,
            request,
            done: false,
        }
    }

    /// Returns the next page, or `None` when there are no more pages.
    pub async fn next(&mut self) -> Option<Result<ListObjectsResponse>> {
        if self.done {
            return None;
        }
        let page = match self.stub.list_objects(self.request.clone()).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        match page.next_page_token.as_deref() {
            Some(token) if !token.is_empty() => {
                tracing::debug!(bucket = %self.request.bucket, "fetching next page of objects");
                self.request.page_token = Some(token.to_string());
            }
            _ => self.done = true,
        }
        Some(Ok(page))
    }
}

/// Lists all the objects matching `request`, in the order returned by the
/// service.
pub async fn list_all_objects<S>(stub: &S, request: ListObjectsRequest) -> Result<Vec<Object>>
where
    S: Storage,
{
    let mut pages = ObjectPages::new(stub, request);
    let mut items = Vec::new();
    while let Some(page) = pages.next().await {
        items.extend(page?.items);
    }
    Ok(items)
}
