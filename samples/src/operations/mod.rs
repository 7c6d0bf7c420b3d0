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

//! Each example wraps exactly one call on a [Storage] stub and returns the
//! response, or the error, unmodified.
//!
//! [Storage]: google_cloud_storage::stub::Storage

pub mod buckets_get;
pub mod buckets_insert;
pub mod objects_download;
pub mod objects_get;
pub mod objects_list;
pub mod objects_upload;
