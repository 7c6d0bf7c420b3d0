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

//! A walkthrough of the Cloud Storage JSON API.
//!
//! The sample creates a bucket, reads its metadata, lists its objects, reads
//! the metadata of a public object, uploads a large object and downloads it
//! again, verifying the MD5 hash reported by the service.

pub mod driver;
pub mod errors;
pub mod helpers;
pub mod operations;
pub mod settings;
#[cfg(test)]
mod test_doubles;
pub mod view;
