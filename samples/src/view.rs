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

//! Console formatting for the sample output.

use google_cloud_storage::model::{Bucket, Object, Owner};
use std::fmt::Display;

const RULE: &str = "================";

/// Formats a section header.
pub fn header1(title: &str) -> String {
    format!("\n{RULE} {title} {RULE}\n")
}

/// Resources that can be rendered for the console.
pub trait Show {
    /// One `field: value` line per field that is set.
    fn render(&self) -> String;
}

fn field<T: Display>(out: &mut String, name: &str, value: Option<T>) {
    if let Some(v) = value {
        out.push_str(&format!("{name}: {v}\n"));
    }
}

fn owner(out: &mut String, owner: Option<&Owner>) {
    field(out, "owner", owner.and_then(|o| o.entity.as_deref()));
}

impl Show for Bucket {
    fn render(&self) -> String {
        let mut out = String::new();
        field(&mut out, "name", self.name.as_deref());
        field(&mut out, "location", self.location.as_deref());
        field(&mut out, "storageClass", self.storage_class.as_deref());
        field(&mut out, "timeCreated", self.time_created.as_deref());
        field(&mut out, "metageneration", self.metageneration);
        owner(&mut out, self.owner.as_ref());
        out
    }
}

impl Show for Object {
    fn render(&self) -> String {
        let mut out = String::new();
        field(&mut out, "name", self.name.as_deref());
        field(&mut out, "bucket", self.bucket.as_deref());
        field(&mut out, "contentType", self.content_type.as_deref());
        field(&mut out, "size", self.size);
        field(&mut out, "cacheControl", self.cache_control.as_deref());
        field(&mut out, "contentDisposition", self.content_disposition.as_deref());
        field(&mut out, "timeCreated", self.time_created.as_deref());
        owner(&mut out, self.owner.as_ref());
        if let Some(metadata) = self.metadata.as_ref().filter(|m| !m.is_empty()) {
            out.push_str("metadata:\n");
            for (k, v) in metadata {
                out.push_str(&format!("  {k}: {v}\n"));
            }
        }
        out
    }
}
