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

use bytes::Bytes;
use google_cloud_storage::upload_source::UploadSource;
use rand::Rng;

/// Synthetic data for uploads: a single random block of `block_size` bytes,
/// repeated until `size` bytes are produced.
///
/// The data is generated lazily, only one block is held in memory.
pub fn random_data_blocks(size: u64, block_size: usize) -> UploadSource {
    let block_size = block_size.max(1);
    let mut block = vec![0_u8; block_size];
    rand::rng().fill(&mut block[..]);
    let block = Bytes::from(block);

    let full_blocks = size / block_size as u64;
    let remainder = (size % block_size as u64) as usize;
    let tail = block.slice(..remainder);
    let stream = futures::stream::iter(
        (0..full_blocks)
            .map(move |_| block.clone())
            .chain(std::iter::once(tail).filter(|t| !t.is_empty()))
            .map(Ok::<_, std::io::Error>),
    );
    UploadSource::from_stream(stream, size)
}
