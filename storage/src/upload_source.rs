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

//! The payload of an object upload.

use crate::Result;
use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;

type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + Sync>>;

/// The data for a new object.
///
/// Payloads are streamed to the service, only in-memory payloads are held in
/// memory.
///
/// # Example
/// ```
/// # use google_cloud_storage::upload_source::UploadSource;
/// let payload = UploadSource::from("the quick brown fox jumps over the lazy dog");
/// assert_eq!(payload.size_hint(), Some(43));
/// ```
pub struct UploadSource {
    inner: Inner,
}

enum Inner {
    Bytes(Bytes),
    File(PathBuf),
    Stream { stream: ByteStream, len: u64 },
}

impl UploadSource {
    /// Uploads the contents of the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            inner: Inner::File(path.as_ref().to_path_buf()),
        }
    }

    /// Uploads the data produced by `stream`.
    ///
    /// The service requires the length of multipart uploads up front; the
    /// stream must produce exactly `len` bytes.
    pub fn from_stream<S>(stream: S, len: u64) -> Self
    where
        S: Stream<Item = std::io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self {
            inner: Inner::Stream {
                stream: Box::pin(stream),
                len,
            },
        }
    }

    /// The payload size, when known without any I/O.
    pub fn size_hint(&self) -> Option<u64> {
        match &self.inner {
            Inner::Bytes(b) => Some(b.len() as u64),
            Inner::File(_) => None,
            Inner::Stream { len, .. } => Some(*len),
        }
    }

    /// Reads the full payload into memory.
    ///
    /// Mostly useful for test doubles of [crate::stub::Storage].
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self.inner {
            Inner::Bytes(b) => Ok(b),
            Inner::File(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            Inner::Stream { mut stream, len } => {
                let mut buf = BytesMut::with_capacity(len as usize);
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    /// Converts the payload into a (streaming) multipart part.
    pub(crate) async fn into_part(self) -> Result<(reqwest::multipart::Part, u64)> {
        let (body, len) = match self.inner {
            Inner::Bytes(b) => {
                let len = b.len() as u64;
                (reqwest::Body::from(b), len)
            }
            Inner::File(path) => {
                let file = tokio::fs::File::open(&path).await?;
                let len = file.metadata().await?.len();
                let stream = tokio_util::io::ReaderStream::new(file);
                (reqwest::Body::wrap_stream(stream), len)
            }
            Inner::Stream { stream, len } => (reqwest::Body::wrap_stream(stream), len),
        };
        Ok((reqwest::multipart::Part::stream_with_length(body, len), len))
    }
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Inner::Bytes(b) => f.debug_struct("UploadSource").field("len", &b.len()).finish(),
            Inner::File(path) => f.debug_struct("UploadSource").field("path", path).finish(),
            Inner::Stream { len, .. } => f
                .debug_struct("UploadSource")
                .field("stream", &"[skipped]")
                .field("len", len)
                .finish(),
        }
    }
}

impl From<Bytes> for UploadSource {
    fn from(value: Bytes) -> Self {
        Self {
            inner: Inner::Bytes(value),
        }
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(value: Vec<u8>) -> Self {
        Bytes::from(value).into()
    }
}

impl From<&'static [u8]> for UploadSource {
    fn from(value: &'static [u8]) -> Self {
        Bytes::from_static(value).into()
    }
}

impl From<&'static str> for UploadSource {
    fn from(value: &'static str) -> Self {
        Bytes::from_static(value.as_bytes()).into()
    }
}

impl From<String> for UploadSource {
    fn from(value: String) -> Self {
        Bytes::from(value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONTENTS: &str = "the quick brown fox jumps over the lazy dog";

    #[tokio::test]
    async fn from_memory() -> anyhow::Result<()> {
        let payload = UploadSource::from(CONTENTS);
        assert_eq!(payload.size_hint(), Some(CONTENTS.len() as u64));
        assert_eq!(payload.into_bytes().await?, CONTENTS.as_bytes());

        let payload = UploadSource::from(CONTENTS.to_string().into_bytes());
        assert_eq!(payload.into_bytes().await?, CONTENTS.as_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn from_path() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(CONTENTS.as_bytes())?;
        file.flush()?;
        let payload = UploadSource::from_path(file.path());
        assert_eq!(payload.size_hint(), None);
        assert_eq!(payload.into_bytes().await?, CONTENTS.as_bytes());

        let payload = UploadSource::from_path(file.path());
        let (_, len) = payload.into_part().await?;
        assert_eq!(len, CONTENTS.len() as u64);
        Ok(())
    }

    #[tokio::test]
    async fn from_missing_path() {
        let payload = UploadSource::from_path("/does/not/exist/test-only");
        let err = payload.into_part().await.unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)), "{err:?}");
    }

    #[tokio::test]
    async fn from_stream() -> anyhow::Result<()> {
        let chunks = ["the quick brown fox ", "jumps over ", "the lazy dog"]
            .map(|s| Ok(Bytes::from_static(s.as_bytes())));
        let payload = UploadSource::from_stream(futures::stream::iter(chunks), CONTENTS.len() as u64);
        assert_eq!(payload.size_hint(), Some(CONTENTS.len() as u64));
        assert_eq!(payload.into_bytes().await?, CONTENTS.as_bytes());
        Ok(())
    }

    #[tokio::test]
    async fn from_stream_error() {
        let chunks = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::other("test-only")),
        ];
        let payload = UploadSource::from_stream(futures::stream::iter(chunks), 100);
        let err = payload.into_bytes().await.unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)), "{err:?}");
    }
}
