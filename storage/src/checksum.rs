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

//! Compute MD5 hashes in the format used by the `md5Hash` object field.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// Returns the base64-encoded MD5 hash of `data`.
pub fn md5_base64(data: impl AsRef<[u8]>) -> String {
    BASE64_STANDARD.encode(md5::compute(data).0)
}

/// An [AsyncWrite] adaptor that computes the MD5 hash of all the data written
/// through it.
///
/// # Example
/// ```
/// # use google_cloud_storage::checksum::Md5Writer;
/// # use tokio::io::AsyncWriteExt;
/// # async fn sample() -> std::io::Result<()> {
/// let mut writer = Md5Writer::new(tokio::io::sink());
/// writer.write_all(b"hello").await?;
/// assert_eq!(writer.finalize_base64(), "XUFAKrxLKna5cZ2REBfFkg==");
/// # Ok(()) }
/// ```
pub struct Md5Writer<W> {
    inner: W,
    hasher: md5::Context,
    written: u64,
}

impl<W> Md5Writer<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: md5::Context::new(),
            written: 0,
        }
    }

    /// The number of bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// The base64-encoded hash of the data written so far.
    pub fn finalize_base64(&self) -> String {
        let digest = self.hasher.clone().finalize();
        BASE64_STANDARD.encode(digest.0)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W> std::fmt::Debug for Md5Writer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Md5Writer")
            .field("hasher", &"[skipped]")
            .field("written", &self.written)
            .finish()
    }
}

impl<W> AsyncWrite for Md5Writer<W>
where
    W: AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(Ok(n)) => {
                // Only hash what the inner writer accepted.
                this.hasher.consume(&buf[..n]);
                this.written += n as u64;
                Poll::Ready(Ok(n))
            }
            other => other,
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
