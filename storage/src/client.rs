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

//! The HTTP transport for the Cloud Storage JSON API.

use crate::model::{
    Bucket, GetBucketRequest, GetObjectRequest, InsertBucketRequest, InsertObjectRequest,
    ListObjectsRequest, ListObjectsResponse, Object, ReadObjectRequest,
};
use crate::upload_source::UploadSource;
use crate::{ApiErrorReply, Error, Result};
use google_cloud_auth::Credential;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
const DEFAULT_USER_AGENT: &str = concat!("gcloud-rust-storage-sample/", env!("CARGO_PKG_VERSION"));
const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Characters escaped in path segments: everything except the RFC 3986
/// unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Implements a client for the Cloud Storage JSON API.
///
/// # Example
/// ```no_run
/// # use google_cloud_storage::client::Client;
/// # use google_cloud_storage::model::{GetBucketRequest, Projection};
/// # use google_cloud_storage::stub::Storage;
/// # use google_cloud_auth::Credential;
/// # async fn sample(credential: Credential) -> google_cloud_storage::Result<()> {
/// let client = Client::builder().with_credentials(credential).build()?;
/// let bucket = client
///     .get_bucket(GetBucketRequest::new().set_bucket("my-bucket").set_projection(Projection::Full))
///     .await?;
/// println!("{bucket:?}");
/// # Ok(()) }
/// ```
///
/// `Client` holds a connection pool internally, it is advised to create one
/// and then reuse it. `Client` is cheap to clone.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientRef>,
}

struct ClientRef {
    http_client: reqwest::Client,
    endpoint: String,
    cred: Credential,
}

impl std::fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRef")
            .field("http_client", &self.http_client)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// A builder for [Client].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    cred: Option<Credential>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Sets the service endpoint, e.g. for a local emulator.
    pub fn with_endpoint(mut self, v: impl Into<String>) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Sets the credentials used to authorize every request. Required.
    pub fn with_credentials(mut self, v: Credential) -> Self {
        self.cred = Some(v);
        self
    }

    pub fn with_user_agent(mut self, v: impl Into<String>) -> Self {
        self.user_agent = Some(v.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let cred = self
            .cred
            .ok_or_else(|| Error::Config("the client requires credentials".into()))?;
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Client {
            inner: Arc::new(ClientRef {
                http_client,
                endpoint,
                cred,
            }),
        })
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }
}

impl ClientRef {
    /// Starts a request with the parameters common to all RPCs.
    async fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let tok = self.cred.access_token().await?;
        tracing::debug!(%method, %path, "sending request");
        Ok(self
            .http_client
            .request(method, format!("{}{path}", self.endpoint))
            .query(&[("prettyPrint", "false")])
            .bearer_auth(tok.value))
    }

    async fn send_json<T>(&self, builder: reqwest::RequestBuilder) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let res = builder.query(&[("alt", "json")]).send().await?;
        let res = check_status(res).await?;
        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Maps non-success responses to [Error::Service] or [Error::Http].
async fn check_status(res: reqwest::Response) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let headers = res.headers().clone();
    let body = res.bytes().await?;
    tracing::debug!(%status, "request failed");
    match serde_json::from_slice::<ApiErrorReply>(&body) {
        Ok(reply) => Err(Error::Service {
            status,
            error: reply.error,
        }),
        Err(_) => Err(Error::Http {
            status,
            headers,
            body,
        }),
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn projection_param(projection: Option<crate::model::Projection>) -> Vec<(&'static str, &'static str)> {
    projection
        .map(|p| vec![("projection", p.as_str())])
        .unwrap_or_default()
}

impl crate::stub::Storage for Client {
    async fn insert_bucket(&self, req: InsertBucketRequest) -> Result<Bucket> {
        let inner = &self.inner;
        let builder = inner
            .request(reqwest::Method::POST, "/storage/v1/b")
            .await?
            .query(&[("project", req.project.as_str())])
            .query(&projection_param(req.projection))
            .json(&req.bucket);
        inner.send_json(builder).await
    }

    async fn get_bucket(&self, req: GetBucketRequest) -> Result<Bucket> {
        let inner = &self.inner;
        let builder = inner
            .request(
                reqwest::Method::GET,
                &format!("/storage/v1/b/{}", encode(&req.bucket)),
            )
            .await?
            .query(&projection_param(req.projection));
        inner.send_json(builder).await
    }

    async fn list_objects(&self, req: ListObjectsRequest) -> Result<ListObjectsResponse> {
        let inner = &self.inner;
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(v) = &req.prefix {
            params.push(("prefix", v.clone()));
        }
        if let Some(v) = &req.delimiter {
            params.push(("delimiter", v.clone()));
        }
        if let Some(v) = &req.page_token {
            params.push(("pageToken", v.clone()));
        }
        if let Some(v) = req.max_results {
            params.push(("maxResults", v.to_string()));
        }
        let builder = inner
            .request(
                reqwest::Method::GET,
                &format!("/storage/v1/b/{}/o", encode(&req.bucket)),
            )
            .await?
            .query(&params)
            .query(&projection_param(req.projection));
        inner.send_json(builder).await
    }

    async fn get_object(&self, req: GetObjectRequest) -> Result<Object> {
        let inner = &self.inner;
        let builder = inner
            .request(
                reqwest::Method::GET,
                &format!(
                    "/storage/v1/b/{}/o/{}",
                    encode(&req.bucket),
                    encode(&req.object)
                ),
            )
            .await?
            .query(&projection_param(req.projection));
        inner.send_json(builder).await
    }

    async fn insert_object(&self, req: InsertObjectRequest, payload: UploadSource) -> Result<Object> {
        let inner = &self.inner;
        let bucket = req.resource.bucket.clone().unwrap_or_default();
        let media_type = req
            .media_content_type
            .clone()
            .or_else(|| req.resource.content_type.clone())
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
        let metadata = reqwest::multipart::Part::text(serde_json::to_string(&req.resource)?)
            .mime_str("application/json; charset=UTF-8")?;
        let (media, len) = payload.into_part().await?;
        let media = media.mime_str(&media_type)?;
        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata)
            .part("media", media);
        tracing::debug!(%bucket, object = ?req.resource.name, len, "uploading object");
        let builder = inner
            .request(
                reqwest::Method::POST,
                &format!("/upload/storage/v1/b/{}/o", encode(&bucket)),
            )
            .await?
            .query(&[("uploadType", "multipart")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", form.boundary()),
            )
            .body(reqwest::Body::wrap_stream(form.into_stream()));
        inner.send_json(builder).await
    }

    async fn read_object<W>(&self, req: ReadObjectRequest, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let inner = &self.inner;
        let res = inner
            .request(
                reqwest::Method::GET,
                &format!(
                    "/storage/v1/b/{}/o/{}",
                    encode(&req.bucket),
                    encode(&req.object)
                ),
            )
            .await?
            .query(&[("alt", "media")])
            .send()
            .await?;
        let mut res = check_status(res).await?;
        let mut written = 0_u64;
        while let Some(chunk) = res.chunk().await? {
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        sink.flush().await?;
        tracing::debug!(bucket = %req.bucket, object = %req.object, written, "downloaded object");
        Ok(written)
    }
}
