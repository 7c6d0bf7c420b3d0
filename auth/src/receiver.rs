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

//! Receives the OAuth2 redirect on a loopback address.

use crate::{Error, ErrorKind, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const LOOPBACK_HOST: &str = "127.0.0.1";
const CALLBACK_PATH: &str = "/oauth2callback";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

const SUCCESS_PAGE: &str = "<html><head><title>OAuth 2.0 Authentication Token Received</title></head>\
<body>Received verification code. You may now close this window.</body></html>";
const FAILURE_PAGE: &str = "<html><head><title>OAuth 2.0 Authentication Failed</title></head>\
<body>The authorization request failed. Check the application output for details.</body></html>";

/// The parameters of one redirect request.
#[derive(Debug, PartialEq)]
enum Redirect {
    Code { code: String, state: Option<String> },
    Denied(String),
    /// Neither a code nor an error, e.g. a reload without parameters.
    Incomplete,
}

impl Redirect {
    fn from_query(mut query: HashMap<String, String>) -> Self {
        if let Some(error) = query.remove("error") {
            return Self::Denied(error);
        }
        match query.remove("code") {
            Some(code) => Self::Code {
                code,
                state: query.remove("state"),
            },
            None => Self::Incomplete,
        }
    }
}

/// Consumed by the first complete redirect.
type Sender = Arc<Mutex<Option<oneshot::Sender<Redirect>>>>;

/// A one-shot HTTP server on the loopback interface.
#[derive(Debug)]
pub(crate) struct LocalServerReceiver {
    listener: TcpListener,
    redirect_uri: String,
}

impl LocalServerReceiver {
    /// Starts listening; a `port` of 0 picks an ephemeral port.
    pub(crate) async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind((LOOPBACK_HOST, port))
            .await
            .map_err(|e| {
                Error::new_with_error("cannot start the redirect receiver", e, ErrorKind::Io)
            })?;
        let addr = listener.local_addr().map_err(Error::wrap_io)?;
        let redirect_uri = format!("http://{}:{}{CALLBACK_PATH}", LOOPBACK_HOST, addr.port());
        tracing::debug!(%redirect_uri, "redirect receiver listening");
        Ok(Self {
            listener,
            redirect_uri,
        })
    }

    pub(crate) fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Waits for the browser redirect and returns the authorization code.
    ///
    /// The `state` parameter of the redirect must match `expected_state`.
    /// Failures on individual connections do not stop the wait.
    pub(crate) async fn wait_for_code(self, expected_state: &str) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let sender: Sender = Arc::new(Mutex::new(Some(tx)));
        let app = axum::Router::new()
            .route(CALLBACK_PATH, axum::routing::get(callback))
            .with_state(sender);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let listener = self.listener;
        let server = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::warn!("redirect receiver stopped: {e}");
            }
        });

        let redirect = rx.await.map_err(|e| {
            Error::new_with_error("the redirect receiver stopped", e, ErrorKind::Other)
        });
        // The server finishes sending the response page before it stops.
        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("redirect receiver task failed: {e}"),
            Err(_) => tracing::debug!("redirect receiver still has open connections"),
        }

        match redirect? {
            Redirect::Code { code, state } if state.as_deref() == Some(expected_state) => Ok(code),
            Redirect::Code { .. } => Err(Error::new(
                "the authorization response has a mismatched state parameter",
                ErrorKind::Authorization,
            )),
            Redirect::Denied(error) => Err(Error::new(
                format!("the authorization request was denied: {error}"),
                ErrorKind::Authorization,
            )),
            Redirect::Incomplete => Err(Error::new(
                "the redirect has no authorization code",
                ErrorKind::Authorization,
            )),
        }
    }
}

async fn callback(
    State(sender): State<Sender>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Html<&'static str>) {
    let redirect = Redirect::from_query(query);
    let (status, page) = match &redirect {
        Redirect::Code { .. } => (StatusCode::OK, SUCCESS_PAGE),
        Redirect::Denied(_) => (StatusCode::OK, FAILURE_PAGE),
        Redirect::Incomplete => return (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE)),
    };
    let tx = sender.lock().ok().and_then(|mut s| s.take());
    match tx {
        Some(tx) => {
            let _ = tx.send(redirect);
        }
        None => tracing::debug!("ignoring repeated redirect"),
    }
    (status, Html(page))
}
