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

//! Turns a failed run into the message printed before exiting.

use crate::settings::SettingsError;
use google_cloud_storage::Error;

/// How a failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// The service returned a structured error.
    Service,
    /// The service returned an error status without a structured payload.
    Http,
    /// A local file or configuration problem.
    Local,
    /// Anything else.
    Other,
}

/// Classifies `err` and formats the message for the console.
pub fn classify(err: &anyhow::Error) -> (Category, String) {
    if let Some(e) = err.downcast_ref::<Error>() {
        match e {
            Error::Service { error, .. } => return (Category::Service, error.message.clone()),
            Error::Http {
                status, headers, ..
            } => {
                let mut msg = format!("{status}");
                for (name, value) in headers {
                    msg.push_str(&format!(
                        "\n{name}: {}",
                        value.to_str().unwrap_or("<binary>")
                    ));
                }
                return (Category::Http, msg);
            }
            Error::Transport(e) => return (Category::Local, e.to_string()),
            Error::Io(io) => return (Category::Local, io.to_string()),
            Error::Config(msg) => return (Category::Local, msg.clone()),
            Error::Auth(e) => {
                if let Some(c) = classify_auth(e) {
                    return c;
                }
            }
            _ => {}
        }
    }
    if let Some(e) = err.downcast_ref::<SettingsError>() {
        return (Category::Local, e.to_string());
    }
    if let Some(e) = err.downcast_ref::<std::io::Error>() {
        return (Category::Local, e.to_string());
    }
    if let Some(c) = err
        .downcast_ref::<google_cloud_auth::Error>()
        .and_then(classify_auth)
    {
        return c;
    }
    (Category::Other, format!("{err:?}"))
}

fn classify_auth(e: &google_cloud_auth::Error) -> Option<(Category, String)> {
    use google_cloud_auth::ErrorKind;
    match e.kind() {
        ErrorKind::Io
        | ErrorKind::Validation
        | ErrorKind::Serialization
        | ErrorKind::Authorization => Some((Category::Local, e.to_string())),
        ErrorKind::Http => Some((Category::Http, e.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use google_cloud_auth::ErrorKind;
    use google_cloud_storage::ApiError;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use test_case::test_case;

    #[test]
    fn service() {
        let err = anyhow::Error::from(Error::Service {
            status: StatusCode::CONFLICT,
            error: ApiError::new(409, "You already own this bucket."),
        })
        .context("cannot create bucket bkt-A");
        assert_eq!(
            classify(&err),
            (Category::Service, "You already own this bucket.".to_string())
        );
    }

    #[test]
    fn http() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html"));
        let err = anyhow::Error::from(Error::Http {
            status: StatusCode::BAD_GATEWAY,
            headers,
            body: bytes::Bytes::from_static(b"<html>oops</html>"),
        });
        let (category, msg) = classify(&err);
        assert_eq!(category, Category::Http);
        assert!(msg.starts_with("502"), "{msg}");
        assert!(msg.contains("content-type: text/html"), "{msg}");
    }

    #[test]
    fn local() {
        let err = anyhow::Error::from(SettingsError::MissingProject);
        assert_eq!(classify(&err).0, Category::Local);

        let err = Err::<(), _>(std::io::Error::other("disk full"))
            .context("cannot write")
            .unwrap_err();
        assert_eq!(classify(&err), (Category::Local, "disk full".to_string()));

        let err = anyhow::Error::from(Error::Config("missing credentials".into()));
        assert_eq!(
            classify(&err),
            (Category::Local, "missing credentials".to_string())
        );
    }

    #[test]
    fn transport() -> anyhow::Result<()> {
        let Err(e) = reqwest::Client::new().get("http://[::1").build() else {
            anyhow::bail!("an invalid URL should fail");
        };
        let want = e.to_string();
        let err = anyhow::Error::from(Error::Transport(e)).context("cannot get bucket bkt-A");
        assert_eq!(classify(&err), (Category::Local, want));
        Ok(())
    }

    #[test_case(ErrorKind::Io, Category::Local)]
    #[test_case(ErrorKind::Validation, Category::Local)]
    #[test_case(ErrorKind::Serialization, Category::Local)]
    #[test_case(ErrorKind::Authorization, Category::Local)]
    #[test_case(ErrorKind::Http, Category::Http)]
    #[test_case(ErrorKind::Other, Category::Other)]
    fn auth(kind: ErrorKind, want: Category) {
        let msg = "bad request with status: 400 Bad Request, body: invalid_grant";
        // Wrapped by the storage client while fetching a token.
        let err = anyhow::Error::from(Error::Auth(google_cloud_auth::Error::new(msg, kind)));
        let (category, got) = classify(&err);
        assert_eq!(category, want);
        assert!(got.contains(msg), "{got}");

        // Returned directly by the authorization flow.
        let err = anyhow::Error::from(google_cloud_auth::Error::new(msg, kind));
        let (category, got) = classify(&err);
        assert_eq!(category, want);
        assert!(got.contains(msg), "{got}");
    }

    #[test]
    fn other() {
        let err = anyhow::anyhow!("root cause").context("while doing something");
        let (category, msg) = classify(&err);
        assert_eq!(category, Category::Other);
        assert!(msg.contains("while doing something"), "{msg}");
        assert!(msg.contains("root cause"), "{msg}");
    }
}
