//! Buffered HTTP response.

use crate::{HttpClientError, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// An HTTP response with its body fully read into memory.
///
/// Buffering up front keeps retry accounting simple: once a `Response`
/// exists, the network attempt is over and nothing here can fail partway.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: url::Url,
}

impl Response {
    /// Drain a reqwest response into a buffered one.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await.unwrap_or_default();

        Self {
            status,
            headers,
            body,
            url,
        }
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Headers returned by the server.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// One header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers.get(name.as_ref())?.to_str().ok()
    }

    /// Final URL of the request, after any redirects.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Borrow the raw body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Take the raw body.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Turn a 4xx/5xx response into [`HttpClientError::Response`].
    ///
    /// The dispatch layer never does this itself; callers opt in once they
    /// have decided a non-2xx answer is an error for them.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_client_error() || self.status.is_server_error() {
            Err(HttpClientError::Response {
                status: self.status.as_u16(),
                message: self.text().unwrap_or_else(|_| "Unknown error".to_string()),
            })
        } else {
            Ok(self)
        }
    }
}
