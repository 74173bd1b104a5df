#![forbid(unsafe_code)]

//! Request/response transport for the device's JSON API.
//!
//! [`Transport`] is the seam between the protocol logic in
//! [`DisplayClient`](crate::DisplayClient) and the wire. [`HttpTransport`]
//! speaks HTTP through a blocking `reqwest` client; [`MemoryTransport`]
//! answers from a table and records what was posted, for tests and dry
//! runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A failed exchange with the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No response: connection refused, DNS failure, timeout.
    Request { path: String, reason: String },
    /// The device answered with a non-success status.
    Status { path: String, status: u16 },
    /// The response body is not the JSON it should be.
    Body { path: String, reason: String },
}

impl TransportError {
    pub fn path(&self) -> &str {
        match self {
            Self::Request { path, .. } | Self::Status { path, .. } | Self::Body { path, .. } => {
                path
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { path, reason } => write!(f, "request to {path} failed: {reason}"),
            Self::Status { path, status } => write!(f, "{path} answered with status {status}"),
            Self::Body { path, reason } => write!(f, "{path} returned an invalid body: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// JSON request/response exchange with one device.
pub trait Transport {
    /// `GET path`, decoding the body as JSON.
    fn get_json(&self, path: &str) -> Result<Value, TransportError>;

    /// `POST path` with a JSON body. The response body is ignored.
    fn post_json(&self, path: &str, body: &Value) -> Result<(), TransportError>;
}

/// Blocking HTTP transport rooted at a device's base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Transport for `host` (`"10.0.0.7"`, `"display.local:8080"` or a full
    /// `http://` URL) with [`DEFAULT_TIMEOUT`].
    pub fn new(host: &str) -> Result<Self, TransportError> {
        Self::with_timeout(host, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(host: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Request {
                path: String::new(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            base: base_url(host),
            client,
        })
    }

    /// Normalized base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

/// `host` with a scheme and without trailing slashes.
pub fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    }
}

fn request_error(path: &str, err: &reqwest::Error) -> TransportError {
    match err.status() {
        Some(status) => TransportError::Status {
            path: path.to_owned(),
            status: status.as_u16(),
        },
        None => TransportError::Request {
            path: path.to_owned(),
            reason: err.to_string(),
        },
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, path: &str) -> Result<Value, TransportError> {
        tracing::debug!(url = %self.url(path), "GET");
        let response = self
            .client
            .get(self.url(path))
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| request_error(path, &err))?;
        response.json::<Value>().map_err(|err| TransportError::Body {
            path: path.to_owned(),
            reason: err.to_string(),
        })
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<(), TransportError> {
        tracing::debug!(url = %self.url(path), "POST");
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| request_error(path, &err))?;
        Ok(())
    }
}

/// In-memory transport: canned `GET` answers, recorded `POST`s.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    documents: HashMap<String, Result<Value, TransportError>>,
    post_failures: HashMap<String, TransportError>,
    posts: Mutex<Vec<(String, Value)>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `GET path` with `value`.
    #[must_use]
    pub fn with_document(mut self, path: &str, value: Value) -> Self {
        self.documents.insert(path.to_owned(), Ok(value));
        self
    }

    /// Answer `GET path` with an error.
    #[must_use]
    pub fn with_get_failure(mut self, path: &str, err: TransportError) -> Self {
        self.documents.insert(path.to_owned(), Err(err));
        self
    }

    /// Fail every `POST path` with `err`.
    #[must_use]
    pub fn with_post_failure(mut self, path: &str, err: TransportError) -> Self {
        self.post_failures.insert(path.to_owned(), err);
        self
    }

    /// Every successful `POST` so far, in order.
    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Transport for MemoryTransport {
    fn get_json(&self, path: &str) -> Result<Value, TransportError> {
        self.documents
            .get(path)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Status {
                    path: path.to_owned(),
                    status: 404,
                })
            })
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<(), TransportError> {
        if let Some(err) = self.post_failures.get(path) {
            return Err(err.clone());
        }
        self.posts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_owned(), body.clone()));
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_json(&self, path: &str) -> Result<Value, TransportError> {
        (**self).get_json(path)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<(), TransportError> {
        (**self).post_json(path, body)
    }
}
