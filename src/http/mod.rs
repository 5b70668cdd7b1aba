//! HTTP plumbing shared by the probes: request shaping, the transport
//! seam and the upload payload.

pub mod client;
pub mod payload;

pub use client::{HttpTransport, Transport};
pub use payload::RandomPayload;

use chrono::Utc;
use reqwest::StatusCode;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use url::Url;

pub(crate) const UA: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

/// Query parameter carrying the cache-buster.
pub const CACHE_BUSTER_PARAM: &str = "_";

/// Query parameter carrying the requested download size.
pub const BYTES_PARAM: &str = "bytes";

/// One completed request as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub status: StatusCode,
    /// Body bytes received (GET) or sent (POST).
    pub bytes: u64,
    /// Wall-clock time from sending the request to the last body byte.
    pub elapsed: Duration,
}

/// Why a request produced no [`Exchange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request deadline passed.
    Timeout,
    /// Connection, TLS, protocol or body error.
    Failed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Failed(message) => write!(f, "{}", message),
        }
    }
}

impl Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return TransportError::Timeout;
        }

        // reqwest's own message omits the cause (DNS, refused, TLS...).
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        TransportError::Failed(message)
    }
}

/// Current cache-buster value (unix milliseconds).
pub fn cache_buster() -> i64 {
    Utc::now().timestamp_millis()
}

/// `base` with a cache-busting parameter appended.
pub fn sample_url(base: &Url, buster: i64) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair(CACHE_BUSTER_PARAM, &buster.to_string());
    url
}

/// `base` asking the server for `bytes` bytes, with a cache-buster.
pub fn download_url(base: &Url, bytes: u64, buster: i64) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair(BYTES_PARAM, &bytes.to_string())
        .append_pair(CACHE_BUSTER_PARAM, &buster.to_string());
    url
}
