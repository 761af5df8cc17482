//! Error types for the API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of the client-credentials token exchange.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport failure (DNS, TLS, timeout, ...)
    #[error("token request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Authorization server answered with a non-success status
    #[error("token request rejected with {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body was not the expected JSON object
    #[error("token response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),

    /// Response had no usable `access_token`
    #[error("access token not found in the token response")]
    MissingToken,
}

/// Failure of a listing call (owners or tasks).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Could not authorize the call
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport failure (DNS, TLS, timeout, ...)
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("GET {url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Body was not valid JSON
    #[error("GET {url} returned an undecodable body: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
