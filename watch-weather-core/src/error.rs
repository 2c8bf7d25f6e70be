use std::time::Duration;

use thiserror::Error;

/// Failure to obtain the host position.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Location lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Location request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Location service at {url} answered with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode location response")]
    Decode(#[source] serde_json::Error),

    #[error("Location service could not resolve the host position: {0}")]
    Unavailable(String),
}

/// Failure while fetching or translating a weather reading.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid request URL '{0}'")]
    InvalidUrl(String),

    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with status {status}: {body}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to decode weather JSON")]
    Decode(#[source] serde_json::Error),

    #[error("Weather response is missing field '{0}'")]
    MissingField(&'static str),
}

/// Failure on the device bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Failed to encode device message")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode bridge event")]
    Decode(#[source] serde_json::Error),

    #[error("Device link write failed")]
    Io(#[from] std::io::Error),

    #[error("Device rejected the message: {0}")]
    Rejected(String),
}

/// A weather pipeline aborted in one of its three stages.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("locate stage failed")]
    Locate(#[source] LocateError),

    #[error("fetch stage failed")]
    Fetch(#[source] FetchError),

    #[error("deliver stage failed")]
    Deliver(#[source] BridgeError),
}

impl RelayError {
    pub fn stage(&self) -> &'static str {
        match self {
            RelayError::Locate(_) => "locate",
            RelayError::Fetch(_) => "fetch",
            RelayError::Deliver(_) => "deliver",
        }
    }
}
