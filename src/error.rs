//! Error taxonomy for per-record failures.
//!
//! Both enums are caught at the pipeline boundary and downgraded to a skip;
//! only table and sink I/O (reported through `anyhow`) ends a run.

use thiserror::Error;

/// Failure to obtain a payload from an external API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response from {url} could not be decoded")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure to turn a fetched payload into metrics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("payload has no daily block")]
    MissingDailyBlock,
}
