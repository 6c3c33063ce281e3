use std::io;

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Everything that can stop a load. None of these are retried.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("{method} {path} failed with status {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to load bulk data {0}")]
    BulkErrors(String),
    #[error("Can't find [{0}]")]
    ResourceNotFound(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("verification of index '{index}' failed: {}", .problems.join("; "))]
    Verification { index: String, problems: Vec<String> },
}

pub type Result<T> = std::result::Result<T, LoaderError>;
