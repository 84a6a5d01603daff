use std::path::PathBuf;
use thiserror::Error;

/// A page could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid url {0}")]
    InvalidUrl(String),
}

/// A JSON state document could not be read or written.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("refusing to overwrite {path}: it could not be loaded")]
    NotLoaded { path: PathBuf },
}

/// An alert could not be delivered.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("telegram bot token or chat id not configured")]
    NotConfigured,
    #[error("notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification rejected with HTTP {status}: {description}")]
    Rejected { status: u16, description: String },
}
