use std::path::PathBuf;

use thiserror::Error;

/// Message used when neither the server nor the caller supplied one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed.";

/// Failure of the transport itself; no HTTP response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connect(String),
}

/// Uniform error raised by the fetch wrapper.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response.
    #[error("{message}")]
    Http { message: String, status: u16 },

    /// The request never produced a response.
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: TransportError,
    },

    #[error("Unexpected response payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl FetchError {
    pub fn message(&self) -> String {
        match self {
            FetchError::Http { message, .. } | FetchError::Network { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// HTTP status code, present only for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
