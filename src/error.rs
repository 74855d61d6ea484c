//! Error types for each external boundary of the pipeline.
//!
//! Only [`ConfigError`] and [`ArchiveError`] ever reach `main`. Fetch and
//! reasoning failures are classified here so callers can pick a fallback
//! instead of aborting the run.

use thiserror::Error;

/// Startup configuration problems. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingCredential(&'static str),

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures talking to the search API or downloading article pages.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Error body from the search API; `status` is the HTTP status it came with.
    #[error("search API error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid URL {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Api { status, code, .. } => {
                code == "rateLimited" || *status == 429 || *status >= 500
            }
            FetchError::Decode(_) | FetchError::InvalidUrl(_) => false,
        }
    }
}

/// Why a reasoning-service call did not produce usable text.
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("reasoning service not configured")]
    NotConfigured,

    #[error("reasoning call timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response")]
    Empty,
}

impl From<reqwest::Error> for ReasoningError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ReasoningError::Timeout
        } else {
            ReasoningError::Network(e)
        }
    }
}

/// Cloneable classification of a [`ReasoningError`], kept on summaries that
/// fell back to local output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotConfigured,
    Timeout,
    Network,
    Status(u16),
    Malformed,
    Empty,
}

impl ReasoningError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReasoningError::NotConfigured => FailureKind::NotConfigured,
            ReasoningError::Timeout => FailureKind::Timeout,
            ReasoningError::Network(_) => FailureKind::Network,
            ReasoningError::Status { status, .. } => FailureKind::Status(*status),
            ReasoningError::Malformed(_) => FailureKind::Malformed,
            ReasoningError::Empty => FailureKind::Empty,
        }
    }
}

/// Archive and export I/O failures.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ArchiveError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
