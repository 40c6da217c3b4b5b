use std::fmt;
use std::path::PathBuf;

use http::StatusCode;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// The remote service a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    GitHub,
    ZenHub,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitHub => f.write_str("GitHub"),
            Self::ZenHub => f.write_str("ZenHub"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error kinds and handling policy
// ---------------------------------------------------------------------------

/// Coarse error category, used by callers to branch on handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Auth,
    TransientApi,
    /// A non-retryable rejection (other 4xx) or an undecodable response.
    Api,
    NotFoundMetadata,
    ConversionWarning,
    Write,
}

/// What the pipeline does when it meets an error of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Abort the run immediately.
    Fatal,
    /// Retry with backoff; abort once attempts are exhausted.
    RetryThenFatal,
    /// Absorb locally and continue.
    Absorb,
}

impl ErrorKind {
    pub fn policy(self) -> Policy {
        match self {
            Self::Config | Self::Auth | Self::Api | Self::Write => Policy::Fatal,
            Self::TransientApi => Policy::RetryThenFatal,
            Self::NotFoundMetadata | Self::ConversionWarning => Policy::Absorb,
        }
    }

    /// Process exit code for fatal kinds.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Config => 2,
            Self::Auth => 3,
            Self::TransientApi | Self::Api => 4,
            Self::Write => 5,
            Self::NotFoundMetadata | Self::ConversionWarning => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Bad or missing CLI, environment or settings-file input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {service} token found; set {vars}")]
    MissingToken {
        service: Service,
        vars: &'static str,
    },
    #[error("{service} token contains characters not allowed in an HTTP header")]
    InvalidToken { service: Service },
    #[error("repository {0:?} is not in owner/name form")]
    InvalidRepository(String),
    #[error("ZenHub repository id {0:?} is not a positive integer")]
    InvalidTrackerId(String),
    #[error("issue state {0:?} is not one of: open, closed, all")]
    InvalidState(String),
    #[error("--html expects 0 or 1, got {0:?}")]
    InvalidHtmlFlag(String),
    #[error("--since expects a YYYY-MM-DD date, got {0:?}")]
    InvalidSince(String),
    #[error("reading {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing TOML from {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

/// The output file could not be produced.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{} already exists (refusing to overwrite)", path.display())]
    Exists { path: PathBuf },
    #[error("writing workbook {}", path.display())]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("writing CSV {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure that ends an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{service} rejected the credentials (HTTP {status})")]
    Auth { service: Service, status: StatusCode },
    #[error("{service} request to {url} failed after {attempts} attempt(s): {reason}")]
    TransientApi {
        service: Service,
        url: String,
        attempts: u32,
        reason: String,
    },
    #[error("{service} returned HTTP {status} for {url}")]
    Api {
        service: Service,
        url: String,
        status: StatusCode,
    },
    #[error("{service} request to {url} could not be sent")]
    Transport {
        service: Service,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("decoding {service} response from {url}")]
    Decode {
        service: Service,
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::TransientApi { .. } => ErrorKind::TransientApi,
            Self::Api { .. } | Self::Transport { .. } | Self::Decode { .. } => ErrorKind::Api,
            Self::Write(_) => ErrorKind::Write,
        }
    }
}
