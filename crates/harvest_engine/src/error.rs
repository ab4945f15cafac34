use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("destination folder unusable: {0}")]
    Folder(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("payload from {origin} is not valid {expected}: {message}")]
    Malformed {
        origin: String,
        expected: &'static str,
        message: String,
    },
    #[error("payload from {origin} has no recognizable media structure")]
    UnexpectedShape { origin: String },
}

/// Run-level failures. Anything else is reported per item or per task.
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("session could not be established: {0}")]
    Session(String),
    #[error("initial target could not be loaded: {0}")]
    InitialLoad(#[source] FetchError),
    #[error("discovery collaborator failed: {0}")]
    Discovery(String),
    #[error("transport setup failed: {0}")]
    Transport(#[source] FetchError),
    #[error("invalid configuration: {0}")]
    Config(String),
}
