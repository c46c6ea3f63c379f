use thiserror::Error;

/// Failures surfaced by the scan client and orchestrator.
///
/// Report parse failures never show up here: the parser absorbs them and
/// returns an empty host list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// Target failed client-side validation; nothing was sent to the backend.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The backend rejected the scan or did not hand back a job/stream.
    #[error("failed to start scan: {0}")]
    StartFailed(String),

    #[error("failed to poll scan status: {0}")]
    PollFailed(String),

    #[error("scan stream error: {0}")]
    StreamError(String),

    #[error("failed to cancel scan: {0}")]
    CancelFailed(String),

    #[error("WAN address has not been resolved")]
    MissingWanAddress,

    #[error("not found: {0}")]
    NotFound(String),

    /// Any other backend request (job listing, client directory).
    #[error("backend request failed: {0}")]
    Backend(String),
}

pub type ScanResult<T> = std::result::Result<T, ScanError>;
