use thiserror::Error;

/// Fault taxonomy for the automation engine.
///
/// A bookmark that does not resolve is *not* an error: resolution APIs return
/// `Ok(None)` for absence so callers can probe cheaply. These variants cover
/// genuine faults only.
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
