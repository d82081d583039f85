use thiserror::Error;

/// Errors reported by playback backends.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend does not implement the requested command.
    ///
    /// Backends legitimately implement partial capability sets; the
    /// dispatcher treats this as a silent no-op rather than a failure.
    #[error("Command not implemented by this backend")]
    Unsupported,

    /// The backend is not usable in the current environment.
    #[error("Backend not available: {0}")]
    NotAvailable(String),

    /// The backend failed to load or play a stream source.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A command was issued in a state where the backend cannot honor it.
    #[error("Invalid backend state: {0}")]
    InvalidState(String),
}

impl BackendError {
    /// Returns `true` if this error is transient and the stream can be
    /// retried with identical parameters.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Stream(_))
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_errors_are_transient() {
        assert!(BackendError::Stream("connection reset".into()).is_transient());
        assert!(!BackendError::Unsupported.is_transient());
        assert!(!BackendError::NotAvailable("no plugin".into()).is_transient());
        assert!(!BackendError::InvalidState("not configured".into()).is_transient());
    }
}
