//! Error types for jitaudit-log

use thiserror::Error;

use jitaudit_wire::WireError;

/// Errors that can occur while recording or reading an audit log
#[derive(Debug, Error)]
pub enum AuditError {
    /// The log sink could not be opened; nothing was recorded
    #[error("Failed to open audit log {target}: {reason}")]
    Open { target: String, reason: String },

    /// Writing a record to the sink failed
    #[error("Failed to write audit record: {0}")]
    Write(String),

    /// An earlier write failed, so the log can no longer be decoded past that point
    #[error("Audit log is poisoned by an earlier write failure")]
    Poisoned,

    /// A record could not be encoded or decoded
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    /// The log does not start with the expected VM definitions
    #[error("Invalid preamble: {0}")]
    InvalidPreamble(String),

    /// I/O error outside of record writing
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io(err.to_string())
    }
}

impl AuditError {
    /// Create a new Open error
    pub fn open(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Open {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new Write error
    pub fn write(reason: impl ToString) -> Self {
        Self::Write(reason.to_string())
    }

    /// Create a new InvalidPreamble error
    pub fn invalid_preamble(message: impl Into<String>) -> Self {
        Self::InvalidPreamble(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error() {
        let err = AuditError::open("/nowhere/audit.log", "permission denied");
        assert!(matches!(err, AuditError::Open { .. }));
        assert!(err.to_string().contains("/nowhere/audit.log"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AuditError = io_err.into();
        assert!(matches!(err, AuditError::Io(_)));
    }

    #[test]
    fn test_wire_error_conversion() {
        let err: AuditError = WireError::MapTooLarge(16).into();
        assert!(matches!(err, AuditError::Wire(WireError::MapTooLarge(16))));
    }
}
