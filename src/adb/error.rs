use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for ADB operations.
pub type AdbResult<T> = Result<T, AdbError>;

/// The error type for all ADB-related operations.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("ADB tool path is not configured. Call set_adb_path() or set ADB_PATH.")]
    ToolPathUnset,

    #[error("Invalid ADB tool path {path:?}: {reason}")]
    InvalidToolPath { path: PathBuf, reason: String },

    #[error("Bad call: {message}")]
    BadCall { message: String },

    #[error("Insufficient permissions to enumerate devices: {diagnostic}")]
    Permissions { diagnostic: String },

    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' terminated abnormally: {description}")]
    AbnormalExit { command: String, description: String },

    #[error("'{command}' timed out after {duration:?}")]
    Timeout {
        command: String,
        duration: std::time::Duration,
    },

    #[error("'{command}' failed: {diagnostic}")]
    CommandFailed { command: String, diagnostic: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse classification of an [`AdbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The tool path is unset or invalid.
    Configuration,
    /// A precondition checked before spawning was violated.
    BadCall,
    /// Discovery reported that devices cannot be enumerated with current rights.
    Permissions,
    /// The child process could not run, or did not finish normally.
    Execution,
    /// Otherwise well-formed output could not be interpreted.
    Internal,
}

impl AdbError {
    pub fn bad_call(message: impl Into<String>) -> Self {
        AdbError::BadCall {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AdbError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AdbError::ToolPathUnset | AdbError::InvalidToolPath { .. } => ErrorKind::Configuration,
            AdbError::BadCall { .. } => ErrorKind::BadCall,
            AdbError::Permissions { .. } => ErrorKind::Permissions,
            AdbError::SpawnFailed { .. }
            | AdbError::AbnormalExit { .. }
            | AdbError::Timeout { .. }
            | AdbError::CommandFailed { .. } => ErrorKind::Execution,
            AdbError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if the caller can fix this by supplying different arguments or state
    pub fn is_bad_call(&self) -> bool {
        self.kind() == ErrorKind::BadCall
    }

    /// Check if this error indicates that adb itself is missing or misconfigured
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_groups_execution_failures() {
        let err = AdbError::Timeout {
            command: "wait-for-device".to_string(),
            duration: std::time::Duration::from_secs(1),
        };
        assert_eq!(err.kind(), ErrorKind::Execution);

        let err = AdbError::CommandFailed {
            command: "get-state".to_string(),
            diagnostic: "error: no devices/emulators found".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.to_string().contains("no devices/emulators found"));
    }

    #[test]
    fn configuration_errors_are_flagged() {
        assert!(AdbError::ToolPathUnset.is_configuration());
        let err = AdbError::InvalidToolPath {
            path: PathBuf::from("/nope/adb"),
            reason: "does not exist".to_string(),
        };
        assert!(err.is_configuration());
        assert!(!err.is_bad_call());
    }

    #[test]
    fn bad_call_message_is_preserved() {
        let err = AdbError::bad_call("Must set target device first");
        assert!(err.is_bad_call());
        assert_eq!(err.to_string(), "Bad call: Must set target device first");
    }
}
