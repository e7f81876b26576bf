//! Error types for cuetrack.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuetrackError {
    // Recognition capability errors
    #[error("Speech recognition is not supported on this platform")]
    RecognitionUnsupported,

    #[error("Microphone permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Recognition error: {message}")]
    Recognition { message: String },

    // Session lifecycle errors
    #[error("Session command channel closed")]
    SessionClosed,

    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CuetrackError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_recognition_unsupported_display() {
        let error = CuetrackError::RecognitionUnsupported;
        assert_eq!(
            error.to_string(),
            "Speech recognition is not supported on this platform"
        );
    }

    #[test]
    fn test_permission_denied_display() {
        let error = CuetrackError::PermissionDenied {
            message: "user dismissed the prompt".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Microphone permission denied: user dismissed the prompt"
        );
    }

    #[test]
    fn test_recognition_display() {
        let error = CuetrackError::Recognition {
            message: "network".to_string(),
        };
        assert_eq!(error.to_string(), "Recognition error: network");
    }

    #[test]
    fn test_session_closed_display() {
        let error = CuetrackError::SessionClosed;
        assert_eq!(error.to_string(), "Session command channel closed");
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = CuetrackError::ConfigInvalidValue {
            key: "tracking.similarity_threshold".to_string(),
            message: "must be within [0, 1]".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for tracking.similarity_threshold: must be within [0, 1]"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: CuetrackError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: CuetrackError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<CuetrackError>();
        assert_sync::<CuetrackError>();
    }
}
