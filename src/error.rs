//! Error types for qadesk
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in qadesk
#[derive(Debug, Error)]
pub enum QaError {
    /// Step id does not belong to the test case being executed
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// Step index outside the test case's step range
    #[error("Step index {index} out of range (test case has {count} steps)")]
    StepOutOfRange { index: usize, count: usize },

    /// Invalid state transition or operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Conversational assistant error
    #[error("Assistant error: {0}")]
    Assistant(String),

    /// Assistant returned a tool call the store cannot act on
    #[error("Malformed tool call: {0}")]
    MalformedToolCall(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for qadesk operations
pub type Result<T> = std::result::Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_step_error() {
        let err = QaError::UnknownStep("s9".to_string());
        assert_eq!(err.to_string(), "Unknown step: s9");
    }

    #[test]
    fn test_step_out_of_range_error() {
        let err = QaError::StepOutOfRange { index: 4, count: 3 };
        assert_eq!(err.to_string(), "Step index 4 out of range (test case has 3 steps)");
    }

    #[test]
    fn test_storage_error() {
        let err = QaError::Storage("file locked".to_string());
        assert_eq!(err.to_string(), "Storage error: file locked");
    }

    #[test]
    fn test_assistant_error() {
        let err = QaError::Assistant("rate limited".to_string());
        assert_eq!(err.to_string(), "Assistant error: rate limited");
    }

    #[test]
    fn test_malformed_tool_call_error() {
        let err = QaError::MalformedToolCall("createTestCase: missing field `title`".to_string());
        assert!(err.to_string().starts_with("Malformed tool call:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: QaError = io_err.into();
        assert!(matches!(err, QaError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: QaError = json_err.into();
        assert!(matches!(err, QaError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(QaError::InvalidState("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
