//! Error types for configuration validation.

use thiserror::Error;

/// Error codes for configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// TN001: Sample rate is not a positive finite number
    InvalidSampleRate,
    /// TN002: Loop duration is not a positive finite number
    InvalidLoopDuration,
    /// TN003: Seam window is odd or smaller than two samples
    InvalidSeamWindow,
    /// TN004: Seam window does not fit inside the loop
    SeamWindowTooWide,
    /// TN005: Loop has no bin at or above the audible floor
    NoAudibleBins,
    /// TN006: Target RMS level outside (0, 1]
    InvalidTargetLevel,
    /// TN007: Tilt range is empty or not finite
    InvalidTiltRange,
    /// TN008: Tilt value is not finite or lies outside the range
    InvalidTilt,
    /// TN009: Channel count outside the supported range
    InvalidChannelCount,
    /// TN010: Loop is longer than the engine will synthesize
    LoopTooLong,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "TN001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidSampleRate => "TN001",
            ErrorCode::InvalidLoopDuration => "TN002",
            ErrorCode::InvalidSeamWindow => "TN003",
            ErrorCode::SeamWindowTooWide => "TN004",
            ErrorCode::NoAudibleBins => "TN005",
            ErrorCode::InvalidTargetLevel => "TN006",
            ErrorCode::InvalidTiltRange => "TN007",
            ErrorCode::InvalidTilt => "TN008",
            ErrorCode::InvalidChannelCount => "TN009",
            ErrorCode::LoopTooLong => "TN010",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Name of the offending config field (e.g., "seam_window").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error pointing at a config field.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for configuration operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Validation failed with one or more errors.
    #[error("configuration validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationError>),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Creates a successful validation result.
    pub fn success() -> Self {
        Self::default()
    }

    /// Returns true if no errors were recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if at least one error was recorded.
    pub fn is_err(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Records an error.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Returns true if an error with the given code was recorded.
    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Converts into a `Result`, failing with every recorded error.
    pub fn into_result(self) -> Result<(), SpecError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SpecError::ValidationFailed(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::InvalidSampleRate.code(), "TN001");
        assert_eq!(ErrorCode::InvalidChannelCount.to_string(), "TN009");
        assert_eq!(ErrorCode::LoopTooLong.code(), "TN010");
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::with_path(
            ErrorCode::SeamWindowTooWide,
            "window of 1024 samples does not fit a 480-sample loop",
            "seam_window",
        );
        assert_eq!(
            err.to_string(),
            "TN004: window of 1024 samples does not fit a 480-sample loop (at seam_window)"
        );
    }

    #[test]
    fn test_validation_result_into_result() {
        let mut result = ValidationResult::success();
        assert!(result.clone().into_result().is_ok());

        result.add_error(ValidationError::new(ErrorCode::InvalidTilt, "NaN"));
        assert!(result.has_error(ErrorCode::InvalidTilt));
        match result.into_result() {
            Err(SpecError::ValidationFailed(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
