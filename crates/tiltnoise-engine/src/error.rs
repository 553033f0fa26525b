//! Error types for the noise engine.

use thiserror::Error;
use tiltnoise_spec::ValidationError;

/// Result type for engine operations.
pub type NoiseResult<T> = Result<T, NoiseError>;

/// Errors that can occur while synthesizing or publishing noise.
///
/// None of these ever reach the audio thread; the renderer degrades to
/// silence or keeps the last good buffer instead.
#[derive(Debug, Error)]
pub enum NoiseError {
    /// The configuration failed validation.
    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// Invalid sample rate.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: f64,
    },

    /// Invalid tilt value.
    #[error("invalid tilt: {tilt} dB/octave")]
    InvalidTilt {
        /// The rejected tilt.
        tilt: f32,
    },

    /// The seam window leaves no candidate offsets.
    #[error("seam window of {window} samples does not fit a {length}-sample buffer")]
    WindowTooWide {
        /// Window width in samples.
        window: usize,
        /// Buffer length in samples.
        length: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Resynthesis was requested before a sample rate was set.
    #[error("no sample rate set; call set_sample_rate_and_length first")]
    NotPrepared,

    /// Transform planning or execution failed.
    #[error("synthesis error: {message}")]
    Synthesis {
        /// Error message.
        message: String,
    },

    /// The audio thread has not consumed earlier buffers yet.
    #[error("publish queue is full; buffer discarded")]
    QueueFull,

    /// The control loop is no longer running.
    #[error("control loop has shut down")]
    Disconnected,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl NoiseError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a synthesis error.
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis {
            message: message.into(),
        }
    }

    /// Returns a stable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            NoiseError::InvalidConfig(_) => "NOISE_001",
            NoiseError::InvalidSampleRate { .. } => "NOISE_002",
            NoiseError::InvalidTilt { .. } => "NOISE_003",
            NoiseError::WindowTooWide { .. } => "NOISE_004",
            NoiseError::InvalidParameter { .. } => "NOISE_005",
            NoiseError::NotPrepared => "NOISE_006",
            NoiseError::Synthesis { .. } => "NOISE_007",
            NoiseError::QueueFull => "NOISE_008",
            NoiseError::Disconnected => "NOISE_009",
        }
    }

    /// Returns true for errors caused by the caller's configuration rather
    /// than by a runtime failure.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NoiseError::InvalidConfig(_)
                | NoiseError::InvalidSampleRate { .. }
                | NoiseError::InvalidTilt { .. }
                | NoiseError::WindowTooWide { .. }
                | NoiseError::InvalidParameter { .. }
        )
    }
}
