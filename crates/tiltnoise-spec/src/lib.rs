//! tiltnoise Configuration Library
//!
//! This crate provides the configuration types, fixed constants and validation
//! rules shared by the tiltnoise engine and its command-line front end.
//!
//! # Overview
//!
//! A [`NoiseConfig`] describes how the engine builds its looping noise buffer:
//! the loop length relative to the sample rate, the width of the seam window,
//! the normalized output level, the allowed tilt range and the channel count.
//! Configurations are plain JSON documents on disk.
//!
//! # Example
//!
//! ```
//! use tiltnoise_spec::{NoiseConfig, validation::validate_render_setup};
//!
//! let config = NoiseConfig::default();
//! assert!(config.validate().is_ok());
//!
//! // Combine with a concrete sample rate before synthesis
//! let setup = validate_render_setup(&config, 48_000.0);
//! assert!(setup.is_ok());
//! assert_eq!(config.loop_length(48_000.0), 48_000);
//! ```
//!
//! # Modules
//!
//! - [`config`]: The serializable engine configuration
//! - [`error`]: Error codes and validation result types
//! - [`validation`]: Configuration and render-setup validation

pub mod config;
pub mod error;
pub mod validation;

pub use config::{NoiseConfig, MAX_CHANNELS, MAX_LOOP_SECONDS};
pub use error::{ErrorCode, SpecError, ValidationError, ValidationResult};

/// Frequency at which every tilt has unity gain, in Hz.
pub const PIVOT_HZ: f64 = 1000.0;

/// Bins below this frequency are removed before the tilt is applied, in Hz.
pub const MIN_AUDIBLE_HZ: f64 = 20.0;

/// Longest loop the engine will synthesize, in samples.
pub const MAX_LOOP_SAMPLES: usize = 1 << 24;

/// Rounds a sample count up to the nearest even number.
///
/// The real-valued inverse transform used for synthesis needs an even length.
/// Returns `None` when the rounded count does not fit in a `usize`.
pub fn round_up_even(length: usize) -> Option<usize> {
    length.checked_add(length % 2)
}

/// Counts the half-spectrum bins of a `length`-sample buffer whose frequency is
/// at or above `min_hz`.
///
/// # Arguments
/// * `length` - Time-domain buffer length in samples
/// * `sample_rate` - Sample rate in Hz
/// * `min_hz` - Lowest frequency that counts as audible
pub fn audible_bin_count(length: usize, sample_rate: f64, min_hz: f64) -> usize {
    if length < 2 || !(sample_rate > 0.0) {
        return 0;
    }
    let last_bin = length / 2;
    let first_bin = (min_hz * length as f64 / sample_rate).ceil().max(0.0) as usize;
    if first_bin > last_bin {
        0
    } else {
        last_bin - first_bin + 1
    }
}
