//! Configuration validation logic.
//!
//! Two passes exist: [`validate_config`] checks the fields that do not depend
//! on the host, and [`validate_render_setup`] combines the config with the
//! sample rate the engine is about to synthesize for.

use crate::config::{NoiseConfig, MAX_CHANNELS, MAX_LOOP_SECONDS};
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::{audible_bin_count, MAX_LOOP_SAMPLES, MIN_AUDIBLE_HZ};

/// Validates the sample-rate independent fields of a config.
///
/// # Arguments
/// * `config` - The config to validate
///
/// # Returns
/// A `ValidationResult` holding every error found.
pub fn validate_config(config: &NoiseConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if !config.loop_seconds.is_finite() || config.loop_seconds <= 0.0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidLoopDuration,
            format!(
                "loop duration must be a positive number of seconds, got {}",
                config.loop_seconds
            ),
            "loop_seconds",
        ));
    } else if config.loop_seconds > MAX_LOOP_SECONDS {
        result.add_error(ValidationError::with_path(
            ErrorCode::LoopTooLong,
            format!(
                "loop duration of {} s exceeds the {} s maximum",
                config.loop_seconds, MAX_LOOP_SECONDS
            ),
            "loop_seconds",
        ));
    }

    if config.seam_window < 2 || config.seam_window % 2 != 0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidSeamWindow,
            format!(
                "seam window must be an even number of at least 2 samples, got {}",
                config.seam_window
            ),
            "seam_window",
        ));
    }

    if !config.target_rms.is_finite() || config.target_rms <= 0.0 || config.target_rms > 1.0 {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidTargetLevel,
            format!(
                "target RMS must lie in (0, 1], got {}",
                config.target_rms
            ),
            "target_rms",
        ));
    }

    let range_ok = config.tilt_min.is_finite()
        && config.tilt_max.is_finite()
        && config.tilt_min < config.tilt_max;
    if !range_ok {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidTiltRange,
            format!(
                "tilt range [{}, {}] is empty or not finite",
                config.tilt_min, config.tilt_max
            ),
            "tilt_min",
        ));
    } else if let Err(err) = validate_tilt(config, config.initial_tilt) {
        result.add_error(ValidationError {
            path: Some("initial_tilt".to_string()),
            ..err
        });
    }

    if config.channels == 0 || config.channels > MAX_CHANNELS {
        result.add_error(ValidationError::with_path(
            ErrorCode::InvalidChannelCount,
            format!(
                "channel count must be between 1 and {}, got {}",
                MAX_CHANNELS, config.channels
            ),
            "channels",
        ));
    }

    result
}

/// Validates a config against the sample rate it will be rendered at.
///
/// Runs [`validate_config`] first, then checks the sample rate, that the seam
/// window fits strictly inside the loop, and that the loop resolves at least
/// one bin at or above [`MIN_AUDIBLE_HZ`].
pub fn validate_render_setup(config: &NoiseConfig, sample_rate: f64) -> ValidationResult {
    let mut result = validate_config(config);

    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        result.add_error(ValidationError::new(
            ErrorCode::InvalidSampleRate,
            format!("sample rate must be a positive number, got {}", sample_rate),
        ));
        return result;
    }

    // Nothing below is meaningful without a usable loop duration
    if result.has_error(ErrorCode::InvalidLoopDuration)
        || result.has_error(ErrorCode::LoopTooLong)
    {
        return result;
    }

    let length = config.loop_length(sample_rate);
    if length > MAX_LOOP_SAMPLES {
        result.add_error(ValidationError::with_path(
            ErrorCode::LoopTooLong,
            format!(
                "a {} s loop at {} Hz needs {} samples, more than the {} maximum",
                config.loop_seconds, sample_rate, length, MAX_LOOP_SAMPLES
            ),
            "loop_seconds",
        ));
        return result;
    }

    if config.seam_window >= length {
        result.add_error(ValidationError::with_path(
            ErrorCode::SeamWindowTooWide,
            format!(
                "seam window of {} samples does not fit a {}-sample loop",
                config.seam_window, length
            ),
            "seam_window",
        ));
    }

    if audible_bin_count(length, sample_rate, MIN_AUDIBLE_HZ) == 0 {
        result.add_error(ValidationError::new(
            ErrorCode::NoAudibleBins,
            format!(
                "a {}-sample loop at {} Hz has no bin at or above {} Hz",
                length, sample_rate, MIN_AUDIBLE_HZ
            ),
        ));
    }

    result
}

/// Checks that a tilt is finite and inside the configured range.
pub fn validate_tilt(config: &NoiseConfig, tilt: f32) -> Result<(), ValidationError> {
    if !tilt.is_finite() {
        return Err(ValidationError::new(
            ErrorCode::InvalidTilt,
            format!("tilt must be finite, got {}", tilt),
        ));
    }
    if tilt < config.tilt_min || tilt > config.tilt_max {
        return Err(ValidationError::new(
            ErrorCode::InvalidTilt,
            format!(
                "tilt {} dB/octave is outside [{}, {}]",
                tilt, config.tilt_min, config.tilt_max
            ),
        ));
    }
    Ok(())
}
