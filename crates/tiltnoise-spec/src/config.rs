//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, ValidationResult};
use crate::round_up_even;
use crate::validation::validate_config;

/// Largest supported output channel count.
pub const MAX_CHANNELS: usize = 8;

/// Longest accepted loop duration in seconds.
pub const MAX_LOOP_SECONDS: f64 = 60.0;

/// Configuration for the noise engine.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseConfig {
    /// Loop duration in seconds. The loop holds `ceil(sample_rate * loop_seconds)`
    /// samples, rounded up to an even count.
    #[serde(default = "default_loop_seconds")]
    pub loop_seconds: f64,
    /// Width of the seam search and crossfade window in samples.
    #[serde(default = "default_seam_window")]
    pub seam_window: usize,
    /// RMS level every synthesized buffer is normalized to.
    #[serde(default = "default_target_rms")]
    pub target_rms: f32,
    /// Lowest accepted tilt in dB/octave.
    #[serde(default = "default_tilt_min")]
    pub tilt_min: f32,
    /// Highest accepted tilt in dB/octave.
    #[serde(default = "default_tilt_max")]
    pub tilt_max: f32,
    /// Tilt used for the first synthesis, in dB/octave.
    #[serde(default)]
    pub initial_tilt: f32,
    /// Number of output channels.
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Base seed for the noise generator. `None` draws one from entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

fn default_loop_seconds() -> f64 {
    1.0
}

fn default_seam_window() -> usize {
    1024
}

fn default_target_rms() -> f32 {
    0.2
}

fn default_tilt_min() -> f32 {
    -12.0
}

fn default_tilt_max() -> f32 {
    12.0
}

fn default_channels() -> usize {
    2
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            loop_seconds: default_loop_seconds(),
            seam_window: default_seam_window(),
            target_rms: default_target_rms(),
            tilt_min: default_tilt_min(),
            tilt_max: default_tilt_max(),
            initial_tilt: 0.0,
            channels: default_channels(),
            seed: None,
        }
    }
}

impl NoiseConfig {
    /// Parses a config from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let config: NoiseConfig = serde_json::from_str(json)?;
        config.validate().into_result()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the config as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the sample-rate independent fields.
    pub fn validate(&self) -> ValidationResult {
        validate_config(self)
    }

    /// Returns the loop length in samples for a sample rate.
    ///
    /// Returns 0 for a sample rate or duration that is not positive, and
    /// saturates at the largest even `usize` for durations too long to count.
    pub fn loop_length(&self, sample_rate: f64) -> usize {
        let samples = sample_rate * self.loop_seconds;
        if samples.is_nan() || samples <= 0.0 {
            return 0;
        }
        round_up_even(samples.ceil() as usize).unwrap_or(usize::MAX - 1)
    }

    /// Clamps a tilt into the configured range. Non-finite input yields `None`.
    pub fn clamp_tilt(&self, tilt: f32) -> Option<f32> {
        if tilt.is_finite() {
            Some(tilt.clamp(self.tilt_min, self.tilt_max))
        } else {
            None
        }
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the starting tilt.
    pub fn with_initial_tilt(mut self, tilt: f32) -> Self {
        self.initial_tilt = tilt;
        self
    }

    /// Sets the channel count.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Sets the loop duration.
    pub fn with_loop_seconds(mut self, seconds: f64) -> Self {
        self.loop_seconds = seconds;
        self
    }

    /// Sets the seam window width.
    pub fn with_seam_window(mut self, width: usize) -> Self {
        self.seam_window = width;
        self
    }
}
