//! Resolves a config file and command-line overrides into one setup.

use std::path::Path;

use anyhow::{Context, Result};
use tiltnoise_spec::validation::validate_render_setup;
use tiltnoise_spec::NoiseConfig;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// Tilt in dB/octave.
    pub tilt: Option<f32>,
    /// Base seed.
    pub seed: Option<u32>,
    /// Output channel count.
    pub channels: Option<usize>,
}

/// A validated config together with the sample rate it renders at.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Engine configuration, overrides applied.
    pub config: NoiseConfig,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Settings {
    /// Loads the config (or defaults), applies overrides and validates the result.
    ///
    /// # Arguments
    /// * `config_path` - Optional JSON config file
    /// * `sample_rate` - Sample rate in Hz
    /// * `overrides` - Values from the command line
    pub fn resolve(
        config_path: Option<&str>,
        sample_rate: u32,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => NoiseConfig::from_file(Path::new(path))
                .with_context(|| format!("Failed to load config file: {}", path))?,
            None => NoiseConfig::default(),
        };

        if let Some(tilt) = overrides.tilt {
            config.initial_tilt = tilt;
        }
        if let Some(seed) = overrides.seed {
            config.seed = Some(seed);
        }
        if let Some(channels) = overrides.channels {
            config.channels = channels;
        }

        let validation = validate_render_setup(&config, sample_rate as f64);
        if !validation.is_ok() {
            let messages: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
            anyhow::bail!("invalid settings:\n  {}", messages.join("\n  "));
        }

        Ok(Self {
            config,
            sample_rate,
        })
    }

    /// Loop length in samples at the configured sample rate.
    pub fn loop_length(&self) -> usize {
        self.config.loop_length(self.sample_rate as f64)
    }
}
