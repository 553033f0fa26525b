//! tiltnoise CLI - Command-line interface for spectrally tilted noise loops
//!
//! This binary renders noise loops to WAV, reports loop and seam metrics and,
//! with the `playback` feature, plays the noise through the default device.

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;

use tiltnoise_cli::commands;
use tiltnoise_cli::logging;
use tiltnoise_cli::settings::{Overrides, Settings};

/// tiltnoise - Spectrally tilted, seamlessly looping noise
#[derive(Parser)]
#[command(name = "tiltnoise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render noise to a 32-bit float WAV file
    Render {
        /// Output WAV path
        #[arg(short, long)]
        output: String,

        /// Spectral tilt in dB/octave around 1 kHz
        #[arg(short, long, allow_hyphen_values = true)]
        tilt: Option<f32>,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,

        /// Duration to render in seconds
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,

        /// Number of output channels
        #[arg(short, long)]
        channels: Option<usize>,

        /// Base seed (random if omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// JSON config file
        #[arg(long)]
        config: Option<String>,
    },

    /// Synthesize one loop and print level and seam metrics
    Inspect {
        /// Spectral tilt in dB/octave around 1 kHz
        #[arg(short, long, allow_hyphen_values = true)]
        tilt: Option<f32>,

        /// Sample rate in Hz
        #[arg(long, default_value_t = 48_000)]
        sample_rate: u32,

        /// Base seed (random if omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// JSON config file
        #[arg(long)]
        config: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Play noise through the default output device
    #[cfg(feature = "playback")]
    Play {
        /// Spectral tilt in dB/octave around 1 kHz
        #[arg(short, long, allow_hyphen_values = true)]
        tilt: Option<f32>,

        /// Duration to play in seconds
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,

        /// Glide the tilt to this value over the duration
        #[arg(long, allow_hyphen_values = true)]
        sweep_to: Option<f32>,

        /// Base seed (random if omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// JSON config file
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            output,
            tilt,
            sample_rate,
            seconds,
            channels,
            seed,
            config,
        } => {
            let overrides = Overrides {
                tilt,
                seed,
                channels,
            };
            Settings::resolve(config.as_deref(), sample_rate, &overrides)
                .and_then(|settings| commands::render::run(&output, &settings, seconds))
        }
        Commands::Inspect {
            tilt,
            sample_rate,
            seed,
            config,
            json,
        } => {
            let overrides = Overrides {
                tilt,
                seed,
                channels: Some(1),
            };
            Settings::resolve(config.as_deref(), sample_rate, &overrides)
                .and_then(|settings| commands::inspect::run(&settings, json))
        }
        #[cfg(feature = "playback")]
        Commands::Play {
            tilt,
            seconds,
            sweep_to,
            seed,
            config,
        } => {
            let overrides = Overrides {
                tilt,
                seed,
                channels: None,
            };
            commands::play::run(config.as_deref(), &overrides, seconds, sweep_to)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
