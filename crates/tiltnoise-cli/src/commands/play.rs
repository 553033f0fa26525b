//! Play command implementation
//!
//! Opens the default output device, holds a note on every channel and plays
//! the noise loop live. The engine runs on its own control thread; the device
//! callback only drives the renderer.

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use colored::Colorize;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tiltnoise_engine::{ControlLoop, NoiseEngine, NoteEvent};

use crate::settings::{Overrides, Settings};

/// Interval between tilt updates during a sweep.
const SWEEP_STEP: Duration = Duration::from_millis(50);

/// Run the play command
///
/// # Arguments
/// * `config_path` - Optional JSON config file
/// * `overrides` - Values from the command line; the channel count always
///   follows the device
/// * `seconds` - How long to play
/// * `sweep_to` - Tilt to glide towards over the duration, if any
///
/// # Returns
/// Exit code: 0 on success
pub fn run(
    config_path: Option<&str>,
    overrides: &Overrides,
    seconds: f64,
    sweep_to: Option<f32>,
) -> Result<ExitCode> {
    if !seconds.is_finite() || seconds <= 0.0 {
        anyhow::bail!("duration must be a positive number of seconds, got {}", seconds);
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("No audio output device found")?;
    let supported = device
        .default_output_config()
        .context("Failed to get audio config")?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!(
            "output device uses {:?} samples, only f32 is supported",
            supported.sample_format()
        );
    }
    let stream_config: cpal::StreamConfig = supported.into();
    let channels = stream_config.channels as usize;

    let overrides = Overrides {
        channels: Some(channels),
        ..overrides.clone()
    };
    let settings = Settings::resolve(config_path, stream_config.sample_rate.0, &overrides)?;

    println!(
        "{} {} @ {} Hz, {} channels",
        "Audio:".cyan().bold(),
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        settings.sample_rate,
        channels
    );

    let (mut engine, mut renderer) =
        NoiseEngine::create(settings.config.clone()).context("Failed to create noise engine")?;
    let report = engine
        .set_sample_rate_and_length(settings.sample_rate as f64)
        .context("Failed to synthesize noise loop")?;
    println!(
        "  {} {} samples, seam at {}, tilt {:+.2} dB/octave",
        "Loop:".dimmed(),
        report.length,
        report.seam.offset,
        report.tilt
    );

    let control = ControlLoop::spawn(engine);
    let start_tilt = control.tilt().get();

    let mut pending: Vec<NoteEvent> = (0..channels).map(|ch| NoteEvent::on(0, ch)).collect();
    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                renderer.process_interleaved(data, channels, &pending);
                pending.clear();
            },
            |err| tracing::error!("audio stream error: {}", err),
            None,
        )
        .context("Failed to build audio stream")?;
    stream.play().context("Failed to start audio stream")?;

    let duration = Duration::from_secs_f64(seconds);
    let started = Instant::now();
    let mut failed = 0;
    while started.elapsed() < duration {
        thread::sleep(SWEEP_STEP.min(duration.saturating_sub(started.elapsed())));
        if let Some(target) = sweep_to {
            let progress = (started.elapsed().as_secs_f64() / seconds).min(1.0) as f32;
            control.set_tilt(start_tilt + (target - start_tilt) * progress)?;
        }
        // Already logged by the control thread
        failed += control.drain_errors().len();
    }

    drop(stream);
    control.shutdown().context("Control thread failed")?;

    if failed > 0 {
        println!("  {} {} resyntheses failed", "Warning:".yellow(), failed);
    }
    println!("\n{} after {:.2}s", "Stopped".green().bold(), seconds);
    Ok(ExitCode::SUCCESS)
}
