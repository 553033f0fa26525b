//! Render command implementation
//!
//! Runs the engine and the real-time renderer offline with every channel's
//! note held, and writes the result as a 32-bit float WAV file.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use hound::{SampleFormat, WavSpec, WavWriter};
use tiltnoise_engine::NoiseEngine;

use crate::settings::Settings;

/// Frames rendered per block, matching a typical host callback size.
pub const BLOCK_FRAMES: usize = 512;

/// Statistics of a finished render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    /// Frames written per channel.
    pub frames: usize,
    /// Channel count.
    pub channels: usize,
    /// Loop length in samples.
    pub loop_length: usize,
    /// Seam offset chosen for the loop.
    pub seam_offset: usize,
    /// Largest absolute sample written.
    pub peak: f32,
    /// RMS over all samples written.
    pub rms: f32,
}

/// Run the render command
///
/// # Arguments
/// * `output` - Path of the WAV file to write
/// * `settings` - Resolved configuration and sample rate
/// * `seconds` - Duration to render
///
/// # Returns
/// Exit code: 0 on success
pub fn run(output: &str, settings: &Settings, seconds: f64) -> Result<ExitCode> {
    let start = Instant::now();
    println!("{} {}", "Rendering:".cyan().bold(), output);

    let summary = render_to_wav(Path::new(output), settings, seconds)?;

    println!(
        "  {} {} frames x {} channels at {} Hz",
        "Wrote".green(),
        summary.frames,
        summary.channels,
        settings.sample_rate
    );
    println!(
        "  {} {} samples, seam at {}",
        "Loop:".dimmed(),
        summary.loop_length,
        summary.seam_offset
    );
    println!(
        "  {} peak {:.4}, rms {:.4}",
        "Level:".dimmed(),
        summary.peak,
        summary.rms
    );
    println!(
        "\n{} in {:.2}s",
        "Done".green().bold(),
        start.elapsed().as_secs_f64()
    );

    Ok(ExitCode::SUCCESS)
}

/// Renders `seconds` of noise into a WAV file.
pub fn render_to_wav(path: &Path, settings: &Settings, seconds: f64) -> Result<RenderSummary> {
    if !seconds.is_finite() || seconds <= 0.0 {
        anyhow::bail!("duration must be a positive number of seconds, got {}", seconds);
    }

    let channels = settings.config.channels;
    let total_frames = (seconds * settings.sample_rate as f64).round() as usize;

    let (mut engine, mut renderer) = NoiseEngine::create(settings.config.clone())
        .context("Failed to create noise engine")?;
    let report = engine
        .set_sample_rate_and_length(settings.sample_rate as f64)
        .context("Failed to synthesize noise loop")?;

    let spec = WavSpec {
        channels: u16::try_from(channels).context("Too many channels for WAV output")?,
        sample_rate: settings.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for channel in 0..channels {
        renderer.note_on(channel);
    }

    let mut block = vec![0.0_f32; BLOCK_FRAMES * channels];
    let mut written = 0;
    let mut peak = 0.0_f32;
    let mut sum_sq = 0.0_f64;

    while written < total_frames {
        let frames = BLOCK_FRAMES.min(total_frames - written);
        let data = &mut block[..frames * channels];
        renderer.process_interleaved(data, channels, &[]);

        for &sample in data.iter() {
            writer.write_sample(sample)?;
            peak = peak.max(sample.abs());
            sum_sq += (sample as f64) * (sample as f64);
        }
        written += frames;
        engine.maintain();
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;

    let sample_count = written * channels;
    let rms = if sample_count > 0 {
        (sum_sq / sample_count as f64).sqrt() as f32
    } else {
        0.0
    };

    Ok(RenderSummary {
        frames: written,
        channels,
        loop_length: report.length,
        seam_offset: report.seam.offset,
        peak,
        rms,
    })
}
