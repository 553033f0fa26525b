//! Inspect command implementation
//!
//! Synthesizes one loop and reports its level, the seam search outcome and the
//! gain the tilt applies at a few reference frequencies.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use tiltnoise_engine::rng::entropy_seed;
use tiltnoise_engine::seam::measure_seam_derivative;
use tiltnoise_engine::spectrum::tilt_gain;
use tiltnoise_engine::{LoopSeamFinder, NoiseSynthesizer, SeamReport};
use tiltnoise_spec::PIVOT_HZ;

use crate::settings::Settings;

/// Frequencies the tilt gain is reported at, in Hz.
pub const REFERENCE_FREQUENCIES: [f64; 6] = [62.5, 250.0, 1000.0, 4000.0, 8000.0, 16000.0];

/// Measurements of one synthesized loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopInspection {
    /// Seed the loop was derived from.
    pub seed: u32,
    /// Tilt in dB/octave.
    pub tilt: f32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Loop length in samples.
    pub length: usize,
    /// RMS after seam smoothing.
    pub rms: f32,
    /// Peak after seam smoothing.
    pub peak: f32,
    /// Seam search and smoothing outcome.
    pub seam: SeamReport,
    /// Largest step around the seam after smoothing.
    pub seam_derivative: f32,
}

/// Run the inspect command
///
/// # Arguments
/// * `settings` - Resolved configuration and sample rate
/// * `json_output` - Whether to print machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success
pub fn run(settings: &Settings, json_output: bool) -> Result<ExitCode> {
    let inspection = inspect(settings)?;
    if json_output {
        let output = to_json(&inspection);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human(&inspection);
    }
    Ok(ExitCode::SUCCESS)
}

/// Synthesizes and smooths one loop and measures it.
pub fn inspect(settings: &Settings) -> Result<LoopInspection> {
    let config = &settings.config;
    let seed = config.seed.unwrap_or_else(entropy_seed);
    let sample_rate = settings.sample_rate as f64;

    let mut synthesizer = NoiseSynthesizer::new(seed, config.target_rms)
        .context("Failed to create synthesizer")?;
    let mut finder = LoopSeamFinder::new(config.seam_window)?;

    let mut buffer = synthesizer
        .synthesize(settings.loop_length(), sample_rate, config.initial_tilt)
        .context("Failed to synthesize noise loop")?;
    let seam = finder.process(buffer.samples_mut())?;

    Ok(LoopInspection {
        seed,
        tilt: config.initial_tilt,
        sample_rate: settings.sample_rate,
        length: buffer.len(),
        rms: buffer.rms(),
        peak: buffer.peak(),
        seam,
        seam_derivative: measure_seam_derivative(buffer.samples()),
    })
}

fn reference_gains_db(tilt: f32, sample_rate: u32) -> Vec<(f64, f64)> {
    let nyquist = sample_rate as f64 / 2.0;
    REFERENCE_FREQUENCIES
        .iter()
        .filter(|&&f| f <= nyquist)
        .map(|&f| (f, 20.0 * tilt_gain(f, tilt as f64, PIVOT_HZ).log10()))
        .collect()
}

fn to_json(inspection: &LoopInspection) -> serde_json::Value {
    let gains: Vec<serde_json::Value> = reference_gains_db(inspection.tilt, inspection.sample_rate)
        .into_iter()
        .map(|(frequency, gain_db)| json!({ "frequency_hz": frequency, "gain_db": gain_db }))
        .collect();

    json!({
        "seed": inspection.seed,
        "tilt_db_per_octave": inspection.tilt,
        "sample_rate": inspection.sample_rate,
        "length": inspection.length,
        "rms": inspection.rms,
        "peak": inspection.peak,
        "seam": {
            "offset": inspection.seam.offset,
            "score": inspection.seam.score,
            "discontinuity_before": inspection.seam.discontinuity_before,
            "discontinuity_after": inspection.seam.discontinuity_after,
            "derivative_after": inspection.seam_derivative,
        },
        "tilt_gains": gains,
    })
}

fn print_human(inspection: &LoopInspection) {
    println!("{}", "Noise loop".cyan().bold());
    println!("  {:<14} {}", "Seed:".dimmed(), inspection.seed);
    println!("  {:<14} {:+.2} dB/octave", "Tilt:".dimmed(), inspection.tilt);
    println!(
        "  {:<14} {} samples at {} Hz",
        "Length:".dimmed(),
        inspection.length,
        inspection.sample_rate
    );
    println!("  {:<14} {:.4}", "RMS:".dimmed(), inspection.rms);
    println!("  {:<14} {:.4}", "Peak:".dimmed(), inspection.peak);

    println!("\n{}", "Seam".cyan().bold());
    println!("  {:<14} {}", "Offset:".dimmed(), inspection.seam.offset);
    println!("  {:<14} {:.4}", "Score:".dimmed(), inspection.seam.score);
    let after = format!("{:.5}", inspection.seam.discontinuity_after);
    let after = if inspection.seam.discontinuity_after <= inspection.seam.discontinuity_before {
        after.green()
    } else {
        after.yellow()
    };
    println!(
        "  {:<14} {:.5} -> {}",
        "Step:".dimmed(),
        inspection.seam.discontinuity_before,
        after
    );
    println!("  {:<14} {:.5}", "Max slope:".dimmed(), inspection.seam_derivative);

    println!("\n{}", "Tilt gain".cyan().bold());
    for (frequency, gain_db) in reference_gains_db(inspection.tilt, inspection.sample_rate) {
        println!("  {:>8.1} Hz  {:+7.2} dB", frequency, gain_db);
    }
}
