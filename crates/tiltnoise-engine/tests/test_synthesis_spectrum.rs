//! Spectral shape integration tests.
//!
//! Buffers are analyzed with a forward real FFT and the average power of
//! bands on either side of the 1 kHz pivot is compared.

use realfft::RealFftPlanner;
use tiltnoise_engine::synthesis::NoiseSynthesizer;
use tiltnoise_engine::NoiseBuffer;

const SAMPLE_RATE: f64 = 48_000.0;
// One-second loop: 1 Hz per bin
const LENGTH: usize = 48_000;

fn power_spectrum(buffer: &NoiseBuffer) -> Vec<f64> {
    let mut planner = RealFftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    let mut input: Vec<f64> = buffer.samples().iter().map(|&s| s as f64).collect();
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut input, &mut spectrum).unwrap();
    spectrum.iter().map(|c| c.norm_sqr()).collect()
}

fn band_power(power: &[f64], low_hz: usize, high_hz: usize) -> f64 {
    let band = &power[low_hz..high_hz];
    band.iter().sum::<f64>() / band.len() as f64
}

fn band_ratio_db(tilt: f32) -> f64 {
    let mut synth = NoiseSynthesizer::new(1234, 0.2).unwrap();
    let buffer = synth.synthesize(LENGTH, SAMPLE_RATE, tilt).unwrap();
    let power = power_spectrum(&buffer);

    // Two octaves above the pivot against the pivot band
    let high = band_power(&power, 3600, 4400);
    let pivot = band_power(&power, 900, 1100);
    10.0 * (high / pivot).log10()
}

// ============================================================================
// Tilt Slope Tests
// ============================================================================

#[test]
fn test_flat_tilt_has_flat_spectrum() {
    let ratio = band_ratio_db(0.0);
    assert!(ratio.abs() < 1.0, "ratio was {} dB", ratio);
}

#[test]
fn test_positive_tilt_rises_two_octaves() {
    // +6 dB/octave over two octaves
    let ratio = band_ratio_db(6.0);
    assert!((ratio - 12.0).abs() < 1.0, "ratio was {} dB", ratio);
}

#[test]
fn test_negative_tilt_falls_two_octaves() {
    let ratio = band_ratio_db(-3.0);
    assert!((ratio + 6.0).abs() < 1.0, "ratio was {} dB", ratio);
}

// ============================================================================
// Floor and Level Tests
// ============================================================================

#[test]
fn test_sub_audible_bins_are_empty() {
    let mut synth = NoiseSynthesizer::new(77, 0.2).unwrap();
    let buffer = synth.synthesize(LENGTH, SAMPLE_RATE, -12.0).unwrap();
    let power = power_spectrum(&buffer);

    let audible = band_power(&power, 20, 200);
    for (bin, &p) in power.iter().enumerate().take(20) {
        assert!(p < audible * 1e-9, "bin {} has power {}", bin, p);
    }
}

#[test]
fn test_level_is_tilt_and_length_invariant() {
    let mut synth = NoiseSynthesizer::new(5, 0.2).unwrap();
    for length in [4_800, 22_050, 48_000] {
        for tilt in [-12.0, 0.0, 12.0] {
            let buffer = synth.synthesize(length, SAMPLE_RATE, tilt).unwrap();
            assert!(
                (buffer.rms() - 0.2).abs() < 2e-3,
                "length {} tilt {}: rms {}",
                length,
                tilt,
                buffer.rms()
            );
            assert!(buffer.peak() <= 1.0);
            assert_eq!(buffer.len() % 2, 0);
        }
    }
}

#[test]
fn test_buffer_records_parameters() {
    let mut synth = NoiseSynthesizer::new(5, 0.2).unwrap();
    let buffer = synth.synthesize(4_801, 44_100.0, -7.5).unwrap();
    assert_eq!(buffer.len(), 4_802);
    assert_eq!(buffer.sample_rate(), 44_100.0);
    assert_eq!(buffer.tilt(), -7.5);
}
