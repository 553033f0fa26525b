//! Spectral tilt shaping.
//!
//! Applies a dB-per-octave slope to a real-signal half spectrum. The slope is
//! anchored at a pivot frequency, where the gain is always unity, and every
//! bin below the audible floor is removed so that sub-audible rumble cannot
//! dominate the level after a negative tilt.

use rustfft::num_complex::Complex;

/// Returns the linear gain a tilt applies at a frequency.
///
/// # Arguments
/// * `frequency` - Frequency in Hz (must be positive)
/// * `tilt_db_per_octave` - Slope in dB per octave
/// * `pivot_hz` - Frequency with unity gain
pub fn tilt_gain(frequency: f64, tilt_db_per_octave: f64, pivot_hz: f64) -> f64 {
    let octaves_from_pivot = (frequency / pivot_hz).log2();
    let scaling_db = tilt_db_per_octave * octaves_from_pivot;
    10.0_f64.powf(scaling_db / 20.0)
}

/// Returns the frequency of a half-spectrum bin in Hz.
#[inline]
pub fn bin_frequency(bin: usize, sample_rate: f64, buffer_length: usize) -> f64 {
    bin as f64 * sample_rate / buffer_length as f64
}

/// Shapes a half spectrum in place.
///
/// The spectrum holds `buffer_length / 2 + 1` bins of a real signal with an
/// even `buffer_length`. Bins below `min_audible_hz` are zeroed; every other
/// bin is scaled by [`tilt_gain`]. Only magnitudes change, phases are kept.
///
/// # Arguments
/// * `spectrum` - Half spectrum (modified in place)
/// * `tilt_db_per_octave` - Slope in dB per octave
/// * `pivot_hz` - Frequency with unity gain
/// * `sample_rate` - Sample rate in Hz
/// * `min_audible_hz` - Bins below this frequency are removed
pub fn shape(
    spectrum: &mut [Complex<f64>],
    tilt_db_per_octave: f64,
    pivot_hz: f64,
    sample_rate: f64,
    min_audible_hz: f64,
) {
    if spectrum.is_empty() {
        return;
    }
    let buffer_length = (spectrum.len() - 1) * 2;
    if buffer_length == 0 {
        spectrum[0] = Complex::new(0.0, 0.0);
        return;
    }

    for (bin, coefficient) in spectrum.iter_mut().enumerate() {
        let frequency = bin_frequency(bin, sample_rate, buffer_length);
        if frequency < min_audible_hz {
            *coefficient = Complex::new(0.0, 0.0);
        } else {
            *coefficient *= tilt_gain(frequency, tilt_db_per_octave, pivot_hz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltnoise_spec::{MIN_AUDIBLE_HZ, PIVOT_HZ};

    fn ramp_spectrum(bins: usize) -> Vec<Complex<f64>> {
        (0..bins)
            .map(|i| Complex::new(1.0 + i as f64 * 0.01, -0.5 + i as f64 * 0.003))
            .collect()
    }

    #[test]
    fn test_unity_gain_at_pivot() {
        for tilt in [-12.0, -3.0, 0.0, 4.5, 12.0] {
            assert!((tilt_gain(PIVOT_HZ, tilt, PIVOT_HZ) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_gain_per_octave() {
        // One octave above the pivot at +6 dB/octave
        let gain = tilt_gain(2000.0, 6.0, PIVOT_HZ);
        assert!((gain - 10.0_f64.powf(0.3)).abs() < 1e-12);

        // Two octaves below the pivot at -3 dB/octave is +6 dB
        let gain = tilt_gain(250.0, -3.0, PIVOT_HZ);
        assert!((gain - 10.0_f64.powf(0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_tilt_keeps_audible_magnitudes() {
        let original = ramp_spectrum(241);
        let mut spectrum = original.clone();
        shape(&mut spectrum, 0.0, PIVOT_HZ, 48_000.0, MIN_AUDIBLE_HZ);

        // 480-sample buffer: bin 0 is DC, every other bin is >= 100 Hz
        assert_eq!(spectrum[0], Complex::new(0.0, 0.0));
        for bin in 1..original.len() {
            assert!((spectrum[bin].norm() - original[bin].norm()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_positive_tilt_scenario() {
        // 480 samples at 48 kHz: 100 Hz per bin, bin 20 is 2000 Hz
        let original = ramp_spectrum(241);
        let mut spectrum = original.clone();
        shape(&mut spectrum, 6.0, PIVOT_HZ, 48_000.0, MIN_AUDIBLE_HZ);

        let ratio = spectrum[20].norm() / original[20].norm();
        assert!((ratio - 1.995).abs() < 1e-3, "ratio was {}", ratio);

        // Bin 10 is the pivot itself
        let ratio = spectrum[10].norm() / original[10].norm();
        assert!((ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sub_audible_bins_are_zeroed() {
        // 4800 samples at 48 kHz: 10 Hz per bin, bin 1 is 10 Hz
        let mut spectrum = ramp_spectrum(2401);
        shape(&mut spectrum, 6.0, PIVOT_HZ, 48_000.0, MIN_AUDIBLE_HZ);

        assert_eq!(spectrum[0], Complex::new(0.0, 0.0));
        assert_eq!(spectrum[1], Complex::new(0.0, 0.0));
        // 20 Hz is the first bin kept
        assert!(spectrum[2].norm() > 0.0);
    }

    #[test]
    fn test_phase_is_preserved() {
        let original = ramp_spectrum(241);
        let mut spectrum = original.clone();
        shape(&mut spectrum, -9.0, PIVOT_HZ, 48_000.0, MIN_AUDIBLE_HZ);

        for bin in 1..original.len() {
            assert!((spectrum[bin].arg() - original[bin].arg()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_degenerate_spectra() {
        let mut empty: Vec<Complex<f64>> = Vec::new();
        shape(&mut empty, 6.0, PIVOT_HZ, 48_000.0, MIN_AUDIBLE_HZ);
        assert!(empty.is_empty());

        let mut single = vec![Complex::new(1.0, 1.0)];
        shape(&mut single, 6.0, PIVOT_HZ, 48_000.0, MIN_AUDIBLE_HZ);
        assert_eq!(single[0], Complex::new(0.0, 0.0));
    }
}
