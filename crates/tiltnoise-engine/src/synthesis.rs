//! Colored noise synthesis in the frequency domain.
//!
//! A half spectrum of uniformly random bins is shaped by the tilt curve,
//! transformed back to the time domain with an inverse real FFT, normalized to
//! a fixed RMS level and clamped. Because the result is the inverse transform
//! of a discrete spectrum it is exactly periodic in its own length.

use std::sync::Arc;

use rand::Rng;
use realfft::{ComplexToReal, RealFftPlanner};
use rustfft::num_complex::Complex;
use tiltnoise_spec::{
    audible_bin_count, round_up_even, ErrorCode, ValidationError, MAX_LOOP_SAMPLES,
    MIN_AUDIBLE_HZ, PIVOT_HZ,
};

use crate::buffer::NoiseBuffer;
use crate::error::{NoiseError, NoiseResult};
use crate::rng::create_generation_rng;
use crate::spectrum;

/// Builds noise buffers, reusing the transform plan and scratch space between
/// calls of the same length.
///
/// Only the plan itself is kept, not the planner, so the synthesizer can move
/// to a control thread.
pub struct NoiseSynthesizer {
    plan: Option<Arc<dyn ComplexToReal<f64>>>,
    spectrum: Vec<Complex<f64>>,
    output: Vec<f64>,
    scratch: Vec<Complex<f64>>,
    base_seed: u32,
    generation: u64,
    target_rms: f64,
}

impl std::fmt::Debug for NoiseSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSynthesizer")
            .field("planned_length", &self.planned_length())
            .field("base_seed", &self.base_seed)
            .field("generation", &self.generation)
            .field("target_rms", &self.target_rms)
            .finish()
    }
}

impl NoiseSynthesizer {
    /// Creates a synthesizer.
    ///
    /// # Arguments
    /// * `base_seed` - Seed every per-call generator is derived from
    /// * `target_rms` - RMS level of every synthesized buffer, in (0, 1]
    pub fn new(base_seed: u32, target_rms: f32) -> NoiseResult<Self> {
        if !target_rms.is_finite() || target_rms <= 0.0 || target_rms > 1.0 {
            return Err(NoiseError::invalid_param(
                "target_rms",
                format!("must lie in (0, 1], got {}", target_rms),
            ));
        }

        Ok(Self {
            plan: None,
            spectrum: Vec::new(),
            output: Vec::new(),
            scratch: Vec::new(),
            base_seed,
            generation: 0,
            target_rms: target_rms as f64,
        })
    }

    /// Returns the base seed.
    pub fn base_seed(&self) -> u32 {
        self.base_seed
    }

    /// Returns how many buffers have been synthesized.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the normalization target.
    pub fn target_rms(&self) -> f32 {
        self.target_rms as f32
    }

    /// Returns the length the cached plan was built for, if any.
    pub fn planned_length(&self) -> Option<usize> {
        self.plan.as_ref().map(|plan| plan.len())
    }

    /// Synthesizes one period of tilted noise.
    ///
    /// # Arguments
    /// * `length` - Requested length in samples, rounded up to an even count
    /// * `sample_rate` - Sample rate in Hz
    /// * `tilt` - Spectral slope in dB/octave around 1 kHz
    ///
    /// # Returns
    /// A buffer normalized to the target RMS with every sample in [-1, 1].
    /// The wrap point is not smoothed.
    pub fn synthesize(
        &mut self,
        length: usize,
        sample_rate: f64,
        tilt: f32,
    ) -> NoiseResult<NoiseBuffer> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(NoiseError::InvalidSampleRate { rate: sample_rate });
        }
        if !tilt.is_finite() {
            return Err(NoiseError::InvalidTilt { tilt });
        }
        let length = match round_up_even(length) {
            Some(length) if length <= MAX_LOOP_SAMPLES => length,
            _ => {
                return Err(NoiseError::invalid_param(
                    "length",
                    format!("must not exceed {} samples, got {}", MAX_LOOP_SAMPLES, length),
                ))
            }
        };
        if length < 2 {
            return Err(NoiseError::invalid_param(
                "length",
                "must be at least 2 samples",
            ));
        }
        if audible_bin_count(length, sample_rate, MIN_AUDIBLE_HZ) == 0 {
            return Err(NoiseError::InvalidConfig(vec![ValidationError::new(
                ErrorCode::NoAudibleBins,
                format!(
                    "a {}-sample loop at {} Hz has no bin at or above {} Hz",
                    length, sample_rate, MIN_AUDIBLE_HZ
                ),
            )]));
        }

        let plan = self.prepare(length);
        let generation = self.generation;
        self.generation += 1;

        let mut rng = create_generation_rng(self.base_seed, generation);
        for bin in self.spectrum.iter_mut() {
            let re: f64 = rng.gen_range(-1.0..=1.0);
            let im: f64 = rng.gen_range(-1.0..=1.0);
            *bin = Complex::new(re, im);
        }

        spectrum::shape(
            &mut self.spectrum,
            tilt as f64,
            PIVOT_HZ,
            sample_rate,
            MIN_AUDIBLE_HZ,
        );

        // A real signal needs purely real DC and Nyquist bins
        if let Some(first) = self.spectrum.first_mut() {
            first.im = 0.0;
        }
        if let Some(last) = self.spectrum.last_mut() {
            last.im = 0.0;
        }

        plan.process_with_scratch(&mut self.spectrum, &mut self.output, &mut self.scratch)
            .map_err(|e| NoiseError::synthesis(format!("inverse FFT failed: {}", e)))?;

        let samples = normalize_to_rms(&self.output, self.target_rms);
        Ok(NoiseBuffer::new(samples, sample_rate, tilt, generation))
    }

    /// Makes sure the plan and scratch vectors match `length`.
    fn prepare(&mut self, length: usize) -> Arc<dyn ComplexToReal<f64>> {
        if let Some(plan) = &self.plan {
            if plan.len() == length {
                return Arc::clone(plan);
            }
        }

        let plan = RealFftPlanner::<f64>::new().plan_fft_inverse(length);
        self.spectrum = plan.make_input_vec();
        self.output = plan.make_output_vec();
        self.scratch = plan.make_scratch_vec();
        self.plan = Some(Arc::clone(&plan));
        plan
    }
}

/// Scales a signal to a target RMS and clamps it to [-1, 1].
///
/// A silent input stays silent.
pub fn normalize_to_rms(signal: &[f64], target_rms: f64) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }

    let sum_sq: f64 = signal.iter().map(|s| s * s).sum();
    let rms = (sum_sq / signal.len() as f64).sqrt();
    let gain = if rms > 0.0 { target_rms / rms } else { 0.0 };

    signal
        .iter()
        .map(|&s| (s * gain).clamp(-1.0, 1.0) as f32)
        .collect()
}
