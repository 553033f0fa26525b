//! The looping noise buffer handed to the audio thread.

/// One period of colored noise plus the parameters it was built with.
///
/// The sample count is always even. A buffer is filled on the control thread
/// and then moved, never copied, to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseBuffer {
    samples: Vec<f32>,
    sample_rate: f64,
    tilt: f32,
    generation: u64,
}

impl NoiseBuffer {
    /// Creates a buffer from synthesized samples.
    pub fn new(samples: Vec<f32>, sample_rate: f64, tilt: f32, generation: u64) -> Self {
        Self {
            samples,
            sample_rate,
            tilt,
            generation,
        }
    }

    /// Creates an empty buffer. Players holding it render silence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps raw samples with no synthesis metadata.
    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns the samples for in-place processing such as seam smoothing.
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Sample rate the buffer was synthesized for, or 0 if unknown.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Tilt the buffer was synthesized with, in dB/octave.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Resynthesis counter value this buffer came from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the buffer duration in seconds, or 0 if the sample rate is unknown.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    /// Computes the root-mean-square level.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum_sq / self.samples.len() as f64).sqrt() as f32
    }

    /// Returns the largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()))
    }

    /// Consumes the buffer and returns its samples.
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}
