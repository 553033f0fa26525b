//! Lock-free tilt parameter shared with the control surface.

use std::sync::atomic::{AtomicU32, Ordering};

/// Tilt in dB/octave stored as `f32` bits.
///
/// Any thread may write it; the control thread reads a snapshot when it
/// resynthesizes. Writes are clamped into `[min, max]`.
#[derive(Debug)]
pub struct TiltParameter {
    bits: AtomicU32,
    min: f32,
    max: f32,
}

impl TiltParameter {
    /// Creates a parameter. `initial` is clamped into the range.
    pub fn new(initial: f32, min: f32, max: f32) -> Self {
        let value = if initial.is_finite() {
            initial.clamp(min, max)
        } else {
            0.0_f32.clamp(min, max)
        };
        Self {
            bits: AtomicU32::new(value.to_bits()),
            min,
            max,
        }
    }

    /// Stores a new tilt.
    ///
    /// # Returns
    /// The stored (clamped) value, or `None` when `tilt` is not finite and
    /// nothing was stored.
    pub fn set(&self, tilt: f32) -> Option<f32> {
        if !tilt.is_finite() {
            return None;
        }
        let value = tilt.clamp(self.min, self.max);
        self.bits.store(value.to_bits(), Ordering::Release);
        Some(value)
    }

    /// Returns the current tilt.
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Returns the accepted range.
    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}
