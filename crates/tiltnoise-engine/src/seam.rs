//! Loop seam detection and crossfade processing.
//!
//! The wrap window straddles the loop boundary: its first half is the tail of
//! the buffer and its second half is the head. The finder slides a window of
//! the same width over the contiguous interior of the buffer, picks the offset
//! whose content correlates best with the wrap window under a raised-cosine
//! weight, and then crossfades that content into the wrap window. Near the
//! boundary itself the buffer then plays contiguous material, while the
//! window edges keep their original samples.

use std::f64::consts::PI;

use crate::error::{NoiseError, NoiseResult};

/// Best matching offset for a buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeamMatch {
    /// Start of the matching contiguous segment.
    pub offset: usize,
    /// Weighted correlation of that segment with the wrap window.
    pub score: f64,
}

/// Outcome of finding and smoothing a seam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeamReport {
    /// Start of the segment crossfaded into the wrap window.
    pub offset: usize,
    /// Weighted correlation score of the chosen segment.
    pub score: f64,
    /// Step across the wrap before smoothing.
    pub discontinuity_before: f32,
    /// Step across the wrap after smoothing.
    pub discontinuity_after: f32,
}

/// Raised-cosine weight on `[0, 1]`: 0 at the edges, 1 in the center.
#[inline]
pub fn raised_cosine(x: f64) -> f64 {
    ((PI * (2.0 * x - 1.0)).cos() + 1.0) / 2.0
}

/// Maps position `j` of the wrap window to a buffer index.
///
/// Position 0 is `len - window / 2`; position `window / 2` is index 0.
#[inline]
pub fn wrap_index(len: usize, window: usize, j: usize) -> usize {
    (len - window / 2 + j) % len
}

/// Finds seams and smooths loop boundaries for a fixed window width.
///
/// Weights and scratch space are allocated once, so repeated calls on buffers
/// of the same length do not allocate.
#[derive(Debug, Clone)]
pub struct LoopSeamFinder {
    window: usize,
    weights: Vec<f64>,
    reference: Vec<f64>,
    segment: Vec<f32>,
}

impl LoopSeamFinder {
    /// Creates a finder.
    ///
    /// # Arguments
    /// * `window` - Window width in samples; even and at least 2
    pub fn new(window: usize) -> NoiseResult<Self> {
        if window < 2 || window % 2 != 0 {
            return Err(NoiseError::invalid_param(
                "seam_window",
                format!("must be an even number of at least 2 samples, got {}", window),
            ));
        }

        let weights = (0..window)
            .map(|j| raised_cosine((j as f64 + 0.5) / window as f64))
            .collect();

        Ok(Self {
            window,
            weights,
            reference: vec![0.0; window],
            segment: vec![0.0; window],
        })
    }

    /// Returns the window width.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Returns the per-position crossfade weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn check_fits(&self, len: usize) -> NoiseResult<()> {
        if len <= self.window {
            return Err(NoiseError::WindowTooWide {
                window: self.window,
                length: len,
            });
        }
        Ok(())
    }

    /// Finds the contiguous segment that best matches the wrap window.
    ///
    /// Every offset in `0..=len - window` is scored; ties go to the smallest
    /// offset, so the result depends only on the buffer contents.
    pub fn find_seam(&mut self, buffer: &[f32]) -> NoiseResult<SeamMatch> {
        let len = buffer.len();
        self.check_fits(len)?;
        let w = self.window;

        for (j, reference) in self.reference.iter_mut().enumerate() {
            *reference = buffer[wrap_index(len, w, j)] as f64 * self.weights[j];
        }

        let mut best = SeamMatch {
            offset: 0,
            score: f64::NEG_INFINITY,
        };
        for offset in 0..=len - w {
            let score: f64 = buffer[offset..offset + w]
                .iter()
                .zip(&self.reference)
                .map(|(&s, &r)| s as f64 * r)
                .sum();
            if score > best.score {
                best = SeamMatch { offset, score };
            }
        }

        if !best.score.is_finite() {
            return Err(NoiseError::synthesis("seam score is not finite"));
        }
        Ok(best)
    }

    /// Crossfades the segment at `offset` into the wrap window.
    ///
    /// Each wrap position `j` becomes `(1 - w) * original + w * segment[j]`.
    pub fn smooth(&mut self, buffer: &mut [f32], offset: usize) -> NoiseResult<()> {
        let len = buffer.len();
        self.check_fits(len)?;
        let w = self.window;
        if offset > len - w {
            return Err(NoiseError::invalid_param(
                "offset",
                format!("segment at {} runs past the end of a {}-sample buffer", offset, len),
            ));
        }

        // The segment can overlap the wrap window, so read it before writing
        self.segment.copy_from_slice(&buffer[offset..offset + w]);

        for j in 0..w {
            let idx = wrap_index(len, w, j);
            let weight = self.weights[j];
            let mixed = (1.0 - weight) * buffer[idx] as f64 + weight * self.segment[j] as f64;
            buffer[idx] = mixed as f32;
        }
        Ok(())
    }

    /// Finds the seam, smooths it and reports the result.
    pub fn process(&mut self, buffer: &mut [f32]) -> NoiseResult<SeamReport> {
        let discontinuity_before = measure_seam_discontinuity(buffer);
        let found = self.find_seam(buffer)?;
        self.smooth(buffer, found.offset)?;

        Ok(SeamReport {
            offset: found.offset,
            score: found.score,
            discontinuity_before,
            discontinuity_after: measure_seam_discontinuity(buffer),
        })
    }
}

/// Finds the best seam offset with a one-off finder.
///
/// # Arguments
/// * `buffer` - Loop buffer, longer than the window
/// * `window` - Window width in samples
pub fn find_seam(buffer: &[f32], window: usize) -> NoiseResult<usize> {
    LoopSeamFinder::new(window)?
        .find_seam(buffer)
        .map(|found| found.offset)
}

/// Crossfades the segment at `offset` into the wrap window with a one-off finder.
pub fn smooth(buffer: &mut [f32], offset: usize, window: usize) -> NoiseResult<()> {
    LoopSeamFinder::new(window)?.smooth(buffer, offset)
}

/// Measures the step between the last and the first sample.
///
/// # Returns
/// Absolute discontinuity (0.0 = perfect continuity).
pub fn measure_seam_discontinuity(buffer: &[f32]) -> f32 {
    match (buffer.first(), buffer.last()) {
        (Some(&first), Some(&last)) if buffer.len() >= 2 => (last - first).abs(),
        _ => 0.0,
    }
}

/// Measures the largest sample-to-sample step around the seam.
///
/// Looks at the last step before the wrap, the wrap itself and the first step
/// after it. A large slope can click even when the values match.
pub fn measure_seam_derivative(buffer: &[f32]) -> f32 {
    let len = buffer.len();
    if len < 3 {
        return measure_seam_discontinuity(buffer);
    }

    let before = (buffer[len - 1] - buffer[len - 2]).abs();
    let across = (buffer[0] - buffer[len - 1]).abs();
    let after = (buffer[1] - buffer[0]).abs();
    before.max(across).max(after)
}
