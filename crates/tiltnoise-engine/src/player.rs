//! Circular playback of a loop buffer.

use crate::buffer::NoiseBuffer;

/// Plays a buffer as an endless loop.
///
/// Lives on the audio thread. None of its methods allocate or free memory;
/// replaced buffers are handed back to the caller.
#[derive(Debug, Default)]
pub struct CircularPlayer {
    buffer: NoiseBuffer,
    cursor: usize,
}

impl CircularPlayer {
    /// Creates a player with an empty buffer. It renders silence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a player for a buffer, starting at its first sample.
    pub fn with_buffer(buffer: NoiseBuffer) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Returns the current read position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the length of the current buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true when the player has nothing to play.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the buffer being played.
    pub fn buffer(&self) -> &NoiseBuffer {
        &self.buffer
    }

    /// Returns the sample under the cursor and advances it, wrapping at the end.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let samples = self.buffer.samples();
        if samples.is_empty() {
            return 0.0;
        }
        let sample = samples[self.cursor];
        self.cursor += 1;
        if self.cursor == samples.len() {
            self.cursor = 0;
        }
        sample
    }

    /// Fills `out` with consecutive samples, wrapping as needed.
    pub fn advance_block(&mut self, out: &mut [f32]) {
        let samples = self.buffer.samples();
        if samples.is_empty() {
            out.fill(0.0);
            return;
        }

        let mut written = 0;
        while written < out.len() {
            let run = (samples.len() - self.cursor).min(out.len() - written);
            out[written..written + run]
                .copy_from_slice(&samples[self.cursor..self.cursor + run]);
            written += run;
            self.cursor += run;
            if self.cursor == samples.len() {
                self.cursor = 0;
            }
        }
    }

    /// Moves the cursor forward without producing output.
    pub fn skip(&mut self, count: usize) {
        let len = self.buffer.len();
        if len > 0 {
            self.cursor = (self.cursor + count % len) % len;
        }
    }

    /// Installs a new buffer, resets the cursor and returns the old buffer.
    pub fn set_buffer(&mut self, buffer: NoiseBuffer) -> NoiseBuffer {
        self.cursor = 0;
        std::mem::replace(&mut self.buffer, buffer)
    }

    /// Exchanges the current buffer with `buffer` and resets the cursor.
    ///
    /// Afterwards `buffer` holds the previous contents, so it can be sent back
    /// for release without moving the surrounding container.
    pub fn swap_buffer(&mut self, buffer: &mut NoiseBuffer) {
        self.cursor = 0;
        std::mem::swap(&mut self.buffer, buffer);
    }
}
