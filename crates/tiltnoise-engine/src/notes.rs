//! Note gating.
//!
//! A channel is audible while at least one note is held on it. Note events
//! carry the frame inside the current block they apply at.

/// Held-note counter for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteActivity {
    held: u32,
}

impl NoteActivity {
    /// Creates a counter with no notes held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a note-on.
    pub fn note_on(&mut self) {
        self.held = self.held.saturating_add(1);
    }

    /// Registers a note-off.
    ///
    /// Returns false when no note was held. The count stays at zero.
    pub fn note_off(&mut self) -> bool {
        if self.held == 0 {
            return false;
        }
        self.held -= 1;
        true
    }

    /// Returns true while at least one note is held.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.held > 0
    }

    /// Returns 1.0 when active, 0.0 otherwise.
    #[inline]
    pub fn gain(&self) -> f32 {
        if self.is_active() {
            1.0
        } else {
            0.0
        }
    }

    /// Returns the number of held notes.
    pub fn held(&self) -> u32 {
        self.held
    }

    /// Releases every note.
    pub fn reset(&mut self) {
        self.held = 0;
    }
}

/// Kind of note event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEventKind {
    /// A key was pressed.
    On,
    /// A key was released.
    Off,
}

/// A note event positioned inside a processing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    /// Frame offset from the start of the block.
    pub frame: usize,
    /// Output channel the note belongs to.
    pub channel: usize,
    /// Whether the note starts or ends.
    pub kind: NoteEventKind,
}

impl NoteEvent {
    /// Creates a note-on event.
    pub fn on(frame: usize, channel: usize) -> Self {
        Self {
            frame,
            channel,
            kind: NoteEventKind::On,
        }
    }

    /// Creates a note-off event.
    pub fn off(frame: usize, channel: usize) -> Self {
        Self {
            frame,
            channel,
            kind: NoteEventKind::Off,
        }
    }
}
