//! Audio-thread side of the engine.
//!
//! The renderer owns one [`CircularPlayer`] and one [`NoteActivity`] per
//! channel. It never allocates, frees, locks or blocks: new buffer sets arrive
//! through the publish queue and the sets they replace leave through the
//! garbage queue.

use std::sync::Arc;

use crate::commands::{GarbageProducer, PublishConsumer, RendererStats};
use crate::notes::{NoteActivity, NoteEvent, NoteEventKind};
use crate::player::CircularPlayer;

/// Real-time renderer. Move it into the audio callback.
pub struct NoiseRenderer {
    players: Vec<CircularPlayer>,
    notes: Vec<NoteActivity>,
    publish_rx: PublishConsumer,
    garbage_tx: GarbageProducer,
    stats: Arc<RendererStats>,
}

impl std::fmt::Debug for NoiseRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseRenderer")
            .field("channels", &self.players.len())
            .field("notes", &self.notes)
            .finish()
    }
}

impl NoiseRenderer {
    pub(crate) fn new(
        channels: usize,
        publish_rx: PublishConsumer,
        garbage_tx: GarbageProducer,
        stats: Arc<RendererStats>,
    ) -> Self {
        Self {
            players: (0..channels).map(|_| CircularPlayer::new()).collect(),
            notes: vec![NoteActivity::new(); channels],
            publish_rx,
            garbage_tx,
            stats,
        }
    }

    /// Returns the number of output channels.
    pub fn channels(&self) -> usize {
        self.players.len()
    }

    /// Returns the counters shared with the control thread.
    pub fn stats(&self) -> &Arc<RendererStats> {
        &self.stats
    }

    /// Returns the player of a channel.
    pub fn player(&self, channel: usize) -> Option<&CircularPlayer> {
        self.players.get(channel)
    }

    /// Installs any buffer sets published since the last call.
    ///
    /// A set is only taken when the garbage queue can accept the set it
    /// replaces; otherwise it waits for the next block.
    ///
    /// # Returns
    /// True if at least one set was installed.
    pub fn poll_published(&mut self) -> bool {
        let mut installed = false;
        while self.garbage_tx.slots() > 0 {
            let mut set = match self.publish_rx.pop() {
                Ok(set) => set,
                Err(_) => break,
            };

            for (player, buffer) in self.players.iter_mut().zip(set.buffers.iter_mut()) {
                player.swap_buffer(buffer);
            }
            self.stats.record_install(set.generation);
            installed = true;

            // A slot was checked above and only this thread pushes
            let _ = self.garbage_tx.push(set);
        }
        installed
    }

    /// Registers a note-on. Unknown channels are ignored.
    pub fn note_on(&mut self, channel: usize) {
        if let Some(notes) = self.notes.get_mut(channel) {
            notes.note_on();
        }
    }

    /// Registers a note-off. Unknown channels are ignored.
    ///
    /// A note-off with nothing held leaves the channel silent and is counted
    /// in [`RendererStats::note_underflows`].
    pub fn note_off(&mut self, channel: usize) {
        if let Some(notes) = self.notes.get_mut(channel) {
            if !notes.note_off() {
                self.stats.record_note_underflow();
            }
        }
    }

    /// Applies a note event immediately, ignoring its frame.
    pub fn apply_event(&mut self, event: &NoteEvent) {
        match event.kind {
            NoteEventKind::On => self.note_on(event.channel),
            NoteEventKind::Off => self.note_off(event.channel),
        }
    }

    /// Releases every held note on every channel.
    pub fn all_notes_off(&mut self) {
        for notes in &mut self.notes {
            notes.reset();
        }
    }

    /// Returns true while a note is held on the channel.
    pub fn is_active(&self, channel: usize) -> bool {
        self.notes.get(channel).is_some_and(NoteActivity::is_active)
    }

    /// Returns the number of notes held on the channel.
    pub fn held_notes(&self, channel: usize) -> u32 {
        self.notes.get(channel).map_or(0, NoteActivity::held)
    }

    /// Renders one channel into `out`.
    ///
    /// The loop keeps running while the channel is gated off, so releasing and
    /// pressing a note resumes mid-loop. Unknown channels render silence.
    pub fn render_into(&mut self, channel: usize, out: &mut [f32]) {
        self.poll_published();
        self.render_segment(channel, out);
    }

    /// Renders `frame_count` samples of one channel into a new vector.
    ///
    /// Allocates; use [`render_into`](Self::render_into) inside a callback.
    pub fn render(&mut self, channel: usize, frame_count: usize) -> Vec<f32> {
        let mut out = vec![0.0; frame_count];
        self.render_into(channel, &mut out);
        out
    }

    /// Renders a block of every channel, applying note events at their frames.
    ///
    /// `outputs[c]` receives channel `c`; all outputs are rendered up to the
    /// shortest length and any longer tail is zeroed. Events should be sorted
    /// by frame; an event earlier than the previous one takes effect at the
    /// previous one's position. Events past the block end apply at its end.
    pub fn process(&mut self, outputs: &mut [&mut [f32]], events: &[NoteEvent]) {
        self.poll_published();
        let frames = outputs.iter().map(|out| out.len()).min().unwrap_or(0);

        let mut start = 0;
        for event in events {
            let at = event.frame.min(frames).max(start);
            if at > start {
                self.render_all(outputs, start, at);
                start = at;
            }
            self.apply_event(event);
        }
        self.render_all(outputs, start, frames);

        for out in outputs.iter_mut() {
            out[frames..].fill(0.0);
        }
    }

    /// Renders interleaved frames, applying note events at their frames.
    ///
    /// `data` holds `channels` samples per frame. Channels the renderer does
    /// not have are filled with silence.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize, events: &[NoteEvent]) {
        self.poll_published();
        if channels == 0 {
            data.fill(0.0);
            return;
        }

        let mut next_event = 0;
        for (frame, chunk) in data.chunks_mut(channels).enumerate() {
            while let Some(event) = events.get(next_event) {
                if event.frame > frame {
                    break;
                }
                self.apply_event(event);
                next_event += 1;
            }

            for (channel, sample) in chunk.iter_mut().enumerate() {
                *sample = match (self.players.get_mut(channel), self.notes.get(channel)) {
                    (Some(player), Some(notes)) => player.next_sample() * notes.gain(),
                    _ => 0.0,
                };
            }
        }

        for event in &events[next_event..] {
            self.apply_event(event);
        }
    }

    fn render_all(&mut self, outputs: &mut [&mut [f32]], start: usize, end: usize) {
        for (channel, out) in outputs.iter_mut().enumerate() {
            self.render_segment(channel, &mut out[start..end]);
        }
    }

    fn render_segment(&mut self, channel: usize, out: &mut [f32]) {
        match (self.players.get_mut(channel), self.notes.get(channel)) {
            (Some(player), Some(notes)) => {
                player.advance_block(out);
                if !notes.is_active() {
                    out.fill(0.0);
                }
            }
            _ => out.fill(0.0),
        }
    }
}
