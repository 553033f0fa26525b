//! Queue types for handing buffers between the control and audio threads.
//!
//! Buffers travel control -> audio through the publish queue. Superseded
//! buffers travel back through the garbage queue so that they are freed on the
//! control thread, never inside the audio callback.

use std::sync::atomic::{AtomicU64, Ordering};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::buffer::NoiseBuffer;

/// One buffer per output channel, all built from the same resynthesis.
#[derive(Debug, Default)]
pub struct BufferSet {
    /// Per-channel buffers, indexed by channel.
    pub buffers: Vec<NoiseBuffer>,
    /// Resynthesis counter value of the set.
    pub generation: u64,
}

impl BufferSet {
    /// Creates a set.
    pub fn new(buffers: Vec<NoiseBuffer>, generation: u64) -> Self {
        Self {
            buffers,
            generation,
        }
    }

    /// Total samples held across all channels.
    pub fn total_samples(&self) -> usize {
        self.buffers.iter().map(NoiseBuffer::len).sum()
    }
}

/// Capacity for the publish queue (control -> audio).
/// Each entry is a full set of loop buffers, so only a few are ever in flight.
pub const PUBLISH_QUEUE_CAPACITY: usize = 4;

/// Capacity for the garbage queue (audio -> control).
pub const GARBAGE_QUEUE_CAPACITY: usize = 8;

/// Producer end of the publish queue (control thread -> audio thread)
pub type PublishProducer = Producer<BufferSet>;
/// Consumer end of the publish queue (audio thread <- control thread)
pub type PublishConsumer = Consumer<BufferSet>;

/// Producer end of the garbage queue (audio thread -> control thread)
pub type GarbageProducer = Producer<BufferSet>;
/// Consumer end of the garbage queue (control thread <- audio thread)
pub type GarbageConsumer = Consumer<BufferSet>;

/// Creates the publish and garbage queues.
pub fn create_audio_channels() -> (
    PublishProducer,
    PublishConsumer,
    GarbageProducer,
    GarbageConsumer,
) {
    let (publish_prod, publish_cons) = RingBuffer::new(PUBLISH_QUEUE_CAPACITY);
    let (garbage_prod, garbage_cons) = RingBuffer::new(GARBAGE_QUEUE_CAPACITY);
    (publish_prod, publish_cons, garbage_prod, garbage_cons)
}

const NO_GENERATION: u64 = u64::MAX;

/// Counters written by the audio thread and read by the control thread.
#[derive(Debug)]
pub struct RendererStats {
    note_underflows: AtomicU64,
    sets_installed: AtomicU64,
    installed_generation: AtomicU64,
}

impl Default for RendererStats {
    fn default() -> Self {
        Self {
            note_underflows: AtomicU64::new(0),
            sets_installed: AtomicU64::new(0),
            installed_generation: AtomicU64::new(NO_GENERATION),
        }
    }
}

impl RendererStats {
    pub(crate) fn record_note_underflow(&self) {
        self.note_underflows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_install(&self, generation: u64) {
        self.sets_installed.fetch_add(1, Ordering::Relaxed);
        self.installed_generation.store(generation, Ordering::Release);
    }

    /// Number of note-offs received while no note was held.
    pub fn note_underflows(&self) -> u64 {
        self.note_underflows.load(Ordering::Relaxed)
    }

    /// Number of buffer sets the renderer has switched to.
    pub fn sets_installed(&self) -> u64 {
        self.sets_installed.load(Ordering::Relaxed)
    }

    /// Generation currently playing, if any set was installed.
    pub fn installed_generation(&self) -> Option<u64> {
        match self.installed_generation.load(Ordering::Acquire) {
            NO_GENERATION => None,
            generation => Some(generation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_have_capacity() {
        let (mut publish_tx, mut publish_rx, garbage_tx, _garbage_rx) = create_audio_channels();
        assert_eq!(publish_tx.slots(), PUBLISH_QUEUE_CAPACITY);
        assert_eq!(garbage_tx.slots(), GARBAGE_QUEUE_CAPACITY);

        publish_tx
            .push(BufferSet::new(vec![NoiseBuffer::from_samples(vec![0.0; 4])], 3))
            .unwrap();
        let set = publish_rx.pop().unwrap();
        assert_eq!(set.generation, 3);
        assert_eq!(set.total_samples(), 4);
    }

    #[test]
    fn test_publish_queue_fills_up() {
        let (mut publish_tx, _publish_rx, _garbage_tx, _garbage_rx) = create_audio_channels();
        for generation in 0..PUBLISH_QUEUE_CAPACITY as u64 {
            assert!(publish_tx.push(BufferSet::new(Vec::new(), generation)).is_ok());
        }
        assert!(publish_tx.push(BufferSet::default()).is_err());
    }

    #[test]
    fn test_stats() {
        let stats = RendererStats::default();
        assert_eq!(stats.installed_generation(), None);
        assert_eq!(stats.sets_installed(), 0);

        stats.record_install(0);
        stats.record_install(4);
        stats.record_note_underflow();
        assert_eq!(stats.installed_generation(), Some(4));
        assert_eq!(stats.sets_installed(), 2);
        assert_eq!(stats.note_underflows(), 1);
    }
}
