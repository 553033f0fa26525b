//! tiltnoise Engine
//!
//! This crate synthesizes spectrally tilted noise, loops it without clicks and
//! serves it to a real-time audio callback.
//!
//! # Overview
//!
//! Work is split across two threads:
//!
//! - **Control thread** - [`NoiseEngine`] builds a noise loop whenever the tilt
//!   or sample rate changes: random half spectrum, tilt curve around 1 kHz,
//!   inverse real FFT, RMS normalization, then seam smoothing.
//! - **Audio thread** - [`NoiseRenderer`] plays the loop per channel, gated by
//!   held notes. It never allocates, frees, locks or blocks.
//!
//! Finished loops move to the renderer through a lock-free queue; the loops
//! they replace travel back through a second queue and are freed on the
//! control thread. [`ControlLoop`] runs the engine on its own thread and folds
//! bursts of parameter changes into a single resynthesis.
//!
//! # Determinism
//!
//! Given a fixed seed, every loop is reproducible. Each resynthesis draws from
//! a fresh PCG32 generator whose seed is derived from the base seed and a
//! generation counter via BLAKE3.
//!
//! # Example
//!
//! ```
//! use tiltnoise_engine::NoiseEngine;
//! use tiltnoise_spec::NoiseConfig;
//!
//! let config = NoiseConfig::default()
//!     .with_loop_seconds(0.05)
//!     .with_seam_window(128)
//!     .with_seed(1);
//! let (mut engine, mut renderer) = NoiseEngine::create(config)?;
//! engine.set_sample_rate_and_length(48_000.0)?;
//!
//! renderer.note_on(0);
//! let block = renderer.render(0, 256);
//! assert!(block.iter().all(|s| s.abs() <= 1.0));
//! # Ok::<(), tiltnoise_engine::NoiseError>(())
//! ```
//!
//! # Crate Structure
//!
//! - [`spectrum`] - Tilt curve applied to a half spectrum
//! - [`synthesis`] - Frequency-domain noise synthesis
//! - [`seam`] - Loop seam search, crossfade and quality metrics
//! - [`player`] - Circular playback of a loop
//! - [`notes`] - Held-note gating and note events
//! - [`tilt`] - Lock-free tilt parameter
//! - [`commands`] - Queues between the control and audio threads
//! - [`engine`] - Control-thread engine
//! - [`renderer`] - Audio-thread renderer
//! - [`control`] - Message-driven control loop
//! - [`rng`] - Deterministic RNG with seed derivation

pub mod buffer;
pub mod commands;
pub mod control;
pub mod engine;
pub mod error;
pub mod notes;
pub mod player;
pub mod renderer;
pub mod rng;
pub mod seam;
pub mod spectrum;
pub mod synthesis;
pub mod tilt;

// Re-export main types at crate root
pub use buffer::NoiseBuffer;
pub use commands::{BufferSet, RendererStats};
pub use control::{ControlHandle, ControlLoop, ControlMessage};
pub use engine::{NoiseEngine, PublishReport};
pub use error::{NoiseError, NoiseResult};
pub use notes::{NoteActivity, NoteEvent, NoteEventKind};
pub use player::CircularPlayer;
pub use renderer::NoiseRenderer;
pub use seam::{LoopSeamFinder, SeamMatch, SeamReport};
pub use synthesis::NoiseSynthesizer;
pub use tilt::TiltParameter;
