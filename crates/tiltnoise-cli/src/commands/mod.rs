//! CLI command implementations

pub mod inspect;
#[cfg(feature = "playback")]
pub mod play;
pub mod render;
