//! tiltnoise CLI library.
//!
//! This crate provides the command implementations behind the `tiltnoise`
//! binary: offline rendering to WAV, loop inspection and, with the `playback`
//! feature, live output through the default audio device.

pub mod commands;
pub mod logging;
pub mod settings;
