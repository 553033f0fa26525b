//! Control loop that turns parameter notifications into resynthesis.
//!
//! Control surfaces write the tilt atomically and post a [`ControlMessage`].
//! A single worker thread owns the [`NoiseEngine`], folds bursts of messages
//! into one resynthesis and periodically frees buffers the renderer returned.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::engine::NoiseEngine;
use crate::error::{NoiseError, NoiseResult};
use crate::tilt::TiltParameter;

/// How often the worker frees returned buffers while idle.
pub const MAINTENANCE_INTERVAL: Duration = Duration::from_millis(50);

/// Errors kept for [`ControlHandle::drain_errors`]; later ones are only logged.
pub const ERROR_BACKLOG: usize = 16;

/// Notifications sent to the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    /// The shared tilt parameter was written.
    TiltChanged,
    /// The host switched sample rate.
    SampleRateChanged(f64),
    /// Build a fresh loop with the current parameters.
    Resynthesize,
    /// Stop the worker.
    Shutdown,
}

/// Work left after folding a burst of messages.
#[derive(Debug, Default, PartialEq)]
struct Pending {
    sample_rate: Option<f64>,
    tilt_changed: bool,
    resynthesize: bool,
    shutdown: bool,
}

impl Pending {
    fn add(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::TiltChanged => self.tilt_changed = true,
            ControlMessage::SampleRateChanged(rate) => self.sample_rate = Some(rate),
            ControlMessage::Resynthesize => self.resynthesize = true,
            ControlMessage::Shutdown => self.shutdown = true,
        }
    }
}

/// Worker that owns the engine.
pub struct ControlLoop {
    engine: NoiseEngine,
    rx: Receiver<ControlMessage>,
    errors_tx: Sender<NoiseError>,
}

impl ControlLoop {
    /// Moves the engine onto a new control thread.
    pub fn spawn(engine: NoiseEngine) -> ControlHandle {
        let (tx, rx) = unbounded();
        let (errors_tx, errors_rx) = bounded(ERROR_BACKLOG);
        let tilt = engine.tilt_handle();

        let worker = ControlLoop {
            engine,
            rx,
            errors_tx,
        };
        let thread = thread::spawn(move || worker.run());

        ControlHandle {
            tx,
            errors_rx,
            tilt,
            thread: Some(thread),
        }
    }

    fn run(mut self) -> NoiseEngine {
        loop {
            let first = match self.rx.recv_timeout(MAINTENANCE_INTERVAL) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => {
                    self.engine.maintain();
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let mut pending = Pending::default();
            pending.add(first);
            let mut folded = 0usize;
            for message in self.rx.try_iter() {
                pending.add(message);
                folded += 1;
            }
            if folded > 0 {
                debug!(folded, "coalesced control messages");
            }

            self.apply(&pending);
            if pending.shutdown {
                break;
            }
        }

        self.engine.maintain();
        debug!("control loop stopped");
        self.engine
    }

    fn apply(&mut self, pending: &Pending) {
        if let Some(rate) = pending.sample_rate {
            match self.engine.set_sample_rate_and_length(rate) {
                // The rebuild already carries the current tilt
                Ok(_) => return,
                // Keep serving the folded tilt or resynthesis request
                Err(err) => self.report(err),
            }
        }

        let result = if pending.resynthesize {
            self.engine.resynthesize().map(|_| ())
        } else if pending.tilt_changed {
            self.engine.on_tilt_changed().map(|_| ())
        } else {
            Ok(())
        };
        if let Err(err) = result {
            self.report(err);
        }
    }

    fn report(&self, err: NoiseError) {
        warn!(code = err.code(), "resynthesis failed: {}", err);
        // Full backlog: the error is already logged
        let _ = self.errors_tx.try_send(err);
    }
}

/// Control-surface side of a running [`ControlLoop`].
pub struct ControlHandle {
    tx: Sender<ControlMessage>,
    errors_rx: Receiver<NoiseError>,
    tilt: Arc<TiltParameter>,
    thread: Option<JoinHandle<NoiseEngine>>,
}

impl ControlHandle {
    /// Returns the shared tilt parameter.
    pub fn tilt(&self) -> &Arc<TiltParameter> {
        &self.tilt
    }

    /// Posts a message to the control loop.
    pub fn send(&self, message: ControlMessage) -> NoiseResult<()> {
        self.tx.send(message).map_err(|_| NoiseError::Disconnected)
    }

    /// Stores a tilt and asks for a resynthesis.
    ///
    /// # Returns
    /// The stored (clamped) tilt.
    pub fn set_tilt(&self, tilt: f32) -> NoiseResult<f32> {
        let stored = self.tilt.set(tilt).ok_or(NoiseError::InvalidTilt { tilt })?;
        self.send(ControlMessage::TiltChanged)?;
        Ok(stored)
    }

    /// Asks for a rebuild at a new sample rate.
    pub fn set_sample_rate_and_length(&self, sample_rate: f64) -> NoiseResult<()> {
        self.send(ControlMessage::SampleRateChanged(sample_rate))
    }

    /// Asks for a fresh loop with unchanged parameters.
    pub fn request_resynthesis(&self) -> NoiseResult<()> {
        self.send(ControlMessage::Resynthesize)
    }

    /// Returns errors the control loop reported since the last call.
    pub fn drain_errors(&self) -> Vec<NoiseError> {
        self.errors_rx.try_iter().collect()
    }

    /// Stops the loop after it has handled every queued message and returns
    /// the engine.
    pub fn shutdown(mut self) -> NoiseResult<NoiseEngine> {
        let _ = self.tx.send(ControlMessage::Shutdown);
        let thread = self.thread.take().ok_or(NoiseError::Disconnected)?;
        thread.join().map_err(|_| NoiseError::Disconnected)
    }
}

impl Drop for ControlHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.tx.send(ControlMessage::Shutdown);
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tiltnoise_spec::NoiseConfig;

    fn small_config() -> NoiseConfig {
        NoiseConfig::default()
            .with_loop_seconds(0.05)
            .with_seam_window(128)
            .with_channels(1)
            .with_seed(9)
    }

    fn prepared_worker() -> (ControlLoop, Receiver<NoiseError>) {
        let (mut engine, _renderer) = NoiseEngine::create(small_config()).unwrap();
        engine.set_sample_rate_and_length(48_000.0).unwrap();
        let (_tx, rx) = unbounded();
        let (errors_tx, errors_rx) = bounded(ERROR_BACKLOG);
        let worker = ControlLoop {
            engine,
            rx,
            errors_tx,
        };
        (worker, errors_rx)
    }

    #[test]
    fn test_pending_folds_messages() {
        let mut pending = Pending::default();
        pending.add(ControlMessage::TiltChanged);
        pending.add(ControlMessage::SampleRateChanged(44_100.0));
        pending.add(ControlMessage::SampleRateChanged(48_000.0));
        pending.add(ControlMessage::TiltChanged);
        assert_eq!(
            pending,
            Pending {
                sample_rate: Some(48_000.0),
                tilt_changed: true,
                resynthesize: false,
                shutdown: false,
            }
        );
    }

    #[test]
    fn test_sample_rate_then_tilt() {
        let (engine, _renderer) = NoiseEngine::create(small_config()).unwrap();
        let handle = ControlLoop::spawn(engine);

        handle.set_sample_rate_and_length(48_000.0).unwrap();
        assert_eq!(handle.set_tilt(-3.0).unwrap(), -3.0);

        let engine = handle.shutdown().unwrap();
        let report = engine.last_report().unwrap();
        assert_eq!(report.tilt, -3.0);
        assert_eq!(report.length, 2400);
        assert_eq!(engine.sample_rate(), Some(48_000.0));
    }

    #[test]
    fn test_errors_are_reported() {
        let (engine, _renderer) = NoiseEngine::create(small_config()).unwrap();
        let handle = ControlLoop::spawn(engine);

        handle.request_resynthesis().unwrap();
        handle.set_sample_rate_and_length(-1.0).unwrap();
        assert!(handle.set_tilt(f32::NAN).is_err());

        // Wait for the worker to handle everything queued so far
        let tilt = Arc::clone(handle.tilt());
        let errors_rx = handle.errors_rx.clone();
        let engine = handle.shutdown().unwrap();
        let errors: Vec<NoiseError> = errors_rx.try_iter().collect();

        assert!(!errors.is_empty());
        assert!(errors
            .iter()
            .all(|e| matches!(e, NoiseError::NotPrepared | NoiseError::InvalidConfig(_))));
        assert_eq!(engine.sample_rate(), None);
        assert_eq!(tilt.get(), 0.0);
    }

    #[test]
    fn test_rejected_sample_rate_keeps_tilt_change() {
        let (mut worker, errors_rx) = prepared_worker();
        worker.engine.tilt_handle().set(-6.0);

        worker.apply(&Pending {
            sample_rate: Some(0.0),
            tilt_changed: true,
            ..Pending::default()
        });

        assert_eq!(worker.engine.last_report().map(|r| r.tilt), Some(-6.0));
        assert_eq!(worker.engine.sample_rate(), Some(48_000.0));
        let errors: Vec<NoiseError> = errors_rx.try_iter().collect();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], NoiseError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejected_sample_rate_keeps_resynthesis() {
        let (mut worker, errors_rx) = prepared_worker();
        let before = worker.engine.last_report().map(|r| r.generation);

        worker.apply(&Pending {
            sample_rate: Some(f64::NAN),
            resynthesize: true,
            ..Pending::default()
        });

        let after = worker.engine.last_report().map(|r| r.generation);
        assert!(after > before);
        assert_eq!(errors_rx.try_iter().count(), 1);
    }

    #[test]
    fn test_accepted_sample_rate_rebuilds_once() {
        let (mut worker, _errors_rx) = prepared_worker();
        worker.engine.tilt_handle().set(3.0);
        let before = worker.engine.last_report().map(|r| r.generation).unwrap();

        worker.apply(&Pending {
            sample_rate: Some(44_100.0),
            tilt_changed: true,
            resynthesize: true,
            shutdown: false,
        });

        let report = worker.engine.last_report().unwrap();
        assert_eq!(report.generation, before + 1);
        assert_eq!(report.tilt, 3.0);
        assert_eq!(report.sample_rate, 44_100.0);
    }

    #[test]
    fn test_error_backlog_is_bounded() {
        let (mut worker, errors_rx) = prepared_worker();
        for _ in 0..ERROR_BACKLOG + 5 {
            worker.apply(&Pending {
                sample_rate: Some(-1.0),
                ..Pending::default()
            });
        }
        assert_eq!(errors_rx.try_iter().count(), ERROR_BACKLOG);
    }

    #[test]
    fn test_drop_stops_worker() {
        let (engine, _renderer) = NoiseEngine::create(small_config()).unwrap();
        let handle = ControlLoop::spawn(engine);
        handle.set_sample_rate_and_length(48_000.0).unwrap();
        drop(handle);
    }
}
