//! Control-thread side of the engine.
//!
//! [`NoiseEngine`] owns everything that allocates: the synthesizer with its
//! transform plan, the seam finder and the producer end of the publish queue.
//! Each resynthesis builds a complete buffer set, smooths its seam and hands it
//! to the paired [`NoiseRenderer`]; superseded sets come back and are dropped
//! in [`NoiseEngine::maintain`].

use std::sync::Arc;

use tiltnoise_spec::validation::validate_render_setup;
use tiltnoise_spec::NoiseConfig;
use tracing::{debug, info, warn};

use crate::commands::{
    create_audio_channels, BufferSet, GarbageConsumer, PublishProducer, RendererStats,
};
use crate::error::{NoiseError, NoiseResult};
use crate::renderer::NoiseRenderer;
use crate::rng::entropy_seed;
use crate::seam::{LoopSeamFinder, SeamReport};
use crate::synthesis::NoiseSynthesizer;
use crate::tilt::TiltParameter;

/// Summary of one published buffer set.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    /// Sequence number of the set.
    pub generation: u64,
    /// Loop length in samples.
    pub length: usize,
    /// Sample rate the set was built for.
    pub sample_rate: f64,
    /// Tilt the set was built with, in dB/octave.
    pub tilt: f32,
    /// RMS of the loop after seam smoothing.
    pub rms: f32,
    /// Seam search and smoothing outcome.
    pub seam: SeamReport,
}

/// Builds and publishes loop buffers for a [`NoiseRenderer`].
pub struct NoiseEngine {
    config: NoiseConfig,
    synthesizer: NoiseSynthesizer,
    seam_finder: LoopSeamFinder,
    tilt: Arc<TiltParameter>,
    publish_tx: PublishProducer,
    garbage_rx: GarbageConsumer,
    stats: Arc<RendererStats>,
    sample_rate: Option<f64>,
    next_generation: u64,
    last_report: Option<PublishReport>,
    reported_underflows: u64,
}

impl std::fmt::Debug for NoiseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseEngine")
            .field("config", &self.config)
            .field("sample_rate", &self.sample_rate)
            .field("tilt", &self.tilt.get())
            .field("last_report", &self.last_report)
            .finish()
    }
}

impl NoiseEngine {
    /// Creates an engine and the renderer it feeds.
    ///
    /// Nothing is synthesized until a sample rate is set with
    /// [`set_sample_rate_and_length`](Self::set_sample_rate_and_length); until
    /// then the renderer plays silence.
    pub fn create(config: NoiseConfig) -> NoiseResult<(NoiseEngine, NoiseRenderer)> {
        let validation = config.validate();
        if !validation.is_ok() {
            return Err(NoiseError::InvalidConfig(validation.errors));
        }

        let base_seed = config.seed.unwrap_or_else(entropy_seed);
        let synthesizer = NoiseSynthesizer::new(base_seed, config.target_rms)?;
        let seam_finder = LoopSeamFinder::new(config.seam_window)?;
        let tilt = Arc::new(TiltParameter::new(
            config.initial_tilt,
            config.tilt_min,
            config.tilt_max,
        ));

        let (publish_tx, publish_rx, garbage_tx, garbage_rx) = create_audio_channels();
        let stats = Arc::new(RendererStats::default());
        let renderer = NoiseRenderer::new(config.channels, publish_rx, garbage_tx, Arc::clone(&stats));

        debug!(
            base_seed,
            channels = config.channels,
            seam_window = config.seam_window,
            "created noise engine"
        );

        let engine = NoiseEngine {
            config,
            synthesizer,
            seam_finder,
            tilt,
            publish_tx,
            garbage_rx,
            stats,
            sample_rate: None,
            next_generation: 0,
            last_report: None,
            reported_underflows: 0,
        };
        Ok((engine, renderer))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Returns the seed all buffers are derived from.
    pub fn base_seed(&self) -> u32 {
        self.synthesizer.base_seed()
    }

    /// Returns the sample rate, once one was set.
    pub fn sample_rate(&self) -> Option<f64> {
        self.sample_rate
    }

    /// Returns the shared tilt parameter for a control surface.
    pub fn tilt_handle(&self) -> Arc<TiltParameter> {
        Arc::clone(&self.tilt)
    }

    /// Returns the renderer counters.
    pub fn stats(&self) -> &Arc<RendererStats> {
        &self.stats
    }

    /// Returns the report of the most recently published set.
    pub fn last_report(&self) -> Option<&PublishReport> {
        self.last_report.as_ref()
    }

    /// Sets the tilt and resynthesizes if the engine is prepared.
    ///
    /// Values outside the configured range are clamped. Non-finite values are
    /// rejected and the current buffer stays in use.
    ///
    /// # Returns
    /// The publish report, or `None` if no sample rate is set yet or the
    /// clamped tilt equals the one already playing.
    pub fn set_tilt(&mut self, tilt: f32) -> NoiseResult<Option<PublishReport>> {
        if self.tilt.set(tilt).is_none() {
            warn!(tilt, "rejected non-finite tilt");
            return Err(NoiseError::InvalidTilt { tilt });
        }
        self.on_tilt_changed()
    }

    /// Resynthesizes from the current tilt snapshot if it differs from the
    /// tilt of the last published set.
    pub fn on_tilt_changed(&mut self) -> NoiseResult<Option<PublishReport>> {
        if self.sample_rate.is_none() {
            return Ok(None);
        }
        let tilt = self.tilt.get();
        if self.last_report.as_ref().is_some_and(|report| report.tilt == tilt) {
            debug!(tilt, "tilt unchanged; keeping current loop");
            return Ok(None);
        }
        self.resynthesize().map(Some)
    }

    /// Switches to a new sample rate and rebuilds the loop at the matching length.
    ///
    /// The setup is validated first; on error the previous sample rate and
    /// buffer stay in use.
    pub fn set_sample_rate_and_length(&mut self, sample_rate: f64) -> NoiseResult<PublishReport> {
        let validation = validate_render_setup(&self.config, sample_rate);
        if !validation.is_ok() {
            for error in &validation.errors {
                warn!(code = error.code.code(), "{}", error.message);
            }
            return Err(NoiseError::InvalidConfig(validation.errors));
        }

        let previous = self.sample_rate.replace(sample_rate);
        match self.resynthesize() {
            Ok(report) => Ok(report),
            Err(err) => {
                self.sample_rate = previous;
                Err(err)
            }
        }
    }

    /// Builds, smooths and publishes a fresh buffer set.
    pub fn resynthesize(&mut self) -> NoiseResult<PublishReport> {
        let sample_rate = self.sample_rate.ok_or(NoiseError::NotPrepared)?;
        self.maintain();

        let length = self.config.loop_length(sample_rate);
        let tilt = self.tilt.get();

        let mut buffer = self.synthesizer.synthesize(length, sample_rate, tilt)?;
        let seam = self.seam_finder.process(buffer.samples_mut())?;
        let rms = buffer.rms();

        let generation = self.next_generation;
        let mut buffers = Vec::with_capacity(self.config.channels);
        for _ in 1..self.config.channels {
            buffers.push(buffer.clone());
        }
        buffers.push(buffer);

        if self.publish_tx.push(BufferSet::new(buffers, generation)).is_err() {
            warn!(generation, "publish queue full; discarding buffer set");
            return Err(NoiseError::QueueFull);
        }
        self.next_generation += 1;

        info!(
            generation,
            length,
            sample_rate,
            tilt,
            seam_offset = seam.offset,
            discontinuity_before = seam.discontinuity_before,
            discontinuity_after = seam.discontinuity_after,
            "published noise loop"
        );

        let report = PublishReport {
            generation,
            length,
            sample_rate,
            tilt,
            rms,
            seam,
        };
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Frees buffer sets the renderer has released and reports note
    /// underflows seen since the last call.
    ///
    /// # Returns
    /// The number of sets freed.
    pub fn maintain(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(set) = self.garbage_rx.pop() {
            drop(set);
            freed += 1;
        }

        let underflows = self.stats.note_underflows();
        if underflows > self.reported_underflows {
            warn!(
                new = underflows - self.reported_underflows,
                total = underflows,
                "note-off received with no note held"
            );
            self.reported_underflows = underflows;
        }

        freed
    }
}
