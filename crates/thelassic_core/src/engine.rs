//! EQ Engine - the audio-thread side of the processor
//!
//! Owns one filter chain per channel and the producer ends of the
//! analyzer FIFOs. `process_block` is the real-time entry point and
//! performs no allocation, locking or logging: parameter changes arrive
//! through the atomic bridge and are folded in at block boundaries only.

use std::sync::Arc;

use tracing::info;

use thelassic_dsp::{make_chain_update, FifoConsumer, FifoProducer, FilterChain, SpectrumFifo};

use crate::config::StreamConfig;
use crate::error::{EngineError, EngineResult};
use crate::params::EqParams;

/// Display refresh rate the FIFO capacity is sized against
pub const DISPLAY_REFRESH_HZ: f32 = 60.0;

/// Per-stream EQ processor for up to two channels.
///
/// Lifecycle: construct with a shared parameter bridge, `prepare` for a
/// stream configuration (handing the FIFO consumer ends to the analysis
/// side), then call `process_block` from the audio callback.
pub struct EqEngine {
    params: Arc<EqParams>,
    left_chain: FilterChain,
    right_chain: FilterChain,
    left_tap: Option<FifoProducer>,
    right_tap: Option<FifoProducer>,
    config: Option<StreamConfig>,
    last_epoch: u64,
}

impl EqEngine {
    pub fn new(params: Arc<EqParams>) -> Self {
        Self {
            params,
            left_chain: FilterChain::new(),
            right_chain: FilterChain::new(),
            left_tap: None,
            right_tap: None,
            config: None,
            last_epoch: 0,
        }
    }

    pub fn params(&self) -> &Arc<EqParams> {
        &self.params
    }

    pub fn is_prepared(&self) -> bool {
        self.config.is_some()
    }

    /// Set up for a stream: size and create the analyzer FIFOs, reset
    /// filter state and build the initial coefficients.
    ///
    /// Returns the consumer ends (left, right) for the analysis thread.
    /// May be called again with a new configuration; previous consumers
    /// are orphaned and simply stop receiving blocks.
    pub fn prepare(&mut self, config: StreamConfig) -> EngineResult<(FifoConsumer, FifoConsumer)> {
        config.validate()?;

        let block_len = config.buffer_size as usize;
        let capacity =
            SpectrumFifo::capacity_for(config.sample_rate as f32, block_len, DISPLAY_REFRESH_HZ);

        let (left_tap, left_consumer) = SpectrumFifo::channel(capacity, block_len);
        let (right_tap, right_consumer) = SpectrumFifo::channel(capacity, block_len);

        self.left_chain.reset();
        self.right_chain.reset();
        self.left_tap = Some(left_tap);
        self.right_tap = Some(right_tap);
        self.config = Some(config);

        // Force a coefficient build on the first block.
        self.last_epoch = 0;
        self.refresh_coefficients();

        info!(
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            fifo_capacity = capacity,
            latency_ms = config.latency_ms(),
            "engine prepared"
        );

        Ok((left_consumer, right_consumer))
    }

    /// Process one block in place. Real-time safe.
    ///
    /// Does nothing when `prepare` has not run; the caller's buffers
    /// pass through untouched in that case.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        if self.config.is_none() {
            return;
        }

        self.refresh_coefficients();

        self.left_chain.process(left);
        self.right_chain.process(right);

        if self.params.analyzer_enabled() {
            // Overwrite-oldest: a slow analysis side loses old blocks,
            // never stalls this thread. Chunking covers callers handing
            // in more than one buffer's worth at once; a short tail goes
            // through as a partial block.
            if let Some(tap) = &mut self.left_tap {
                for chunk in left.chunks(tap.block_len()) {
                    let _ = tap.push(chunk);
                }
            }
            if let Some(tap) = &mut self.right_tap {
                for chunk in right.chunks(tap.block_len()) {
                    let _ = tap.push(chunk);
                }
            }
        }
    }

    /// Rebuild coefficients when the parameter epoch moved.
    ///
    /// A failed build keeps the previous coefficients but still consumes
    /// the epoch; retrying an unchanged snapshot cannot succeed. The
    /// clamped snapshot makes failures unreachable in practice.
    fn refresh_coefficients(&mut self) {
        let epoch = self.params.epoch();
        if epoch == self.last_epoch {
            return;
        }
        self.last_epoch = epoch;

        let config = match &self.config {
            Some(config) => config,
            None => return,
        };

        let settings = self.params.snapshot();
        if let Ok(update) = make_chain_update(&settings, config.sample_rate as f32) {
            self.left_chain.apply_update(&update);
            self.right_chain.apply_update(&update);
        }
    }
}
