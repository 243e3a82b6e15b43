//! Analysis-thread pipelines feeding the display
//!
//! Two independent pollers run at the display rate, each publishing a
//! complete path through a [`SharedPath`] cell:
//! - [`SpectrumPipeline`] drains one channel's FIFO into the FFT window
//!   and renders the live spectrum.
//! - [`ResponseCurveDriver`] watches the parameter epoch and re-renders
//!   the static response overlay from a fresh coefficient build.

use std::sync::Arc;

use tracing::{debug, warn};

use thelassic_dsp::{
    make_chain_update, FftPathGenerator, FifoConsumer, MagnitudePath, ResponseCurveEvaluator,
    SharedPath,
};

use crate::error::EngineResult;
use crate::params::EqParams;

/// FIFO -> FFT -> spectrum path, for one channel
pub struct SpectrumPipeline {
    consumer: FifoConsumer,
    /// Reused pop target, sized to the FIFO's block length
    block: Vec<f32>,
    generator: FftPathGenerator,
    scratch_path: MagnitudePath,
    published: SharedPath,
}

impl SpectrumPipeline {
    pub fn new(consumer: FifoConsumer, sample_rate: f32) -> EngineResult<Self> {
        let block = vec![0.0; consumer.block_len()];
        Ok(Self {
            consumer,
            block,
            generator: FftPathGenerator::new(sample_rate)?,
            scratch_path: MagnitudePath::new(),
            published: SharedPath::new(),
        })
    }

    /// Cell the display reads the latest spectrum path from
    pub fn path(&self) -> SharedPath {
        self.published.clone()
    }

    /// Drain everything queued since the last call, then render and
    /// publish if a full window is available. Returns whether a new
    /// path was published; on `false` the previous one stays visible.
    pub fn poll(&mut self, width: f32, height: f32) -> bool {
        while let Some((_, len)) = self.consumer.pop(&mut self.block) {
            self.generator.push_block(&self.block[..len]);
        }

        if self.generator.render_into(width, height, &mut self.scratch_path) {
            self.published.publish(&mut self.scratch_path);
            true
        } else {
            false
        }
    }

    /// Forget accumulated audio (stream restart)
    pub fn reset(&mut self) {
        self.generator.reset();
    }
}

/// Epoch-gated renderer for the static response overlay.
///
/// Owns its own coefficient build so the audio thread's filters are
/// never read across threads; both sides derive from the same clamped
/// snapshot and therefore agree.
pub struct ResponseCurveDriver {
    params: Arc<EqParams>,
    evaluator: ResponseCurveEvaluator,
    last_epoch: u64,
    points: usize,
    scratch_path: MagnitudePath,
    published: SharedPath,
}

impl ResponseCurveDriver {
    pub fn new(params: Arc<EqParams>, sample_rate: f32, points: usize) -> Self {
        Self {
            params,
            evaluator: ResponseCurveEvaluator::new(sample_rate),
            last_epoch: 0,
            points,
            scratch_path: MagnitudePath::new(),
            published: SharedPath::new(),
        }
    }

    /// Cell the display reads the latest response path from
    pub fn path(&self) -> SharedPath {
        self.published.clone()
    }

    /// Re-render when the parameters changed since the last call.
    /// Returns whether a new path was published.
    pub fn poll(&mut self, width: f32, height: f32) -> bool {
        let epoch = self.params.epoch();
        if epoch == self.last_epoch {
            return false;
        }
        self.last_epoch = epoch;

        let settings = self.params.snapshot();
        match make_chain_update(&settings, self.evaluator.sample_rate()) {
            Ok(update) => self.evaluator.set_chain(update),
            // Keep rendering the previous coefficients; the audio side
            // rejected the same snapshot too.
            Err(err) => warn!(%err, "response curve kept stale coefficients"),
        }

        self.evaluator
            .render_into(width, height, self.points, &mut self.scratch_path);
        self.published.publish(&mut self.scratch_path);
        debug!(epoch, "response curve rebuilt");
        true
    }
}
