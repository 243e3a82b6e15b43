//! FFT path generation for the live spectral view
//!
//! Accumulates drained FIFO blocks into a fixed-length rolling window
//! (shift-and-append, preserving temporal continuity across blocks),
//! applies a Hann window, computes the magnitude spectrum and converts it
//! to a renderable polyline in the shared display coordinate space.
//!
//! Runs only on the non-real-time analysis thread; a full render of a
//! 2048-point window is far below one display frame at 60 Hz.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::display::{self, MagnitudePath, PathPoint, SPECTRUM_FLOOR_DB};
use crate::error::DspError;
use crate::settings::{MAX_FREQ_HZ, MIN_FREQ_HZ};

/// Analysis window length in samples (must be a power of 2).
/// 2048 at 48kHz is a ~43ms window with ~23Hz bin resolution.
pub const FFT_SIZE: usize = 2048;

/// Where a channel's analyzer currently is in its produce cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerStage {
    /// No fresh samples since the last render
    Idle,
    /// Window not yet full
    Accumulating,
    /// Window full; a transform may run
    ReadyForTransform,
    /// Transform and path build in progress
    Rendering,
}

fn hann(n: usize, size: usize) -> f32 {
    0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / (size - 1) as f32).cos())
}

/// Per-channel FFT path generator
pub struct FftPathGenerator {
    sample_rate: f32,
    stage: AnalyzerStage,
    /// Rolling window: oldest sample first, newest appended at the tail
    samples: Vec<f32>,
    filled: usize,
    /// Pre-computed Hann coefficients
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    /// Transform working buffer, reused every render
    scratch: Vec<Complex<f32>>,
}

impl FftPathGenerator {
    pub fn new(sample_rate: f32) -> Result<Self, DspError> {
        if !(sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        Ok(Self {
            sample_rate,
            stage: AnalyzerStage::Idle,
            samples: vec![0.0; FFT_SIZE],
            filled: 0,
            window: (0..FFT_SIZE).map(|n| hann(n, FFT_SIZE)).collect(),
            fft,
            scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
        })
    }

    pub fn stage(&self) -> AnalyzerStage {
        self.stage
    }

    pub fn is_ready(&self) -> bool {
        self.stage == AnalyzerStage::ReadyForTransform
    }

    /// Shift-and-append one drained block: oldest samples drop off the
    /// head, the new block lands at the tail.
    pub fn push_block(&mut self, block: &[f32]) {
        if block.is_empty() {
            return;
        }

        if block.len() >= FFT_SIZE {
            // Block longer than the window: keep only its newest samples.
            let tail = &block[block.len() - FFT_SIZE..];
            self.samples.copy_from_slice(tail);
            self.filled = FFT_SIZE;
        } else {
            self.samples.copy_within(block.len().., 0);
            self.samples[FFT_SIZE - block.len()..].copy_from_slice(block);
            self.filled = (self.filled + block.len()).min(FFT_SIZE);
        }

        self.stage = if self.filled == FFT_SIZE {
            AnalyzerStage::ReadyForTransform
        } else {
            AnalyzerStage::Accumulating
        };
    }

    /// Transform the current window and rebuild `path` in place.
    ///
    /// Returns `false` without touching `path` when the window is not
    /// ready; the previous path stays published in that case.
    pub fn render_into(&mut self, width: f32, height: f32, path: &mut MagnitudePath) -> bool {
        if self.stage != AnalyzerStage::ReadyForTransform {
            return false;
        }
        self.stage = AnalyzerStage::Rendering;

        for ((out, &sample), &coeff) in self
            .scratch
            .iter_mut()
            .zip(self.samples.iter())
            .zip(self.window.iter())
        {
            *out = Complex::new(sample * coeff, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Single-sided amplitude: 2/N, with the Hann coherent gain of 0.5
        // folded in, so a full-scale sine reads ~0dBFS at its bin.
        let scale = 4.0 / FFT_SIZE as f32;
        let bin_hz = self.sample_rate / FFT_SIZE as f32;

        path.clear();
        for (i, bin) in self.scratch.iter().enumerate().take(FFT_SIZE / 2).skip(1) {
            let frequency = i as f32 * bin_hz;
            if frequency < MIN_FREQ_HZ || frequency > MAX_FREQ_HZ {
                continue;
            }
            let amplitude = bin.norm() * scale;
            let db = (20.0 * amplitude.max(1e-9).log10()).max(SPECTRUM_FLOOR_DB);
            path.push(PathPoint {
                x: display::frequency_to_x(frequency, width),
                y: display::db_to_y(db, SPECTRUM_FLOOR_DB, 0.0, height),
            });
        }

        self.stage = AnalyzerStage::Idle;
        true
    }

    /// Forget accumulated samples (stream restart)
    pub fn reset(&mut self) {
        self.samples.fill(0.0);
        self.filled = 0;
        self.stage = AnalyzerStage::Idle;
    }
}
