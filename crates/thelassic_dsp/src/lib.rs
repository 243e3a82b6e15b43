//! Thelassic DSP - Signal Processing Core
//!
//! This crate provides the real-time core of the Thelassic three-band
//! equalizer:
//! - Coefficient factory mapping a settings snapshot to per-band biquads
//!   (parametric mid peak plus Butterworth-derived cut cascades)
//! - Cascaded filter chain (LoCut -> Mid -> HiCut), one per channel
//! - Lock-free SPSC block FIFO carrying processed audio to the analyzer
//! - FFT magnitude path generation for the live spectral view
//! - Analytic response-curve evaluation for the static overlay
//!
//! # Architecture
//!
//! The processing path follows a strict "no allocation, no locks in the
//! audio callback" rule: coefficients are recomputed at most once per
//! block and hot-swapped in place, and the only cross-thread handoff on
//! the audio side is the FIFO's cursor protocol.

mod chain;
mod coefficients;
mod display;
mod error;
mod fifo;
mod response;
mod settings;
mod spectrum;

pub use chain::{Band, FilterChain};
pub use coefficients::{
    make_chain_update, make_hi_cut, make_lo_cut, make_mid_band, BandUpdate, ChainUpdate,
    IDENTITY_COEFFICIENTS, MAX_CUT_SECTIONS,
};
pub use display::{
    db_to_y, frequency_to_x, x_to_frequency, MagnitudePath, PathPoint, SharedPath,
    RESPONSE_MAX_DB, RESPONSE_MIN_DB, SPECTRUM_FLOOR_DB,
};
pub use error::DspError;
pub use fifo::{FifoConsumer, FifoProducer, SpectrumFifo};
pub use response::{section_magnitude, ResponseCurveEvaluator};
pub use settings::{ChainSettings, Slope, MAX_FREQ_HZ, MIN_FREQ_HZ};
pub use spectrum::{AnalyzerStage, FftPathGenerator, FFT_SIZE};

// Re-export the coefficient type appearing in the public API.
pub use biquad::Coefficients;
