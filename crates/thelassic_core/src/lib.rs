//! Thelassic Core - EQ Engine
//!
//! Ties the DSP core into a runnable processor:
//! - [`EqParams`]: lock-free parameter bridge shared between threads
//! - [`EqEngine`]: per-stream stereo processor for the audio callback
//! - [`SpectrumPipeline`] / [`ResponseCurveDriver`]: display-rate
//!   pollers publishing renderable paths
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Control / UI Thread                   │
//! │   sliders ──stores──▶ EqParams ◀──snapshot── overlay     │
//! └──────────────────────────────────────────────────────────┘
//!                 │ atomics + epoch
//!                 ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Audio Thread                        │
//! │   block ──▶ EqEngine (FilterChain x2) ──FIFO──▶          │
//! │              (Zero allocation in this path)              │
//! └──────────────────────────────────────────────────────────┘
//!                 │ SPSC FIFO
//!                 ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Analysis Thread                       │
//! │   SpectrumPipeline ──▶ SharedPath ◀── ResponseCurveDriver│
//! └──────────────────────────────────────────────────────────┘
//! ```

mod analyzer;
mod config;
mod engine;
mod error;
mod params;

pub use analyzer::{ResponseCurveDriver, SpectrumPipeline};
pub use config::StreamConfig;
pub use engine::{EqEngine, DISPLAY_REFRESH_HZ};
pub use error::{EngineError, EngineResult};
pub use params::EqParams;

// Re-export DSP types for convenience
pub use thelassic_dsp::{
    ChainSettings, FifoConsumer, MagnitudePath, PathPoint, SharedPath, Slope, FFT_SIZE,
    MAX_FREQ_HZ, MIN_FREQ_HZ,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify public API is accessible
        let _config = StreamConfig::default();
        let _params = EqParams::new();
    }
}
