//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug)]
pub enum DspError {
    #[error("frequency {frequency}Hz is outside (0, Nyquist) at sample rate {sample_rate}Hz")]
    InvalidFrequency { frequency: f32, sample_rate: f32 },

    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("Q must be positive, got {0}")]
    InvalidQ(f32),

    #[error("section index {0} out of range (must be 0-3)")]
    InvalidSectionIndex(usize),
}
