//! Engine Error Types

use thiserror::Error;

/// Errors that can occur in the EQ engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(u16),

    #[error("Invalid buffer size: {0}")]
    InvalidBufferSize(u32),

    #[error("DSP error: {0}")]
    DspError(#[from] thelassic_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidSampleRate(100);
        assert!(err.to_string().contains("100"));

        let err = EngineError::InvalidBufferSize(10);
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_error_from_dsp() {
        let dsp_err = thelassic_dsp::DspError::InvalidQ(-1.0);
        let engine_err: EngineError = dsp_err.into();
        assert!(matches!(engine_err, EngineError::DspError(_)));
    }
}
