//! Chain settings snapshot
//!
//! A [`ChainSettings`] is built fresh once per processed block from the
//! raw parameter store and never mutated afterwards - the whole value is
//! replaced on the next block.

/// Lower edge of the audible range handled by the EQ (Hz)
pub const MIN_FREQ_HZ: f32 = 20.0;

/// Upper edge of the audible range handled by the EQ (Hz)
pub const MAX_FREQ_HZ: f32 = 20_000.0;

/// Cut-band slope, encoded as the number of cascaded 2nd-order sections.
///
/// Each section contributes 12 dB/octave, so the four variants cover
/// 12/24/36/48 dB per octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slope {
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    /// Number of active 2nd-order sections for this slope
    pub const fn sections(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
            Slope::Db48 => 4,
        }
    }

    /// Total attenuation rate in dB per octave
    pub const fn db_per_octave(self) -> u32 {
        12 * self.sections() as u32
    }

    /// Discrete selector index as stored by the parameter store (0-3).
    /// Out-of-range values clamp to the steepest slope.
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Slope::Db12,
            1 => Slope::Db24,
            2 => Slope::Db36,
            _ => Slope::Db48,
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            Slope::Db12 => 0,
            Slope::Db24 => 1,
            Slope::Db36 => 2,
            Slope::Db48 => 3,
        }
    }
}

/// One atomically-consistent-enough view of the EQ parameters.
///
/// Invariants (enforced by the snapshot bridge before construction):
/// frequencies are clamped to [20 Hz, 20 kHz], Q is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub lo_cut_freq: f32,
    pub hi_cut_freq: f32,
    pub mid_freq: f32,
    pub mid_gain_db: f32,
    pub mid_q: f32,
    pub lo_cut_slope: Slope,
    pub hi_cut_slope: Slope,
    pub lo_cut_bypassed: bool,
    pub mid_bypassed: bool,
    pub hi_cut_bypassed: bool,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            lo_cut_freq: MIN_FREQ_HZ,
            hi_cut_freq: MAX_FREQ_HZ,
            mid_freq: 1000.0,
            mid_gain_db: 0.0,
            mid_q: 1.0,
            lo_cut_slope: Slope::Db12,
            hi_cut_slope: Slope::Db12,
            lo_cut_bypassed: false,
            mid_bypassed: false,
            hi_cut_bypassed: false,
        }
    }
}
