//! Cascaded three-band filter chain
//!
//! One [`FilterChain`] instance per audio channel, owned and driven only
//! by the audio thread. Bands run in a fixed order (LoCut -> Mid ->
//! HiCut); each cut band is a runtime array of up to four 2nd-order
//! sections with an explicit active count.
//!
//! Coefficient swaps go through the biquad library's
//! `update_coefficients`, which leaves the 2-sample delay state in place
//! so smooth parameter sweeps stay click-free. Large discontinuous jumps
//! pay a brief transient instead.

use biquad::{Biquad, Coefficients, DirectForm2Transposed};

use crate::coefficients::{BandUpdate, ChainUpdate, IDENTITY_COEFFICIENTS, MAX_CUT_SECTIONS};
use crate::error::DspError;

/// Position of a band in the processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    LoCut,
    Mid,
    HiCut,
}

/// A cut band: cascade of 2nd-order sections plus per-band bypass.
/// Sections with index >= `active` are implicitly bypassed.
struct CutBand {
    sections: [DirectForm2Transposed<f32>; MAX_CUT_SECTIONS],
    active: usize,
    bypassed: bool,
}

impl CutBand {
    fn new() -> Self {
        Self {
            sections: core::array::from_fn(|_| {
                DirectForm2Transposed::<f32>::new(IDENTITY_COEFFICIENTS)
            }),
            active: 0,
            bypassed: false,
        }
    }

    fn apply(&mut self, update: &BandUpdate) {
        for (section, coeffs) in self.sections.iter_mut().zip(update.sections.iter()) {
            section.update_coefficients(*coeffs);
        }
        self.active = update.active.min(MAX_CUT_SECTIONS);
    }

    #[inline]
    fn process(&mut self, block: &mut [f32]) {
        if self.bypassed {
            return;
        }
        for section in self.sections.iter_mut().take(self.active) {
            for sample in block.iter_mut() {
                *sample = section.run(*sample);
            }
        }
    }

    fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset_state();
        }
    }
}

/// The parametric mid band: exactly one section
struct MidBand {
    section: DirectForm2Transposed<f32>,
    bypassed: bool,
}

impl MidBand {
    fn new() -> Self {
        Self {
            section: DirectForm2Transposed::<f32>::new(IDENTITY_COEFFICIENTS),
            bypassed: false,
        }
    }

    #[inline]
    fn process(&mut self, block: &mut [f32]) {
        if self.bypassed {
            return;
        }
        for sample in block.iter_mut() {
            *sample = self.section.run(*sample);
        }
    }
}

/// Ordered triple of bands processing one channel in place.
///
/// # Real-time Safety
/// `process()` performs no allocations and no syscalls; time is
/// O(samples * active sections).
pub struct FilterChain {
    lo_cut: CutBand,
    mid: MidBand,
    hi_cut: CutBand,
}

impl FilterChain {
    /// Create a chain that passes audio through untouched
    pub fn new() -> Self {
        Self {
            lo_cut: CutBand::new(),
            mid: MidBand::new(),
            hi_cut: CutBand::new(),
        }
    }

    /// Replace one section's coefficients without resetting its delay state
    pub fn set_section_coefficients(
        &mut self,
        band: Band,
        index: usize,
        coeffs: Coefficients<f32>,
    ) -> Result<(), DspError> {
        match band {
            Band::Mid => {
                if index != 0 {
                    return Err(DspError::InvalidSectionIndex(index));
                }
                self.mid.section.update_coefficients(coeffs);
            }
            Band::LoCut | Band::HiCut => {
                if index >= MAX_CUT_SECTIONS {
                    return Err(DspError::InvalidSectionIndex(index));
                }
                let cut = match band {
                    Band::LoCut => &mut self.lo_cut,
                    _ => &mut self.hi_cut,
                };
                cut.sections[index].update_coefficients(coeffs);
            }
        }
        Ok(())
    }

    /// Bypass or re-enable a whole band (identity pass while bypassed)
    pub fn set_band_bypassed(&mut self, band: Band, bypassed: bool) {
        match band {
            Band::LoCut => self.lo_cut.bypassed = bypassed,
            Band::Mid => self.mid.bypassed = bypassed,
            Band::HiCut => self.hi_cut.bypassed = bypassed,
        }
    }

    pub fn is_band_bypassed(&self, band: Band) -> bool {
        match band {
            Band::LoCut => self.lo_cut.bypassed,
            Band::Mid => self.mid.bypassed,
            Band::HiCut => self.hi_cut.bypassed,
        }
    }

    /// Hot-swap a complete factory output: coefficients, active section
    /// counts and bypass flags. Delay-line state is preserved.
    pub fn apply_update(&mut self, update: &ChainUpdate) {
        self.lo_cut.apply(&update.lo_cut);
        self.mid.section.update_coefficients(update.mid);
        self.hi_cut.apply(&update.hi_cut);
        self.lo_cut.bypassed = update.lo_cut_bypassed;
        self.mid.bypassed = update.mid_bypassed;
        self.hi_cut.bypassed = update.hi_cut_bypassed;
    }

    /// Process one channel's block in place, LoCut -> Mid -> HiCut.
    ///
    /// # Real-time Safety
    /// No allocations, no locks, no syscalls. Safe in the audio callback.
    #[inline]
    pub fn process(&mut self, block: &mut [f32]) {
        self.lo_cut.process(block);
        self.mid.process(block);
        self.hi_cut.process(block);
    }

    /// Clear all delay lines. Call when the sample rate or block size
    /// changes, or when the stream restarts.
    pub fn reset(&mut self) {
        self.lo_cut.reset();
        self.mid.section.reset_state();
        self.hi_cut.reset();
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::make_chain_update;
    use crate::settings::{ChainSettings, Slope};

    const SAMPLE_RATE: f32 = 48000.0;

    fn impulse(len: usize) -> Vec<f32> {
        let mut block = vec![0.0; len];
        block[0] = 1.0;
        block
    }

    #[test]
    fn test_new_chain_is_identity() {
        let mut chain = FilterChain::new();
        let mut block = impulse(64);
        chain.process(&mut block);
        assert_eq!(block[0], 1.0);
        assert!(block[1..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_bypassed_band_is_identity() {
        let settings = ChainSettings {
            lo_cut_freq: 1000.0,
            lo_cut_slope: Slope::Db48,
            mid_bypassed: true,
            hi_cut_bypassed: true,
            ..Default::default()
        };
        let update = make_chain_update(&settings, SAMPLE_RATE).unwrap();

        let mut chain = FilterChain::new();
        chain.apply_update(&update);
        chain.set_band_bypassed(Band::LoCut, true);

        // Every band bypassed: a unit impulse must pass through untouched.
        let mut block = impulse(128);
        chain.process(&mut block);
        assert_eq!(block[0], 1.0);
        assert!(block[1..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_active_band_shapes_impulse() {
        let settings = ChainSettings {
            lo_cut_freq: 1000.0,
            mid_bypassed: true,
            hi_cut_bypassed: true,
            ..Default::default()
        };
        let update = make_chain_update(&settings, SAMPLE_RATE).unwrap();

        let mut chain = FilterChain::new();
        chain.apply_update(&update);

        let mut block = impulse(128);
        chain.process(&mut block);
        // A high-pass at 1kHz must leave a non-trivial impulse response.
        assert_ne!(block[0], 1.0);
        assert!(block.iter().any(|&s| s != 0.0 && s.is_finite()));
    }

    #[test]
    fn test_inactive_sections_skipped() {
        // Same cutoff, 12dB vs 48dB: the extra sections must change the
        // output, proving the active count gates processing.
        let mut shallow = FilterChain::new();
        let mut steep = FilterChain::new();

        let base = ChainSettings {
            lo_cut_freq: 2000.0,
            mid_bypassed: true,
            hi_cut_bypassed: true,
            ..Default::default()
        };
        let steep_settings = ChainSettings {
            lo_cut_slope: Slope::Db48,
            ..base
        };
        shallow.apply_update(&make_chain_update(&base, SAMPLE_RATE).unwrap());
        steep.apply_update(&make_chain_update(&steep_settings, SAMPLE_RATE).unwrap());

        let mut a = impulse(256);
        let mut b = impulse(256);
        shallow.process(&mut a);
        steep.process(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_coefficient_swap_preserves_state() {
        let settings = ChainSettings {
            lo_cut_freq: 500.0,
            mid_bypassed: true,
            hi_cut_bypassed: true,
            ..Default::default()
        };
        let update = make_chain_update(&settings, SAMPLE_RATE).unwrap();

        let mut chain = FilterChain::new();
        chain.apply_update(&update);

        // Run a steady signal through, then nudge the cutoff. The output
        // right after the swap must stay continuous (no full-scale click).
        let mut block = vec![0.5; 512];
        chain.process(&mut block);
        let before = block[511];

        let nudged = ChainSettings {
            lo_cut_freq: 510.0,
            ..settings
        };
        chain.apply_update(&make_chain_update(&nudged, SAMPLE_RATE).unwrap());

        let mut block = vec![0.5; 8];
        chain.process(&mut block);
        assert!(
            (block[0] - before).abs() < 0.05,
            "swap produced a click: {} -> {}",
            before,
            block[0]
        );
    }

    #[test]
    fn test_reset_clears_ringing() {
        let settings = ChainSettings {
            lo_cut_freq: 1000.0,
            lo_cut_slope: Slope::Db48,
            mid_bypassed: true,
            hi_cut_bypassed: true,
            ..Default::default()
        };
        let mut chain = FilterChain::new();
        chain.apply_update(&make_chain_update(&settings, SAMPLE_RATE).unwrap());

        let mut block = vec![1.0; 64];
        chain.process(&mut block);
        chain.reset();

        // After a reset, silence in means silence out.
        let mut silence = vec![0.0; 64];
        chain.process(&mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_set_section_coefficients_bounds() {
        let mut chain = FilterChain::new();
        assert!(chain
            .set_section_coefficients(Band::Mid, 1, IDENTITY_COEFFICIENTS)
            .is_err());
        assert!(chain
            .set_section_coefficients(Band::LoCut, MAX_CUT_SECTIONS, IDENTITY_COEFFICIENTS)
            .is_err());
        assert!(chain
            .set_section_coefficients(Band::HiCut, 3, IDENTITY_COEFFICIENTS)
            .is_ok());
    }

    #[test]
    fn test_output_stays_finite() {
        let settings = ChainSettings {
            lo_cut_freq: 80.0,
            hi_cut_freq: 12000.0,
            mid_gain_db: 24.0,
            mid_q: 10.0,
            lo_cut_slope: Slope::Db48,
            hi_cut_slope: Slope::Db48,
            ..Default::default()
        };
        let mut chain = FilterChain::new();
        chain.apply_update(&make_chain_update(&settings, SAMPLE_RATE).unwrap());

        let mut block: Vec<f32> = (0..4096).map(|i| (i as f32 * 0.1).sin()).collect();
        chain.process(&mut block);
        assert!(block.iter().all(|s| s.is_finite()));
    }
}
