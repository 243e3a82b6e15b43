//! Coefficient factory
//!
//! Pure functions mapping a [`ChainSettings`] snapshot plus a sample rate
//! to biquad coefficient sets for each band. Based on the RBJ (Robert
//! Bristow-Johnson) Audio EQ Cookbook via the `biquad` crate; the cut
//! bands cascade 2nd-order sections with Butterworth-derived Q values so
//! the combined response approximates a single higher-order Butterworth
//! filter.
//!
//! Called once per block at most; no allocation.

use biquad::{Coefficients, ToHertz, Type};

use crate::error::DspError;
use crate::settings::{ChainSettings, Slope};

/// Maximum number of 2nd-order sections a cut band can cascade (48 dB/oct)
pub const MAX_CUT_SECTIONS: usize = 4;

/// Unity-gain passthrough coefficients, used for inactive section slots
pub const IDENTITY_COEFFICIENTS: Coefficients<f32> = Coefficients {
    a1: 0.0,
    a2: 0.0,
    b0: 1.0,
    b1: 0.0,
    b2: 0.0,
};

/// Coefficient sets for one cut band: up to four 2nd-order sections, of
/// which only the first `active` take part in processing.
#[derive(Debug, Clone, Copy)]
pub struct BandUpdate {
    pub sections: [Coefficients<f32>; MAX_CUT_SECTIONS],
    pub active: usize,
}

impl BandUpdate {
    /// A fully inactive band (identity pass)
    pub fn identity() -> Self {
        Self {
            sections: [IDENTITY_COEFFICIENTS; MAX_CUT_SECTIONS],
            active: 0,
        }
    }
}

/// One complete factory output: coefficients plus bypass flags for the
/// whole chain, applied to both channels in a single hot-swap.
#[derive(Debug, Clone, Copy)]
pub struct ChainUpdate {
    pub lo_cut: BandUpdate,
    pub mid: Coefficients<f32>,
    pub hi_cut: BandUpdate,
    pub lo_cut_bypassed: bool,
    pub mid_bypassed: bool,
    pub hi_cut_bypassed: bool,
}

impl ChainUpdate {
    /// A chain that passes audio through untouched
    pub fn identity() -> Self {
        Self {
            lo_cut: BandUpdate::identity(),
            mid: IDENTITY_COEFFICIENTS,
            hi_cut: BandUpdate::identity(),
            lo_cut_bypassed: false,
            mid_bypassed: false,
            hi_cut_bypassed: false,
        }
    }
}

fn validate(frequency: f32, sample_rate: f32) -> Result<(), DspError> {
    if !(sample_rate > 0.0) {
        return Err(DspError::InvalidSampleRate(sample_rate));
    }
    if frequency <= 0.0 || frequency >= sample_rate / 2.0 {
        return Err(DspError::InvalidFrequency {
            frequency,
            sample_rate,
        });
    }
    Ok(())
}

/// Q for section `k` of an `n`-section Butterworth cascade (order 2n).
///
/// Classic even-order decomposition: the poles of a 2n-order Butterworth
/// filter sit at angles theta_k = pi * (2k + 1) / (4n), and each
/// conjugate pair maps to one biquad with Q = 1 / (2 cos theta_k).
fn butterworth_q(k: usize, n: usize) -> f32 {
    let theta = std::f32::consts::PI * (2 * k + 1) as f32 / (4.0 * n as f32);
    1.0 / (2.0 * theta.cos())
}

/// Parametric peak/notch coefficients for the Mid band.
///
/// Peak magnitude at the center frequency is 10^(gain_db / 20).
pub fn make_mid_band(
    settings: &ChainSettings,
    sample_rate: f32,
) -> Result<Coefficients<f32>, DspError> {
    validate(settings.mid_freq, sample_rate)?;
    if settings.mid_q <= 0.0 {
        return Err(DspError::InvalidQ(settings.mid_q));
    }

    Coefficients::<f32>::from_params(
        Type::PeakingEQ(settings.mid_gain_db),
        sample_rate.hz(),
        settings.mid_freq.hz(),
        settings.mid_q,
    )
    .map_err(|_| DspError::InvalidFrequency {
        frequency: settings.mid_freq,
        sample_rate,
    })
}

fn make_cut_band(
    kind: Type<f32>,
    frequency: f32,
    slope: Slope,
    sample_rate: f32,
) -> Result<BandUpdate, DspError> {
    validate(frequency, sample_rate)?;

    let active = slope.sections();
    let mut sections = [IDENTITY_COEFFICIENTS; MAX_CUT_SECTIONS];

    for (k, slot) in sections.iter_mut().take(active).enumerate() {
        let q = butterworth_q(k, active);
        *slot = Coefficients::<f32>::from_params(kind, sample_rate.hz(), frequency.hz(), q)
            .map_err(|_| DspError::InvalidFrequency {
                frequency,
                sample_rate,
            })?;
    }

    Ok(BandUpdate { sections, active })
}

/// High-pass cascade removing content below the lo-cut frequency
pub fn make_lo_cut(settings: &ChainSettings, sample_rate: f32) -> Result<BandUpdate, DspError> {
    make_cut_band(
        Type::HighPass,
        settings.lo_cut_freq,
        settings.lo_cut_slope,
        sample_rate,
    )
}

/// Low-pass cascade removing content above the hi-cut frequency
pub fn make_hi_cut(settings: &ChainSettings, sample_rate: f32) -> Result<BandUpdate, DspError> {
    make_cut_band(
        Type::LowPass,
        settings.hi_cut_freq,
        settings.hi_cut_slope,
        sample_rate,
    )
}

/// Compute coefficient sets for the whole chain in one call
pub fn make_chain_update(
    settings: &ChainSettings,
    sample_rate: f32,
) -> Result<ChainUpdate, DspError> {
    Ok(ChainUpdate {
        lo_cut: make_lo_cut(settings, sample_rate)?,
        mid: make_mid_band(settings, sample_rate)?,
        hi_cut: make_hi_cut(settings, sample_rate)?,
        lo_cut_bypassed: settings.lo_cut_bypassed,
        mid_bypassed: settings.mid_bypassed,
        hi_cut_bypassed: settings.hi_cut_bypassed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::section_magnitude;
    use crate::settings::Slope;

    const SAMPLE_RATE: f32 = 48000.0;

    fn cascade_magnitude(band: &BandUpdate, frequency: f32) -> f32 {
        band.sections
            .iter()
            .take(band.active)
            .map(|coeffs| section_magnitude(coeffs, frequency, SAMPLE_RATE))
            .product()
    }

    fn db(magnitude: f32) -> f32 {
        20.0 * magnitude.log10()
    }

    #[test]
    fn test_identity_coefficients_are_transparent() {
        for freq in [20.0, 440.0, 1000.0, 10000.0] {
            let mag = section_magnitude(&IDENTITY_COEFFICIENTS, freq, SAMPLE_RATE);
            assert!((mag - 1.0).abs() < 1e-6, "identity not flat at {freq}Hz");
        }
    }

    #[test]
    fn test_mid_band_peak_gain_at_center() {
        let settings = ChainSettings {
            mid_freq: 1000.0,
            mid_gain_db: 12.0,
            mid_q: 1.0,
            ..Default::default()
        };
        let coeffs = make_mid_band(&settings, SAMPLE_RATE).unwrap();
        let peak_db = db(section_magnitude(&coeffs, 1000.0, SAMPLE_RATE));
        assert!(
            (peak_db - 12.0).abs() < 0.5,
            "peak gain {peak_db}dB should be ~12dB"
        );
    }

    #[test]
    fn test_mid_band_unity_far_from_center() {
        let settings = ChainSettings {
            mid_freq: 1000.0,
            mid_gain_db: 12.0,
            mid_q: 2.0,
            ..Default::default()
        };
        let coeffs = make_mid_band(&settings, SAMPLE_RATE).unwrap();
        let far_db = db(section_magnitude(&coeffs, 40.0, SAMPLE_RATE));
        assert!(far_db.abs() < 1.0, "response {far_db}dB should be ~0dB at 40Hz");
    }

    #[test]
    fn test_cut_at_minus_3db_at_cutoff() {
        // A Butterworth cascade of any order is 3dB down at the cutoff.
        for slope in [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48] {
            let settings = ChainSettings {
                lo_cut_freq: 500.0,
                lo_cut_slope: slope,
                ..Default::default()
            };
            let band = make_lo_cut(&settings, SAMPLE_RATE).unwrap();
            let cutoff_db = db(cascade_magnitude(&band, 500.0));
            assert!(
                (cutoff_db + 3.0).abs() < 0.3,
                "{slope:?}: {cutoff_db}dB at cutoff, expected -3dB"
            );
        }
    }

    #[test]
    fn test_steeper_slope_attenuates_more() {
        // One octave below a 1kHz lo-cut, steeper slopes must attenuate
        // strictly more.
        let mut previous = f32::INFINITY;
        for slope in [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48] {
            let settings = ChainSettings {
                lo_cut_freq: 1000.0,
                lo_cut_slope: slope,
                ..Default::default()
            };
            let band = make_lo_cut(&settings, SAMPLE_RATE).unwrap();
            let mag = cascade_magnitude(&band, 500.0);
            assert!(
                mag < previous,
                "{slope:?} should attenuate more than the previous slope"
            );
            previous = mag;
        }
    }

    #[test]
    fn test_cut_slope_matches_db_per_octave() {
        // Two octaves into the stopband the per-octave rate is close to
        // the nominal figure.
        for slope in [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48] {
            let settings = ChainSettings {
                lo_cut_freq: 2000.0,
                lo_cut_slope: slope,
                ..Default::default()
            };
            let band = make_lo_cut(&settings, SAMPLE_RATE).unwrap();
            let octave_down = db(cascade_magnitude(&band, 500.0));
            let two_octaves_down = db(cascade_magnitude(&band, 250.0));
            let rate = octave_down - two_octaves_down;
            let nominal = slope.db_per_octave() as f32;
            assert!(
                (rate - nominal).abs() < nominal * 0.15 + 1.0,
                "{slope:?}: measured {rate}dB/oct, nominal {nominal}dB/oct"
            );
        }
    }

    #[test]
    fn test_stable_at_dc_and_nyquist() {
        let settings = ChainSettings {
            lo_cut_freq: 100.0,
            hi_cut_freq: 10000.0,
            mid_gain_db: 24.0,
            lo_cut_slope: Slope::Db48,
            hi_cut_slope: Slope::Db48,
            ..Default::default()
        };
        let update = make_chain_update(&settings, SAMPLE_RATE).unwrap();
        for coeffs in update
            .lo_cut
            .sections
            .iter()
            .chain(update.hi_cut.sections.iter())
            .chain(std::iter::once(&update.mid))
        {
            for freq in [1.0, SAMPLE_RATE / 2.0 - 1.0] {
                let mag = section_magnitude(coeffs, freq, SAMPLE_RATE);
                assert!(mag.is_finite() && mag < 100.0, "unstable at {freq}Hz");
            }
        }
    }

    #[test]
    fn test_frequency_at_nyquist_rejected() {
        let settings = ChainSettings {
            mid_freq: SAMPLE_RATE / 2.0,
            ..Default::default()
        };
        assert!(matches!(
            make_mid_band(&settings, SAMPLE_RATE),
            Err(DspError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn test_nonpositive_frequency_rejected() {
        let settings = ChainSettings {
            lo_cut_freq: 0.0,
            ..Default::default()
        };
        assert!(make_lo_cut(&settings, SAMPLE_RATE).is_err());

        let settings = ChainSettings {
            lo_cut_freq: -20.0,
            ..Default::default()
        };
        assert!(make_lo_cut(&settings, SAMPLE_RATE).is_err());
    }

    #[test]
    fn test_invalid_sample_rate_rejected() {
        let settings = ChainSettings::default();
        assert!(matches!(
            make_chain_update(&settings, 0.0),
            Err(DspError::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn test_nonpositive_q_rejected() {
        let settings = ChainSettings {
            mid_q: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            make_mid_band(&settings, SAMPLE_RATE),
            Err(DspError::InvalidQ(_))
        ));
    }

    #[test]
    fn test_inactive_sections_are_identity() {
        let settings = ChainSettings {
            lo_cut_slope: Slope::Db24,
            ..Default::default()
        };
        let band = make_lo_cut(&settings, SAMPLE_RATE).unwrap();
        assert_eq!(band.active, 2);
        for coeffs in &band.sections[2..] {
            let mag = section_magnitude(coeffs, 1000.0, SAMPLE_RATE);
            assert!((mag - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_chain_update_carries_bypass_flags() {
        let settings = ChainSettings {
            mid_bypassed: true,
            hi_cut_bypassed: true,
            ..Default::default()
        };
        let update = make_chain_update(&settings, SAMPLE_RATE).unwrap();
        assert!(!update.lo_cut_bypassed);
        assert!(update.mid_bypassed);
        assert!(update.hi_cut_bypassed);
    }
}
