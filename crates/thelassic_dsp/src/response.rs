//! Analytic frequency response of the filter chain
//!
//! Evaluates each section's transfer function directly on the same
//! coefficient representation the chain runs, so the static overlay
//! matches the runtime behavior exactly. Independent of audio: purely a
//! function of coefficients.

use biquad::Coefficients;
use rustfft::num_complex::Complex;

use crate::coefficients::ChainUpdate;
use crate::display::{self, MagnitudePath, PathPoint, RESPONSE_MAX_DB, RESPONSE_MIN_DB};

/// Magnitude of one 2nd-order section at `frequency`:
/// |H(e^jw)| with H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)
pub fn section_magnitude(coeffs: &Coefficients<f32>, frequency: f32, sample_rate: f32) -> f32 {
    let omega = 2.0 * std::f32::consts::PI * frequency / sample_rate;
    let z1 = Complex::from_polar(1.0, -omega);
    let z2 = z1 * z1;

    let numerator = Complex::new(coeffs.b0, 0.0) + z1 * coeffs.b1 + z2 * coeffs.b2;
    let denominator = Complex::new(1.0, 0.0) + z1 * coeffs.a1 + z2 * coeffs.a2;
    (numerator / denominator).norm()
}

/// Computes the chain's combined magnitude response for the overlay.
///
/// Owns a private copy of the chain's coefficient sets, replaced
/// wholesale via [`set_chain`](Self::set_chain) whenever the settings
/// epoch changes. Bypassed bands and inactive sections contribute unity.
pub struct ResponseCurveEvaluator {
    update: ChainUpdate,
    sample_rate: f32,
}

impl ResponseCurveEvaluator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            update: ChainUpdate::identity(),
            sample_rate,
        }
    }

    /// Replace the evaluated coefficient sets in one swap
    pub fn set_chain(&mut self, update: ChainUpdate) {
        self.update = update;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Combined linear magnitude of all active, non-bypassed sections
    pub fn magnitude_at(&self, frequency: f32) -> f32 {
        let mut magnitude = 1.0;

        if !self.update.lo_cut_bypassed {
            for coeffs in self.update.lo_cut.sections.iter().take(self.update.lo_cut.active) {
                magnitude *= section_magnitude(coeffs, frequency, self.sample_rate);
            }
        }
        if !self.update.mid_bypassed {
            magnitude *= section_magnitude(&self.update.mid, frequency, self.sample_rate);
        }
        if !self.update.hi_cut_bypassed {
            for coeffs in self.update.hi_cut.sections.iter().take(self.update.hi_cut.active) {
                magnitude *= section_magnitude(coeffs, frequency, self.sample_rate);
            }
        }

        magnitude
    }

    pub fn magnitude_db_at(&self, frequency: f32) -> f32 {
        20.0 * self.magnitude_at(frequency).max(1e-9).log10()
    }

    /// Rebuild `path` as `points` evenly log-spaced vertices over
    /// 20 Hz - 20 kHz, mapped to the +/-24 dB display range.
    pub fn render_into(&self, width: f32, height: f32, points: usize, path: &mut MagnitudePath) {
        path.clear();
        if points < 2 {
            return;
        }

        for i in 0..points {
            let x = width * i as f32 / (points - 1) as f32;
            let frequency = display::x_to_frequency(x, width);
            let db = self.magnitude_db_at(frequency);
            path.push(PathPoint {
                x,
                y: display::db_to_y(db, RESPONSE_MIN_DB, RESPONSE_MAX_DB, height),
            });
        }
    }
}
