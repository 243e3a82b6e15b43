//! Parameter bridge between the control surface and the audio thread
//!
//! All parameter fields are individual atomics: the control side stores
//! new values at any time, the audio side reads a coherent-enough
//! snapshot once per block. Cross-field consistency is not required
//! (each field is clamped independently when snapshotted), so no lock is
//! needed anywhere on this path.
//!
//! Writers bump a change epoch after every store; readers compare the
//! epoch against the last one they consumed and skip the coefficient
//! rebuild entirely when nothing changed.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

use thelassic_dsp::{ChainSettings, Slope, MAX_FREQ_HZ, MIN_FREQ_HZ};

const MIN_Q: f32 = 0.1;
const MAX_Q: f32 = 10.0;
const MAX_GAIN_DB: f32 = 24.0;

/// f32 stored as its bit pattern in an AtomicU32
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Shared, lock-free parameter store for the three-band EQ.
///
/// One instance is shared (via `Arc`) between the control surface, the
/// audio engine and the response-curve driver.
pub struct EqParams {
    lo_cut_freq: AtomicF32,
    hi_cut_freq: AtomicF32,
    mid_freq: AtomicF32,
    mid_gain_db: AtomicF32,
    mid_q: AtomicF32,
    lo_cut_slope: AtomicU8,
    hi_cut_slope: AtomicU8,
    lo_cut_bypassed: AtomicBool,
    mid_bypassed: AtomicBool,
    hi_cut_bypassed: AtomicBool,
    analyzer_enabled: AtomicBool,

    /// Bumped on every audible parameter change. Starts at 1 so a
    /// consumer initialized with `last_epoch = 0` always refreshes once.
    epoch: AtomicU64,
}

impl Default for EqParams {
    fn default() -> Self {
        let defaults = ChainSettings::default();
        Self {
            lo_cut_freq: AtomicF32::new(defaults.lo_cut_freq),
            hi_cut_freq: AtomicF32::new(defaults.hi_cut_freq),
            mid_freq: AtomicF32::new(defaults.mid_freq),
            mid_gain_db: AtomicF32::new(defaults.mid_gain_db),
            mid_q: AtomicF32::new(defaults.mid_q),
            lo_cut_slope: AtomicU8::new(defaults.lo_cut_slope.index()),
            hi_cut_slope: AtomicU8::new(defaults.hi_cut_slope.index()),
            lo_cut_bypassed: AtomicBool::new(defaults.lo_cut_bypassed),
            mid_bypassed: AtomicBool::new(defaults.mid_bypassed),
            hi_cut_bypassed: AtomicBool::new(defaults.hi_cut_bypassed),
            analyzer_enabled: AtomicBool::new(true),
            epoch: AtomicU64::new(1),
        }
    }
}

impl EqParams {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self) {
        self.epoch.fetch_add(1, Ordering::Release);
    }

    /// Current change epoch; monotonically increasing
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn set_lo_cut_freq(&self, freq: f32) {
        self.lo_cut_freq.store(freq);
        self.bump();
    }

    pub fn set_hi_cut_freq(&self, freq: f32) {
        self.hi_cut_freq.store(freq);
        self.bump();
    }

    pub fn set_mid_freq(&self, freq: f32) {
        self.mid_freq.store(freq);
        self.bump();
    }

    pub fn set_mid_gain_db(&self, gain_db: f32) {
        self.mid_gain_db.store(gain_db);
        self.bump();
    }

    pub fn set_mid_q(&self, q: f32) {
        self.mid_q.store(q);
        self.bump();
    }

    pub fn set_lo_cut_slope(&self, slope: Slope) {
        self.lo_cut_slope.store(slope.index(), Ordering::Relaxed);
        self.bump();
    }

    pub fn set_hi_cut_slope(&self, slope: Slope) {
        self.hi_cut_slope.store(slope.index(), Ordering::Relaxed);
        self.bump();
    }

    pub fn set_lo_cut_bypassed(&self, bypassed: bool) {
        self.lo_cut_bypassed.store(bypassed, Ordering::Relaxed);
        self.bump();
    }

    pub fn set_mid_bypassed(&self, bypassed: bool) {
        self.mid_bypassed.store(bypassed, Ordering::Relaxed);
        self.bump();
    }

    pub fn set_hi_cut_bypassed(&self, bypassed: bool) {
        self.hi_cut_bypassed.store(bypassed, Ordering::Relaxed);
        self.bump();
    }

    /// The analyzer toggle is display-only; it does not touch the
    /// coefficient epoch.
    pub fn set_analyzer_enabled(&self, enabled: bool) {
        self.analyzer_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn analyzer_enabled(&self) -> bool {
        self.analyzer_enabled.load(Ordering::Relaxed)
    }

    /// Read every field once and clamp into the ranges the coefficient
    /// factory accepts. Out-of-range stores never reach the filters.
    pub fn snapshot(&self) -> ChainSettings {
        ChainSettings {
            lo_cut_freq: self.lo_cut_freq.load().clamp(MIN_FREQ_HZ, MAX_FREQ_HZ),
            hi_cut_freq: self.hi_cut_freq.load().clamp(MIN_FREQ_HZ, MAX_FREQ_HZ),
            mid_freq: self.mid_freq.load().clamp(MIN_FREQ_HZ, MAX_FREQ_HZ),
            mid_gain_db: self.mid_gain_db.load().clamp(-MAX_GAIN_DB, MAX_GAIN_DB),
            mid_q: self.mid_q.load().clamp(MIN_Q, MAX_Q),
            lo_cut_slope: Slope::from_index(self.lo_cut_slope.load(Ordering::Relaxed)),
            hi_cut_slope: Slope::from_index(self.hi_cut_slope.load(Ordering::Relaxed)),
            lo_cut_bypassed: self.lo_cut_bypassed.load(Ordering::Relaxed),
            mid_bypassed: self.mid_bypassed.load(Ordering::Relaxed),
            hi_cut_bypassed: self.hi_cut_bypassed.load(Ordering::Relaxed),
        }
    }
}
