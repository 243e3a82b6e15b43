//! Display-coordinate mapping
//!
//! The live spectrum and the static response curve share one pixel
//! coordinate space: logarithmic frequency over 20 Hz - 20 kHz on the x
//! axis, linear decibels on the y axis (0 at the top).

use std::sync::Arc;

use parking_lot::RwLock;

use crate::settings::{MAX_FREQ_HZ, MIN_FREQ_HZ};

/// Floor for the live spectrum's decibel scale
pub const SPECTRUM_FLOOR_DB: f32 = -48.0;

/// Display range of the static response curve
pub const RESPONSE_MIN_DB: f32 = -24.0;
pub const RESPONSE_MAX_DB: f32 = 24.0;

/// One vertex of a magnitude polyline, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
}

/// A renderable frequency-magnitude curve. Regenerated wholesale every
/// display frame; transient, owned by the analysis/UI side.
pub type MagnitudePath = Vec<PathPoint>;

/// Map a frequency to an x pixel on the shared log scale
pub fn frequency_to_x(frequency: f32, width: f32) -> f32 {
    let span = (MAX_FREQ_HZ / MIN_FREQ_HZ).log10();
    width * (frequency / MIN_FREQ_HZ).log10() / span
}

/// Inverse of [`frequency_to_x`]
pub fn x_to_frequency(x: f32, width: f32) -> f32 {
    let span = (MAX_FREQ_HZ / MIN_FREQ_HZ).log10();
    MIN_FREQ_HZ * 10.0_f32.powf(span * x / width)
}

/// Map a dB value to a y pixel; `max_db` lands at y = 0 (top edge).
/// Values outside the range clamp to the edges.
pub fn db_to_y(db: f32, min_db: f32, max_db: f32, height: f32) -> f32 {
    let t = ((db - min_db) / (max_db - min_db)).clamp(0.0, 1.0);
    height * (1.0 - t)
}

/// Shared cell holding the most recently published path.
///
/// The writer swaps the whole path in under a short write lock, so a
/// reader observes either the previous path or the fully-formed new one,
/// never a partially built one. Both sides live on non-real-time threads.
#[derive(Clone, Default)]
pub struct SharedPath {
    inner: Arc<RwLock<MagnitudePath>>,
}

impl SharedPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published path with `path`, handing the previous
    /// buffer back through the same slot for reuse.
    pub fn publish(&self, path: &mut MagnitudePath) {
        let mut guard = self.inner.write();
        std::mem::swap(&mut *guard, path);
    }

    /// Clone of the current path (display-side convenience)
    pub fn snapshot(&self) -> MagnitudePath {
        self.inner.read().clone()
    }

    /// Read the current path without cloning
    pub fn with<R>(&self, f: impl FnOnce(&MagnitudePath) -> R) -> R {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_axis_endpoints() {
        assert!((frequency_to_x(MIN_FREQ_HZ, 800.0)).abs() < 1e-3);
        assert!((frequency_to_x(MAX_FREQ_HZ, 800.0) - 800.0).abs() < 1e-2);
    }

    #[test]
    fn test_frequency_axis_roundtrip() {
        for freq in [20.0, 100.0, 440.0, 1000.0, 9500.0, 20000.0] {
            let x = frequency_to_x(freq, 1024.0);
            let back = x_to_frequency(x, 1024.0);
            assert!(
                (back - freq).abs() / freq < 1e-4,
                "roundtrip {freq} -> {back}"
            );
        }
    }

    #[test]
    fn test_log_scale_midpoint() {
        // Geometric center of 20Hz-20kHz is ~632Hz, which must land at
        // the middle of the axis.
        let x = frequency_to_x(632.45, 1000.0);
        assert!((x - 500.0).abs() < 1.0);
    }

    #[test]
    fn test_db_axis_orientation() {
        // Top of the range is y=0, bottom is y=height.
        assert_eq!(db_to_y(24.0, -24.0, 24.0, 400.0), 0.0);
        assert_eq!(db_to_y(-24.0, -24.0, 24.0, 400.0), 400.0);
        assert_eq!(db_to_y(0.0, -24.0, 24.0, 400.0), 200.0);
    }

    #[test]
    fn test_db_axis_clamps() {
        assert_eq!(db_to_y(100.0, -24.0, 24.0, 400.0), 0.0);
        assert_eq!(db_to_y(-100.0, -24.0, 24.0, 400.0), 400.0);
    }

    #[test]
    fn test_shared_path_publish_swaps() {
        let shared = SharedPath::new();
        let mut path = vec![PathPoint { x: 1.0, y: 2.0 }];
        shared.publish(&mut path);

        // The old (empty) path came back for reuse.
        assert!(path.is_empty());
        assert_eq!(shared.snapshot().len(), 1);

        let mut next = vec![PathPoint { x: 3.0, y: 4.0 }, PathPoint { x: 5.0, y: 6.0 }];
        shared.publish(&mut next);
        assert_eq!(next.len(), 1, "previous path returned");
        shared.with(|p| assert_eq!(p.len(), 2));
    }
}
