//! 2D Positional Audio
//!
//! Linear distance attenuation and horizontal stereo panning for sounds
//! placed in the world, relative to a single listener.
//!
//! # Overview
//!
//! - **Distance factor**: `max(0, 1 - distance / max_distance)`
//! - **Pan**: horizontal offset divided by `max_distance`, clamped to [-1, 1]
//! - **Equal-power gains**: the rodio backend turns a pan into per-channel
//!   gains so a centered sound keeps its loudness
//!
//! # Example
//!
//! ```
//! use skirmish_common::WorldPoint;
//! use skirmish_kernel::audio_spatial::SpatialParams;
//!
//! let params = SpatialParams::compute(WorldPoint::new(0, 0), WorldPoint::new(600, 0), 1200.0);
//! assert!((params.attenuation - 0.5).abs() < 1e-6);
//! assert!((params.pan - 0.5).abs() < 1e-6);
//! ```

use std::f32::consts::FRAC_PI_4;

use skirmish_common::WorldPoint;

/// Default maximum hearing distance in world pixels.
pub const DEFAULT_MAX_DISTANCE: f32 = 1200.0;

/// Default volume below which a positional sound is dropped.
pub const MIN_AUDIBLE_VOLUME: f32 = 0.05;

/// Linear attenuation for a source `distance` away.
///
/// Returns 0 at or beyond `max_distance`.
#[must_use]
pub fn distance_factor(distance: f32, max_distance: f32) -> f32 {
    if max_distance <= 0.0 || distance >= max_distance {
        return 0.0;
    }
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

/// Stereo pan for a horizontal offset `dx` (source minus listener).
#[must_use]
pub fn stereo_pan(dx: f32, max_distance: f32) -> f32 {
    if max_distance <= 0.0 {
        return 0.0;
    }
    (dx / max_distance).clamp(-1.0, 1.0)
}

/// Equal-power (left, right) gains for a pan in [-1, 1].
#[must_use]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

/// Attenuation and pan for one positioned source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialParams {
    /// Distance factor (0.0-1.0).
    pub attenuation: f32,
    /// Stereo pan (-1.0-1.0).
    pub pan: f32,
}

impl SpatialParams {
    /// Computes the parameters for `source` heard from `listener`.
    #[must_use]
    pub fn compute(listener: WorldPoint, source: WorldPoint, max_distance: f32) -> Self {
        let distance = listener.distance_to(source);
        let (dx, _) = listener.delta_to(source);
        Self {
            attenuation: distance_factor(distance, max_distance),
            pan: stereo_pan(dx as f32, max_distance),
        }
    }

    /// Whether the source can be heard at all.
    #[must_use]
    pub fn in_range(&self) -> bool {
        self.attenuation > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_factor_linear() {
        assert_eq!(distance_factor(0.0, 1200.0), 1.0);
        assert!((distance_factor(300.0, 1200.0) - 0.75).abs() < 1e-6);
        assert_eq!(distance_factor(1200.0, 1200.0), 0.0);
        assert_eq!(distance_factor(5000.0, 1200.0), 0.0);
        assert_eq!(distance_factor(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_pan_clamped() {
        assert_eq!(stereo_pan(-2400.0, 1200.0), -1.0);
        assert_eq!(stereo_pan(2400.0, 1200.0), 1.0);
        assert_eq!(stereo_pan(0.0, 1200.0), 0.0);
    }

    #[test]
    fn test_equal_power_gains() {
        let (l, r) = pan_gains(0.0);
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-5);

        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn test_source_behind_max_distance() {
        let params = SpatialParams::compute(WorldPoint::new(0, 0), WorldPoint::new(0, 1500), 1200.0);
        assert!(!params.in_range());
        assert_eq!(params.pan, 0.0);
    }

    #[test]
    fn test_extreme_coordinates_do_not_wrap() {
        let params = SpatialParams::compute(WorldPoint::new(-1, 0), WorldPoint::new(i32::MAX, 0), 1200.0);
        assert!(!params.in_range());
        assert_eq!(params.pan, 1.0);

        let params = SpatialParams::compute(WorldPoint::new(i32::MAX, 0), WorldPoint::new(i32::MIN, 0), 1200.0);
        assert!(!params.in_range());
        assert_eq!(params.pan, -1.0);
    }
}
