//! Geometry-to-voice parameter mapping.
//!
//! Numeric contract: frequency is never produced as ≤0, NaN, or infinite.
//! Invalid inputs are clamped to the nearest valid bound, never raised as
//! errors.

use crate::audio::VoiceParams;
use crate::geometry::GeometryPoint;
use num_traits::Float;

/// Lowest frequency a voice may be mapped to (Hz).
pub const MIN_FREQUENCY_HZ: f32 = 20.0;

/// Highest frequency a voice may be mapped to (Hz).
pub const MAX_FREQUENCY_HZ: f32 = 20_000.0;

/// Clamp a value to [lo, hi]; non-finite inputs collapse to `lo`.
pub(crate) fn finite_clamp<T: Float>(value: T, lo: T, hi: T) -> T {
    if !value.is_finite() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Map a geometry point to voice parameters.
///
/// - Frequency: base frequency shifted by the point's vertical position,
///   `harmonic_depth` octaves at the cube extremes, clamped to the audible
///   band.
/// - Amplitude: louder toward the origin, clamped to [0, gain_level].
/// - Pan: the point's x position.
pub fn map_voice_params(
    point: &GeometryPoint,
    base_frequency: f32,
    gain_level: f32,
    harmonic_depth: u32,
) -> VoiceParams {
    let base = finite_clamp(base_frequency, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ);
    let gain = finite_clamp(gain_level, 0.0, 1.0);
    let depth = harmonic_depth.min(8) as f32;

    let z = finite_clamp(point.z, -1.0, 1.0);
    let frequency = finite_clamp(
        base * (z * depth * 0.5).exp2(),
        MIN_FREQUENCY_HZ,
        MAX_FREQUENCY_HZ,
    );

    // sqrt(3) is the largest radial distance inside the unit cube
    let radial = finite_clamp(point.radial_distance(), 0.0, 3.0_f32.sqrt());
    let amplitude = finite_clamp(gain * (1.0 - radial / 3.0_f32.sqrt()), 0.0, gain);

    let pan = finite_clamp(point.x, -1.0, 1.0);

    VoiceParams {
        frequency,
        amplitude,
        pan,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ScaleLayer;
    use test_case::test_case;

    fn point(x: f32, y: f32, z: f32) -> GeometryPoint {
        GeometryPoint {
            x,
            y,
            z,
            scale_level: ScaleLayer::Meso,
            index: 0,
        }
    }

    #[test]
    fn test_center_point_maps_to_base_frequency() {
        let params = map_voice_params(&point(0.0, 0.0, 0.0), 432.0, 0.8, 2);
        assert!((params.frequency - 432.0).abs() < 0.001);
        assert!((params.amplitude - 0.8).abs() < 0.001);
        assert_eq!(params.pan, 0.0);
    }

    #[test]
    fn test_vertical_position_shifts_octaves() {
        let up = map_voice_params(&point(0.0, 0.0, 1.0), 432.0, 0.8, 2);
        let down = map_voice_params(&point(0.0, 0.0, -1.0), 432.0, 0.8, 2);
        // depth 2 gives ±1 octave at the extremes
        assert!((up.frequency - 864.0).abs() < 0.1);
        assert!((down.frequency - 216.0).abs() < 0.1);
    }

    #[test_case(f32::NAN ; "nan base")]
    #[test_case(f32::INFINITY ; "infinite base")]
    #[test_case(-440.0 ; "negative base")]
    #[test_case(0.0 ; "zero base")]
    fn test_invalid_base_frequency_clamps(base: f32) {
        let params = map_voice_params(&point(0.0, 0.0, 0.0), base, 0.8, 2);
        assert!(params.frequency.is_finite());
        assert!(params.frequency >= MIN_FREQUENCY_HZ);
        assert!(params.frequency <= MAX_FREQUENCY_HZ);
    }

    #[test]
    fn test_invalid_geometry_degrades_gracefully() {
        let params = map_voice_params(&point(f32::NAN, f32::INFINITY, f32::NAN), 432.0, 0.8, 2);
        assert!(params.frequency.is_finite());
        assert!(params.frequency > 0.0);
        assert!(params.amplitude.is_finite());
        assert!((0.0..=0.8).contains(&params.amplitude));
        assert!((-1.0..=1.0).contains(&params.pan));
    }

    #[test]
    fn test_amplitude_never_exceeds_gain_level() {
        for gain in [0.0, 0.3, 1.0] {
            let params = map_voice_params(&point(0.1, -0.4, 0.9), 432.0, gain, 3);
            assert!(params.amplitude >= 0.0);
            assert!(params.amplitude <= gain + f32::EPSILON);
        }
    }

    #[test]
    fn test_pan_follows_x() {
        let left = map_voice_params(&point(-1.0, 0.0, 0.0), 432.0, 0.8, 2);
        let right = map_voice_params(&point(1.0, 0.0, 0.0), 432.0, 0.8, 2);
        assert_eq!(left.pan, -1.0);
        assert_eq!(right.pan, 1.0);
    }

    #[test]
    fn test_extreme_depth_stays_in_audible_band() {
        let params = map_voice_params(&point(0.0, 0.0, 1.0), 19_000.0, 0.8, 8);
        assert!(params.frequency <= MAX_FREQUENCY_HZ);

        let params = map_voice_params(&point(0.0, 0.0, -1.0), 21.0, 0.8, 8);
        assert!(params.frequency >= MIN_FREQUENCY_HZ);
    }
}
