//! Raw acceleration → 8-bit color channel.

use crate::Color;
use crate::config::DeviceRange;
use crate::sensor::{RawSample, Sample};

/// Map a raw reading to an intensity in `[0, 255]`.
///
/// The value is clamped to `[-max_magnitude, max_magnitude]`, normalized to
/// `[0.0, 1.0]` over the full symmetric span and rounded to the nearest
/// step. `-max_magnitude` maps to 0, `max_magnitude` to 255, and anything
/// outside the range saturates instead of wrapping.
///
/// A `max_magnitude` of zero is treated as one.
pub fn scale(value: RawSample, max_magnitude: u32) -> u8 {
    let max = i64::from(max_magnitude.max(1));
    let clamped = i64::from(value).clamp(-max, max);

    let magnitude = (clamped + max) as f64 / (2 * max) as f64;
    (magnitude * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Scale a whole sample into a color: x → red, y → green, z → blue.
pub fn scale_sample(sample: Sample, range: DeviceRange) -> Color {
    let max = range.max_magnitude();
    Color::new(
        scale(sample.x, max),
        scale(sample.y, max),
        scale(sample.z, max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FullScale;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const M: u32 = 32768;

    #[rstest]
    #[case(-32768, 0)]
    #[case(32768, 255)]
    #[case(-40000, 0)]
    #[case(40000, 255)]
    #[case(16384, 191)]
    #[case(-16384, 64)]
    fn scales_known_points(#[case] value: i32, #[case] expected: u8) {
        assert_eq!(scale(value, M), expected);
    }

    #[test]
    fn zero_is_midpoint() {
        let mid = scale(0, M);
        assert!(mid == 127 || mid == 128, "midpoint was {mid}");
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(255)]
    #[case(20000)]
    #[case(32768)]
    fn endpoints_hold_for_any_range(#[case] max: u32) {
        let m = max as i32;
        assert_eq!(scale(-m, max), 0);
        assert_eq!(scale(m, max), 255);
    }

    #[test]
    fn monotonic_over_full_range() {
        let mut previous = scale(-(M as i32), M);
        for v in -(M as i32)..=(M as i32) {
            let current = scale(v, M);
            assert!(current >= previous, "scale({v}) = {current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn out_of_range_equals_clamped() {
        for v in [i32::MIN, -1_000_000, -32769, 32769, 1_000_000, i32::MAX] {
            let clamped = v.clamp(-(M as i32), M as i32);
            assert_eq!(scale(v, M), scale(clamped, M), "value {v}");
        }
    }

    #[test]
    fn huge_max_magnitude_does_not_overflow() {
        assert_eq!(scale(i32::MIN, u32::MAX), 64);
        assert_eq!(scale(i32::MAX, u32::MAX), 191);
        assert_eq!(scale(0, u32::MAX), 128);
    }

    #[test]
    fn zero_max_magnitude_saturates() {
        assert_eq!(scale(-5, 0), 0);
        assert_eq!(scale(0, 0), 128);
        assert_eq!(scale(5, 0), 255);
    }

    #[test]
    fn sample_maps_axes_to_channels() {
        let sample = Sample {
            x: -32768,
            y: 0,
            z: 32768,
        };
        let color = scale_sample(sample, FullScale::G2.into());
        assert_eq!(color, Color::new(0, 128, 255));
    }

    #[test]
    fn sample_uses_device_range() {
        let range = DeviceRange::new(10000, 2).unwrap();
        let sample = Sample {
            x: 20000,
            y: -20000,
            z: 25000,
        };
        assert_eq!(scale_sample(sample, range), Color::new(255, 0, 255));
    }
}
