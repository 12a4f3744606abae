//! Scalar float to s16 conversion.
//!
//! This is the reference every vector kernel is checked against.

use super::types::{S16_LIMIT, S16_SCALE};

/// convert one sample
///
/// | Input            | Output                         |
/// |------------------|--------------------------------|
/// | `x < -1.0`       | `-32767`                       |
/// | `-1.0..=1.0`     | `round(x * 32767)`, ties away  |
/// | `x > 1.0`, NaN   | `32767`                        |
///
/// NaN fails both comparisons and lands in the high branch. The vector kernels
/// reproduce that explicitly.
#[inline(always)]
pub fn convert_sample(x: f32) -> i16 {
    if x < -1.0 {
        -S16_LIMIT
    } else if x <= 1.0 {
        // |x * 32767| <= 32767 here, so the cast can't saturate
        (x * S16_SCALE).round() as i16
    } else {
        S16_LIMIT
    }
}

/// convert `src` into `dest` one sample at a time
///
/// Lengths must match; callers check.
#[inline]
pub fn convert_slice(dest: &mut [i16], src: &[f32]) {
    debug_assert_eq!(dest.len(), src.len());
    for (out, &x) in dest.iter_mut().zip(src) {
        *out = convert_sample(x);
    }
}

/// convert a left/right pair into interleaved `dest`
#[inline]
pub fn convert_stereo_slice(dest: &mut [i16], left: &[f32], right: &[f32]) {
    debug_assert_eq!(left.len(), right.len());
    debug_assert_eq!(dest.len(), left.len() * 2);
    for ((pair, &l), &r) in dest.chunks_exact_mut(2).zip(left).zip(right) {
        pair[0] = convert_sample(l);
        pair[1] = convert_sample(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scale() {
        assert_eq!(convert_sample(1.0), 32767);
        assert_eq!(convert_sample(-1.0), -32767);
        assert_eq!(convert_sample(0.0), 0);
        assert_eq!(convert_sample(-0.0), 0);
    }

    #[test]
    fn test_saturates_symmetric() {
        assert_eq!(convert_sample(1.5), 32767);
        assert_eq!(convert_sample(-1.5), -32767);
        assert_eq!(convert_sample(f32::MAX), 32767);
        assert_eq!(convert_sample(f32::MIN), -32767);
    }

    #[test]
    fn test_ties_round_away() {
        // inputs whose scaled value lands exactly on .5
        let cases = [
            (0x3780_0100u32, 0.5f32, 1i16),
            (0x38a0_0140, 2.5, 3),
            (0x3eff_fc00, 16382.5, 16383),
        ];
        for (bits, scaled, expected) in cases {
            let x = f32::from_bits(bits);
            assert_eq!(x * S16_SCALE, scaled);
            assert_eq!(convert_sample(x), expected);
            assert_eq!(convert_sample(-x), -expected);
        }
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(convert_sample(f32::NAN), 32767);
        assert_eq!(convert_sample(-f32::NAN), 32767);
        assert_eq!(convert_sample(f32::INFINITY), 32767);
        assert_eq!(convert_sample(f32::NEG_INFINITY), -32767);
    }
}
