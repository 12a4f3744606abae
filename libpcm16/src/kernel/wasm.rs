//! simd128 kernels, only built when the wasm target enables simd128.
//!
//! Same recipe as the x86 kernels: `i32x4.trunc_sat_f32x4` truncates, so the
//! magnitude is truncated and bumped where the fraction is at least one half.

use std::arch::wasm32::*;

use crate::core::types::{BLOCK_WIDTH, S16_SCALE};

#[inline]
#[target_feature(enable = "simd128")]
unsafe fn round_lanes(x: v128) -> v128 {
    let limit = f32x4_splat(S16_SCALE);

    let scaled = f32x4_mul(x, limit);
    let ordered = f32x4_eq(x, x);
    let sign = v128_and(v128_and(scaled, f32x4_splat(-0.0)), ordered);
    let mag = f32x4_abs(scaled);
    // pmin(a, b) is `b < a ? b : a`, NaN keeps the limit
    let mag = f32x4_pmin(limit, mag);

    let whole = f32x4_trunc(mag);
    let bump = v128_and(
        f32x4_ge(f32x4_sub(mag, whole), f32x4_splat(0.5)),
        f32x4_splat(1.0),
    );
    let rounded = v128_or(f32x4_add(whole, bump), sign);
    i32x4_trunc_sat_f32x4(rounded)
}

/// Convert whole blocks of `src`, returns how many samples were written.
///
/// # Safety
/// Requires `dest.len() >= src.len()`.
#[target_feature(enable = "simd128")]
pub unsafe fn convert(dest: &mut [i16], src: &[f32]) -> usize {
    let blocks = src.len() / BLOCK_WIDTH;
    let in_ptr = src.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * BLOCK_WIDTH;
        let lo = round_lanes(v128_load(in_ptr.add(i) as *const v128));
        let hi = round_lanes(v128_load(in_ptr.add(i + 4) as *const v128));
        v128_store(out_ptr.add(i) as *mut v128, i16x8_narrow_i32x4(lo, hi));
    }

    blocks * BLOCK_WIDTH
}

/// Interleave whole blocks of `left`/`right`, returns frames written.
///
/// # Safety
/// Requires `left.len() == right.len()` and `dest.len() >= 2 * left.len()`.
#[target_feature(enable = "simd128")]
pub unsafe fn convert_stereo(dest: &mut [i16], left: &[f32], right: &[f32]) -> usize {
    const FRAMES: usize = BLOCK_WIDTH / 2;
    let blocks = left.len() / FRAMES;
    let l_ptr = left.as_ptr();
    let r_ptr = right.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * FRAMES;
        let l = round_lanes(v128_load(l_ptr.add(i) as *const v128));
        let r = round_lanes(v128_load(r_ptr.add(i) as *const v128));
        let first = i32x4_shuffle::<0, 4, 1, 5>(l, r);
        let second = i32x4_shuffle::<2, 6, 3, 7>(l, r);
        v128_store(
            out_ptr.add(i * 2) as *mut v128,
            i16x8_narrow_i32x4(first, second),
        );
    }

    blocks * FRAMES
}
