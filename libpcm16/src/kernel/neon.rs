//! NEON kernels for aarch64.
//!
//! `fcvtas` rounds to nearest with ties away from zero, which is exactly the
//! scalar rule, so no truncation fix-up is needed here.

use std::arch::aarch64::*;

use crate::core::types::{BLOCK_WIDTH, S16_SCALE};

#[inline]
#[target_feature(enable = "neon")]
unsafe fn round_lanes(x: float32x4_t) -> int32x4_t {
    let scaled = vmulq_n_f32(x, S16_SCALE);
    // NaN != NaN, so unordered lanes drop their sign
    let ordered = vceqq_f32(x, x);
    let sign = vandq_u32(
        vandq_u32(vreinterpretq_u32_f32(scaled), vdupq_n_u32(0x8000_0000)),
        ordered,
    );
    let mag = vabsq_f32(scaled);
    // fminnm returns the number when the other side is NaN
    let mag = vminnmq_f32(mag, vdupq_n_f32(S16_SCALE));
    let signed = vreinterpretq_f32_u32(vorrq_u32(vreinterpretq_u32_f32(mag), sign));
    vcvtaq_s32_f32(signed)
}

/// Convert whole blocks of `src`, returns how many samples were written.
///
/// # Safety
/// Requires neon and `dest.len() >= src.len()`.
#[target_feature(enable = "neon")]
pub unsafe fn convert(dest: &mut [i16], src: &[f32]) -> usize {
    let blocks = src.len() / BLOCK_WIDTH;
    let in_ptr = src.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * BLOCK_WIDTH;
        let lo = round_lanes(vld1q_f32(in_ptr.add(i)));
        let hi = round_lanes(vld1q_f32(in_ptr.add(i + 4)));
        vst1q_s16(out_ptr.add(i), vcombine_s16(vqmovn_s32(lo), vqmovn_s32(hi)));
    }

    blocks * BLOCK_WIDTH
}

/// Interleave whole blocks of `left`/`right`, returns frames written.
///
/// # Safety
/// Requires neon, `left.len() == right.len()` and `dest.len() >= 2 * left.len()`.
#[target_feature(enable = "neon")]
pub unsafe fn convert_stereo(dest: &mut [i16], left: &[f32], right: &[f32]) -> usize {
    const FRAMES: usize = BLOCK_WIDTH / 2;
    let blocks = left.len() / FRAMES;
    let l_ptr = left.as_ptr();
    let r_ptr = right.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * FRAMES;
        let l = round_lanes(vld1q_f32(l_ptr.add(i)));
        let r = round_lanes(vld1q_f32(r_ptr.add(i)));
        let zipped = vzipq_s32(l, r);
        vst1q_s16(
            out_ptr.add(i * 2),
            vcombine_s16(vqmovn_s32(zipped.0), vqmovn_s32(zipped.1)),
        );
    }

    blocks * FRAMES
}
