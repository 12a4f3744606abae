//! SSE2 and AVX2 kernels.
//!
//! Both follow the same lane recipe: scale, split off the sign, clamp the
//! magnitude, round it half away from zero, put the sign back, then narrow.
//! `cvttps2dq` only truncates, so rounding is done by truncating and adding one
//! wherever the dropped fraction is at least one half. Below 2^23 both the
//! truncation and the fraction are exact, which keeps every lane identical to
//! the scalar path. The caller holds the rounding guard for the whole call.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::core::types::{BLOCK_WIDTH, S16_SCALE};

// sse2

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn round_lanes_sse2(x: __m128) -> __m128i {
    let sign_mask = _mm_set1_ps(-0.0);
    let limit = _mm_set1_ps(S16_SCALE);

    let scaled = _mm_mul_ps(x, _mm_set1_ps(S16_SCALE));
    // unordered lanes lose their sign so NaN saturates high
    let ordered = _mm_cmpord_ps(x, x);
    let sign = _mm_and_ps(_mm_and_ps(scaled, sign_mask), ordered);
    let mag = _mm_andnot_ps(sign_mask, scaled);
    // minps hands back the second operand for NaN
    let mag = _mm_min_ps(mag, limit);

    let whole = _mm_cvtepi32_ps(_mm_cvttps_epi32(mag));
    let frac = _mm_sub_ps(mag, whole);
    let bump = _mm_and_ps(_mm_cmpge_ps(frac, _mm_set1_ps(0.5)), _mm_set1_ps(1.0));
    let rounded = _mm_or_ps(_mm_add_ps(whole, bump), sign);

    // already integral, truncation is exact
    _mm_cvttps_epi32(rounded)
}

/// Convert whole blocks of `src`, returns how many samples were written.
///
/// # Safety
/// Requires sse2 and `dest.len() >= src.len()`.
#[target_feature(enable = "sse2")]
pub unsafe fn convert_sse2(dest: &mut [i16], src: &[f32]) -> usize {
    let blocks = src.len() / BLOCK_WIDTH;
    let in_ptr = src.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * BLOCK_WIDTH;
        let lo = round_lanes_sse2(_mm_loadu_ps(in_ptr.add(i)));
        let hi = round_lanes_sse2(_mm_loadu_ps(in_ptr.add(i + 4)));
        _mm_storeu_si128(out_ptr.add(i) as *mut __m128i, _mm_packs_epi32(lo, hi));
    }

    blocks * BLOCK_WIDTH
}

/// Interleave whole blocks of `left`/`right`, returns frames written.
///
/// # Safety
/// Requires sse2, `left.len() == right.len()` and `dest.len() >= 2 * left.len()`.
#[target_feature(enable = "sse2")]
pub unsafe fn convert_stereo_sse2(dest: &mut [i16], left: &[f32], right: &[f32]) -> usize {
    const FRAMES: usize = BLOCK_WIDTH / 2;
    let blocks = left.len() / FRAMES;
    let l_ptr = left.as_ptr();
    let r_ptr = right.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * FRAMES;
        let l = round_lanes_sse2(_mm_loadu_ps(l_ptr.add(i)));
        let r = round_lanes_sse2(_mm_loadu_ps(r_ptr.add(i)));
        // l0 r0 l1 r1 | l2 r2 l3 r3
        let first = _mm_unpacklo_epi32(l, r);
        let second = _mm_unpackhi_epi32(l, r);
        _mm_storeu_si128(
            out_ptr.add(i * 2) as *mut __m128i,
            _mm_packs_epi32(first, second),
        );
    }

    blocks * FRAMES
}

// avx2

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn round_lanes_avx2(x: __m256) -> __m256i {
    let sign_mask = _mm256_set1_ps(-0.0);
    let limit = _mm256_set1_ps(S16_SCALE);

    let scaled = _mm256_mul_ps(x, _mm256_set1_ps(S16_SCALE));
    let ordered = _mm256_cmp_ps::<_CMP_ORD_Q>(x, x);
    let sign = _mm256_and_ps(_mm256_and_ps(scaled, sign_mask), ordered);
    let mag = _mm256_andnot_ps(sign_mask, scaled);
    let mag = _mm256_min_ps(mag, limit);

    let whole = _mm256_cvtepi32_ps(_mm256_cvttps_epi32(mag));
    let frac = _mm256_sub_ps(mag, whole);
    let bump = _mm256_and_ps(
        _mm256_cmp_ps::<_CMP_GE_OQ>(frac, _mm256_set1_ps(0.5)),
        _mm256_set1_ps(1.0),
    );
    let rounded = _mm256_or_ps(_mm256_add_ps(whole, bump), sign);

    _mm256_cvttps_epi32(rounded)
}

/// AVX2 flavour of [`convert_sse2`], one 256-bit load per block.
///
/// # Safety
/// Requires avx2 and `dest.len() >= src.len()`.
#[target_feature(enable = "avx2")]
pub unsafe fn convert_avx2(dest: &mut [i16], src: &[f32]) -> usize {
    let blocks = src.len() / BLOCK_WIDTH;
    let in_ptr = src.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * BLOCK_WIDTH;
        let v = round_lanes_avx2(_mm256_loadu_ps(in_ptr.add(i)));
        let lo = _mm256_castsi256_si128(v);
        let hi = _mm256_extracti128_si256::<1>(v);
        _mm_storeu_si128(out_ptr.add(i) as *mut __m128i, _mm_packs_epi32(lo, hi));
    }

    blocks * BLOCK_WIDTH
}

/// AVX2 stereo, eight frames per iteration.
///
/// The in-lane unpack/pack pair already lands the frames in order, so no
/// cross-lane permute is needed.
///
/// # Safety
/// Requires avx2, `left.len() == right.len()` and `dest.len() >= 2 * left.len()`.
#[target_feature(enable = "avx2")]
pub unsafe fn convert_stereo_avx2(dest: &mut [i16], left: &[f32], right: &[f32]) -> usize {
    const FRAMES: usize = BLOCK_WIDTH;
    let blocks = left.len() / FRAMES;
    let l_ptr = left.as_ptr();
    let r_ptr = right.as_ptr();
    let out_ptr = dest.as_mut_ptr();

    for block in 0..blocks {
        let i = block * FRAMES;
        let l = round_lanes_avx2(_mm256_loadu_ps(l_ptr.add(i)));
        let r = round_lanes_avx2(_mm256_loadu_ps(r_ptr.add(i)));
        // per 128-bit lane: l0 r0 l1 r1 | l2 r2 l3 r3
        let first = _mm256_unpacklo_epi32(l, r);
        let second = _mm256_unpackhi_epi32(l, r);
        _mm256_storeu_si256(
            out_ptr.add(i * 2) as *mut __m256i,
            _mm256_packs_epi32(first, second),
        );
    }

    blocks * FRAMES
}
