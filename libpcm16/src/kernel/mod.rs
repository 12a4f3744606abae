//! Vector kernels and runtime selection.
//!
//! Each kernel converts whole blocks and leaves the tail to
//! [`scalar`](crate::core::scalar), which doubles as the reference the others
//! are tested against.
//!
//! | Kernel    | Target                     | Detection                        |
//! |-----------|----------------------------|----------------------------------|
//! | Scalar    | any                        | always                           |
//! | Sse2      | x86, x86_64                | `is_x86_feature_detected!`       |
//! | Avx2      | x86, x86_64                | `is_x86_feature_detected!`       |
//! | Neon      | aarch64                    | `is_aarch64_feature_detected!`   |
//! | Simd128   | wasm32 built with simd128  | compile time                     |

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::scalar;
use crate::core::PcmError;

pub mod fpenv;

use fpenv::RoundingGuard;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
mod wasm;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

/// conversion kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Scalar,
    Sse2,
    Avx2,
    Neon,
    Simd128,
}

/// best kernel for this cpu, detected once
static DETECTED: OnceLock<Kernel> = OnceLock::new();

impl Kernel {
    /// every kernel, slowest first
    pub const ALL: [Kernel; 5] = [
        Kernel::Scalar,
        Kernel::Sse2,
        Kernel::Avx2,
        Kernel::Neon,
        Kernel::Simd128,
    ];

    /// lowercase name, also what `FromStr` accepts
    pub fn name(self) -> &'static str {
        match self {
            Kernel::Scalar => "scalar",
            Kernel::Sse2 => "sse2",
            Kernel::Avx2 => "avx2",
            Kernel::Neon => "neon",
            Kernel::Simd128 => "simd128",
        }
    }

    /// can this cpu run it?
    pub fn is_supported(self) -> bool {
        match self {
            Kernel::Scalar => true,
            Kernel::Sse2 => has_sse2(),
            Kernel::Avx2 => has_avx2(),
            Kernel::Neon => has_neon(),
            Kernel::Simd128 => cfg!(all(target_arch = "wasm32", target_feature = "simd128")),
        }
    }

    /// kernels this cpu can run, slowest first
    pub fn supported() -> impl Iterator<Item = Kernel> {
        Self::ALL.into_iter().filter(|k| k.is_supported())
    }

    /// fastest supported kernel
    ///
    /// Detection runs once per process; later calls read the cached result.
    pub fn detect() -> Kernel {
        *DETECTED.get_or_init(|| {
            let kernel = Self::supported().last().unwrap_or(Kernel::Scalar);
            tracing::debug!(kernel = kernel.name(), "selected pcm16 conversion kernel");
            kernel
        })
    }

    /// Convert `src` into `dest` sample for sample.
    ///
    /// Blocks and tail both run under one [`RoundingGuard`], so every kernel
    /// gives the same output whatever rounding mode the caller left installed.
    ///
    /// # Panics
    /// If the lengths differ or the kernel isn't supported on this cpu.
    pub fn convert(self, dest: &mut [i16], src: &[f32]) {
        let _guard = RoundingGuard::round_to_nearest();
        self.convert_unguarded(dest, src);
    }

    /// [`convert`](Self::convert) for callers already holding a guard
    pub(crate) fn convert_unguarded(self, dest: &mut [i16], src: &[f32]) {
        assert_eq!(
            dest.len(),
            src.len(),
            "destination and source lengths differ"
        );
        self.assert_supported();

        let done = self.convert_blocks(dest, src);
        scalar::convert_slice(&mut dest[done..], &src[done..]);
    }

    /// Convert a left/right pair into interleaved `dest`.
    ///
    /// # Panics
    /// If `left` and `right` differ in length, `dest` isn't twice as long, or
    /// the kernel isn't supported on this cpu.
    pub fn convert_stereo(self, dest: &mut [i16], left: &[f32], right: &[f32]) {
        assert_eq!(left.len(), right.len(), "left and right lengths differ");
        assert_eq!(
            dest.len(),
            left.len() * 2,
            "destination must hold two samples per frame"
        );
        self.assert_supported();

        let _guard = RoundingGuard::round_to_nearest();
        let done = self.convert_stereo_blocks(dest, left, right);
        scalar::convert_stereo_slice(&mut dest[done * 2..], &left[done..], &right[done..]);
    }

    fn assert_supported(self) {
        assert!(
            self.is_supported(),
            "kernel '{}' is not supported on this cpu",
            self
        );
    }

    // whole blocks only, returns samples written
    #[allow(unused_variables)]
    fn convert_blocks(self, dest: &mut [i16], src: &[f32]) -> usize {
        match self {
            // SAFETY for every arm: support was checked and dest.len() == src.len()
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Kernel::Sse2 => unsafe { x86::convert_sse2(dest, src) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Kernel::Avx2 => unsafe { x86::convert_avx2(dest, src) },
            #[cfg(target_arch = "aarch64")]
            Kernel::Neon => unsafe { neon::convert(dest, src) },
            #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
            Kernel::Simd128 => unsafe { wasm::convert(dest, src) },
            _ => 0,
        }
    }

    // whole blocks only, returns frames written
    #[allow(unused_variables)]
    fn convert_stereo_blocks(self, dest: &mut [i16], left: &[f32], right: &[f32]) -> usize {
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Kernel::Sse2 => unsafe { x86::convert_stereo_sse2(dest, left, right) },
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Kernel::Avx2 => unsafe { x86::convert_stereo_avx2(dest, left, right) },
            #[cfg(target_arch = "aarch64")]
            Kernel::Neon => unsafe { neon::convert_stereo(dest, left, right) },
            #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
            Kernel::Simd128 => unsafe { wasm::convert_stereo(dest, left, right) },
            _ => 0,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = PcmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PcmError::UnknownKernel(s.to_string()))
    }
}

// feature probes

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_sse2() -> bool {
    is_x86_feature_detected!("sse2")
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn has_avx2() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn has_sse2() -> bool {
    false
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn has_avx2() -> bool {
    false
}

#[cfg(target_arch = "aarch64")]
fn has_neon() -> bool {
    std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(target_arch = "aarch64"))]
fn has_neon() -> bool {
    false
}
