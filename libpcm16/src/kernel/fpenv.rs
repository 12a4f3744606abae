//! Floating-point environment handling for the vector kernels.
//!
//! The x86 kernels scale with `mulps`, which honours the MXCSR rounding field.
//! [`RoundingGuard`] pins that field to round-to-nearest for the duration of a
//! block loop and puts the caller's value back when dropped, so results match
//! the scalar path and the caller's environment is untouched afterwards.
//!
//! Other targets leave their control registers alone: NEON's `fcvtas` and the
//! wasm lane ops carry their own rounding rule.

// MXCSR access is deprecated in favour of not touching it at all
#![allow(deprecated)]

#[cfg(target_arch = "x86")]
use std::arch::x86::{_mm_getcsr, _mm_setcsr, _MM_ROUND_MASK, _MM_ROUND_NEAREST};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{_mm_getcsr, _mm_setcsr, _MM_ROUND_MASK, _MM_ROUND_NEAREST};

/// MXCSR bits 0-5 are sticky exception flags, not control state
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
const STATUS_FLAGS: u32 = 0x3f;

/// Saves the rounding mode on construction, restores it on drop.
///
/// Holds on every exit path, including unwinding out of the block loop.
#[must_use = "the rounding mode is restored when the guard is dropped"]
pub struct RoundingGuard {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    saved: u32,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl RoundingGuard {
    /// install round-to-nearest, remembering whatever was there
    #[inline]
    pub fn round_to_nearest() -> Self {
        // SAFETY: MXCSR is always present with sse, which every x86 kernel requires
        let saved = unsafe { _mm_getcsr() };
        let wanted = (saved & !_MM_ROUND_MASK) | _MM_ROUND_NEAREST;
        if wanted != saved {
            unsafe { _mm_setcsr(wanted) };
        }
        RoundingGuard { saved }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl Drop for RoundingGuard {
    #[inline]
    fn drop(&mut self) {
        unsafe {
            // keep whatever flags the conversion raised, put the controls back
            let current = _mm_getcsr();
            let restored = (current & STATUS_FLAGS) | (self.saved & !STATUS_FLAGS);
            if restored != current {
                _mm_setcsr(restored);
            }
        }
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
impl RoundingGuard {
    /// nothing to install on this target
    #[inline]
    pub fn round_to_nearest() -> Self {
        RoundingGuard {}
    }
}

/// Floating-point control state of the current thread.
///
/// MXCSR without its exception flags on x86 (rounding field, exception masks,
/// FTZ/DAZ), FPCR on aarch64, zero elsewhere. Only useful for comparing
/// before/after a call.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline]
pub fn control_word() -> u64 {
    unsafe { (_mm_getcsr() & !STATUS_FLAGS) as u64 }
}

#[cfg(target_arch = "aarch64")]
#[inline]
pub fn control_word() -> u64 {
    let fpcr: u64;
    // SAFETY: reading FPCR has no side effects
    unsafe {
        std::arch::asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
    }
    fpcr
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
pub fn control_word() -> u64 {
    0
}

/// Rounding direction field of the control word (x86 only).
///
/// Lets tests put the thread into a non-default mode and check it survives a
/// conversion call. The previous value is restored when the returned guard drops.
#[doc(hidden)]
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod x86_mode {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::{_mm_getcsr, _mm_setcsr, _MM_ROUND_MASK};
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::{_mm_getcsr, _mm_setcsr, _MM_ROUND_MASK};

    #[cfg(target_arch = "x86")]
    pub use std::arch::x86::{_MM_ROUND_DOWN, _MM_ROUND_TOWARD_ZERO, _MM_ROUND_UP};
    #[cfg(target_arch = "x86_64")]
    pub use std::arch::x86_64::{_MM_ROUND_DOWN, _MM_ROUND_TOWARD_ZERO, _MM_ROUND_UP};

    /// restores the previous MXCSR on drop
    pub struct ModeOverride {
        saved: u32,
    }

    /// install `mode` (one of the `_MM_ROUND_*` values)
    ///
    /// # Safety
    /// Floating-point code on this thread assumes round-to-nearest. Until the
    /// override drops, only run code that tolerates another rounding mode.
    pub unsafe fn set_rounding(mode: u32) -> ModeOverride {
        let saved = _mm_getcsr();
        _mm_setcsr((saved & !_MM_ROUND_MASK) | (mode & _MM_ROUND_MASK));
        ModeOverride { saved }
    }

    /// current rounding field
    pub fn rounding() -> u32 {
        unsafe { _mm_getcsr() & _MM_ROUND_MASK }
    }

    impl Drop for ModeOverride {
        fn drop(&mut self) {
            unsafe { _mm_setcsr(self.saved) };
        }
    }
}
