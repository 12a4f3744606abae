//! Channel interleaving on top of the kernels.
//!
//! Output layout is `dest[frame * channels + ch] = convert(src[ch][frame])`.
//! Stereo goes through the kernels' paired path, which zips left and right
//! before narrowing. Other channel counts convert each channel in chunks into a
//! stack buffer and scatter it into its strided slots.

use crate::core::{PcmError, PcmResult};
use crate::kernel::fpenv::RoundingGuard;
use crate::kernel::Kernel;

/// frames converted per scratch round trip
const SCRATCH_FRAMES: usize = 256;

/// Check an interleave request and return the frame count.
pub fn check_interleaved<S: AsRef<[f32]>>(dest_len: usize, src: &[S]) -> PcmResult<usize> {
    let Some(first) = src.first() else {
        return Err(PcmError::NoChannels);
    };
    let frames = first.as_ref().len();

    for (channel, samples) in src.iter().enumerate().skip(1) {
        let actual = samples.as_ref().len();
        if actual != frames {
            return Err(PcmError::ChannelLengthMismatch {
                channel,
                expected: frames,
                actual,
            });
        }
    }

    let expected = frames * src.len();
    if dest_len != expected {
        return Err(PcmError::LengthMismatch {
            expected,
            actual: dest_len,
        });
    }

    Ok(frames)
}

/// Check a stereo request and return the frame count.
pub fn check_stereo(dest_len: usize, left: &[f32], right: &[f32]) -> PcmResult<usize> {
    check_interleaved(dest_len, &[left, right])
}

/// Interleave any number of channels. Sizes must already be checked.
pub(crate) fn interleave<S: AsRef<[f32]>>(kernel: Kernel, dest: &mut [i16], src: &[S]) {
    match src {
        [mono] => kernel.convert(dest, mono.as_ref()),
        [left, right] => kernel.convert_stereo(dest, left.as_ref(), right.as_ref()),
        _ => interleave_strided(kernel, dest, src),
    }
}

fn interleave_strided<S: AsRef<[f32]>>(kernel: Kernel, dest: &mut [i16], src: &[S]) {
    let channels = src.len();
    let mut scratch = [0i16; SCRATCH_FRAMES];
    // one save/restore for every chunk of every channel
    let _guard = RoundingGuard::round_to_nearest();

    for (ch, samples) in src.iter().enumerate() {
        for (chunk_index, chunk) in samples.as_ref().chunks(SCRATCH_FRAMES).enumerate() {
            let converted = &mut scratch[..chunk.len()];
            kernel.convert_unguarded(converted, chunk);

            let start = chunk_index * SCRATCH_FRAMES * channels + ch;
            for (slot, &value) in dest[start..]
                .iter_mut()
                .step_by(channels)
                .zip(converted.iter())
            {
                *slot = value;
            }
        }
    }
}
