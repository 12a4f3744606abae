//! Conversion straight out of symphonia decode buffers.
//!
//! Decoders built on symphonia hand back planar `AudioBuffer<f32>`s. These
//! helpers interleave them into a caller-owned s16 buffer without copying the
//! planes first.

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};

use crate::converter::Converter;
use crate::core::{PcmError, PcmResult};

/// number of s16 samples needed to hold `buf` interleaved
pub fn interleaved_len(buf: &AudioBuffer<f32>) -> usize {
    buf.frames() * buf.spec().channels.count()
}

/// Interleave a planar f32 buffer into `dest`.
///
/// `dest` must hold exactly [`interleaved_len`] samples.
pub fn convert_audio_buffer(
    converter: &Converter,
    dest: &mut [i16],
    buf: &AudioBuffer<f32>,
) -> PcmResult<()> {
    let planes = buf.planes();
    converter.try_convert_interleaved(dest, planes.planes())
}

/// Same as [`convert_audio_buffer`] for whatever sample type the decoder produced.
///
/// Only f32 output is accepted.
pub fn convert_audio_buffer_ref(
    converter: &Converter,
    dest: &mut [i16],
    buf: &AudioBufferRef<'_>,
) -> PcmResult<()> {
    match buf {
        AudioBufferRef::F32(b) => convert_audio_buffer(converter, dest, b),
        AudioBufferRef::F64(_) => Err(PcmError::UnsupportedSampleFormat("f64")),
        AudioBufferRef::S16(_) => Err(PcmError::UnsupportedSampleFormat("s16")),
        AudioBufferRef::S32(_) => Err(PcmError::UnsupportedSampleFormat("s32")),
        _ => Err(PcmError::UnsupportedSampleFormat("integer")),
    }
}
