//! Interleaving layout and stereo fast path tests
use libpcm16_audio::{
    convert_interleaved, convert_interleaved_stereo, convert_mono, Converter, Kernel,
};

fn test_signal(frames: usize, seed: usize) -> Vec<f32> {
    (0..frames)
        .map(|i| ((i * 31 + seed * 17) as f32 * 0.011).sin() * 1.2)
        .collect()
}

// convert each channel alone and scatter by hand
fn scattered(src: &[Vec<f32>]) -> Vec<i16> {
    let channels = src.len();
    let frames = src[0].len();
    let mut out = vec![0i16; channels * frames];
    for (ch, samples) in src.iter().enumerate() {
        let mut mono = vec![0i16; frames];
        convert_mono(&mut mono, samples);
        for (frame, value) in mono.into_iter().enumerate() {
            out[frame * channels + ch] = value;
        }
    }
    out
}

// ============================================================================
// Concrete cases
// ============================================================================

#[test]
fn test_stereo_saturating_frames() {
    let left = [0.0f32, 2.0];
    let right = [0.0f32, 2.0];
    let mut out = [0i16; 4];
    convert_interleaved_stereo(&mut out, &left, &right);
    assert_eq!(out, [0, 0, 32767, 32767]);

    let mut generic = [0i16; 4];
    convert_interleaved(&mut generic, &[&left[..], &right[..]]);
    assert_eq!(generic, out);
}

#[test]
fn test_stereo_negative_saturation() {
    let left = [0.0f32, -1.0, -2.0];
    let right = [-2.0f32, 0.0, -1.0];
    let mut out = [0i16; 6];
    convert_interleaved(&mut out, &[&left[..], &right[..]]);
    assert_eq!(out, [0, -32767, -32767, 0, -32767, -32767]);

    let mut stereo = [0i16; 6];
    convert_interleaved_stereo(&mut stereo, &left, &right);
    assert_eq!(stereo, out);
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_stereo_matches_scattered_mono() {
    for frames in [0usize, 1, 3, 4, 7, 8, 9, 16, 17, 255, 1000] {
        let src = vec![test_signal(frames, 0), test_signal(frames, 1)];
        let expected = scattered(&src);

        for kernel in Kernel::supported() {
            let converter = Converter::with_kernel(kernel).unwrap();

            let mut stereo = vec![0i16; frames * 2];
            converter.convert_interleaved_stereo(&mut stereo, &src[0], &src[1]);
            assert_eq!(stereo, expected, "stereo, kernel {}, {} frames", kernel, frames);

            let mut generic = vec![0i16; frames * 2];
            converter.convert_interleaved(&mut generic, &src);
            assert_eq!(generic, expected, "generic, kernel {}, {} frames", kernel, frames);
        }
    }
}

#[test]
fn test_many_channels_match_scattered_mono() {
    for channels in 1..=8 {
        for frames in [0usize, 1, 5, 8, 13, 300, 777] {
            let src: Vec<Vec<f32>> = (0..channels).map(|ch| test_signal(frames, ch)).collect();
            let expected = scattered(&src);
            for kernel in Kernel::supported() {
                let converter = Converter::with_kernel(kernel).unwrap();
                let mut out = vec![0i16; channels * frames];
                converter.convert_interleaved(&mut out, &src);
                assert_eq!(
                    out, expected,
                    "kernel {}, {} channels, {} frames",
                    kernel, channels, frames
                );
            }
        }
    }
}

#[test]
fn test_single_channel_interleave_is_mono() {
    let src = test_signal(37, 4);
    let mut interleaved = vec![0i16; 37];
    convert_interleaved(&mut interleaved, &[&src]);
    let mut mono = vec![0i16; 37];
    convert_mono(&mut mono, &src);
    assert_eq!(interleaved, mono);
}

#[test]
fn test_channel_buffers_can_be_vecs_or_slices() {
    let owned = vec![vec![0.5f32; 3], vec![-0.5f32; 3], vec![0.0f32; 3]];
    let borrowed: Vec<&[f32]> = owned.iter().map(|c| c.as_slice()).collect();

    let mut a = vec![0i16; 9];
    let mut b = vec![0i16; 9];
    convert_interleaved(&mut a, &owned);
    convert_interleaved(&mut b, &borrowed);
    assert_eq!(a, b);
    assert_eq!(&a[..3], &[16384, -16384, 0]);
}

// ============================================================================
// Zero frames
// ============================================================================

#[test]
fn test_zero_frames_writes_nothing() {
    let mut buffer = [7i16; 8];
    let empty: [f32; 0] = [];

    convert_mono(&mut buffer[..0], &empty);
    convert_interleaved_stereo(&mut buffer[..0], &empty, &empty);
    convert_interleaved(&mut buffer[..0], &[&empty[..], &empty[..], &empty[..]]);

    assert_eq!(buffer, [7i16; 8]);
}

// ============================================================================
// Contract violations
// ============================================================================

#[test]
#[should_panic(expected = "convert_interleaved")]
fn test_interleaved_panics_on_short_destination() {
    let a = [0.0f32; 4];
    let mut out = [0i16; 7];
    convert_interleaved(&mut out, &[&a[..], &a[..]]);
}

#[test]
#[should_panic(expected = "convert_interleaved_stereo")]
fn test_stereo_panics_on_ragged_channels() {
    let mut out = [0i16; 8];
    convert_interleaved_stereo(&mut out, &[0.0; 4], &[0.0; 3]);
}

#[test]
#[should_panic(expected = "no channels")]
fn test_interleaved_panics_without_channels() {
    let src: [&[f32]; 0] = [];
    let mut out: [i16; 0] = [];
    convert_interleaved(&mut out, &src);
}
