//! The caller's floating-point environment must survive every call
use libpcm16_audio::kernel::fpenv::{control_word, RoundingGuard};
use libpcm16_audio::{Converter, Kernel};

fn exercise(converter: &Converter) -> (Vec<i16>, Vec<i16>, Vec<i16>) {
    let src: Vec<f32> = (0..103).map(|i| (i as f32 * 0.05).sin() * 1.1).collect();
    let mut mono = vec![0i16; src.len()];
    converter.convert_mono(&mut mono, &src);

    let mut stereo = vec![0i16; src.len() * 2];
    converter.convert_interleaved_stereo(&mut stereo, &src, &src);

    let mut surround = vec![0i16; src.len() * 3];
    converter.convert_interleaved(&mut surround, &[&src[..], &src[..], &src[..]]);

    (mono, stereo, surround)
}

#[test]
fn test_control_word_unchanged_by_every_kernel() {
    for kernel in Kernel::supported() {
        let converter = Converter::with_kernel(kernel).unwrap();
        let before = control_word();
        exercise(&converter);
        assert_eq!(control_word(), before, "kernel {} leaked fp state", kernel);
    }
}

#[test]
fn test_inexact_results_do_not_count_as_state_change() {
    // 1/3 * 32767 is inexact, so the precision flag gets raised
    let src = [1.0f32 / 3.0; 19];
    for kernel in Kernel::supported() {
        let before = control_word();
        let mut dest = [0i16; 19];
        kernel.convert(&mut dest, &src);
        assert_eq!(control_word(), before, "kernel {}", kernel);
        assert!(dest.iter().all(|&s| s == 10922));
    }
}

#[test]
fn test_guard_restores_on_drop() {
    let before = control_word();
    {
        let _guard = RoundingGuard::round_to_nearest();
    }
    assert_eq!(control_word(), before);
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86 {
    use super::*;
    use libpcm16_audio::convert_sample;
    use libpcm16_audio::kernel::fpenv::x86_mode::{
        rounding, set_rounding, _MM_ROUND_DOWN, _MM_ROUND_TOWARD_ZERO, _MM_ROUND_UP,
    };
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const MODES: [u32; 3] = [_MM_ROUND_DOWN, _MM_ROUND_UP, _MM_ROUND_TOWARD_ZERO];

    /// Mono and stereo output of `kernel` while the thread is in `mode`
    fn convert_in_mode(kernel: Kernel, mode: u32, src: &[f32]) -> (Vec<i16>, Vec<i16>) {
        let mut mono = vec![0i16; src.len()];
        let mut stereo = vec![0i16; src.len() * 2];
        let _override = unsafe { set_rounding(mode) };
        kernel.convert(&mut mono, src);
        kernel.convert_stereo(&mut stereo, src, src);
        (mono, stereo)
    }

    fn check_mode_independent(src: &[f32]) {
        // reference computed in the default mode
        let mono: Vec<i16> = src.iter().map(|&x| convert_sample(x)).collect();
        let stereo: Vec<i16> = mono.iter().flat_map(|&s| [s, s]).collect();

        for mode in MODES {
            for kernel in Kernel::supported() {
                let (got_mono, got_stereo) = convert_in_mode(kernel, mode, src);
                assert_eq!(got_mono, mono, "kernel {} mono, mode {:#x}", kernel, mode);
                assert_eq!(got_stereo, stereo, "kernel {} stereo, mode {:#x}", kernel, mode);
            }
        }
    }

    #[test]
    fn test_product_rounding_independent_of_caller_mode() {
        // x * 32767 lands a hair under .5: nearest keeps 16416, round-up gives 16417
        let src = [0.501_007_1f32; 9];
        assert_eq!(convert_sample(src[0]), 16416);
        check_mode_independent(&src);
    }

    #[test]
    fn test_random_input_independent_of_caller_mode() {
        let mut rng = StdRng::seed_from_u64(0x0da7);
        for len in [1usize, 7, 8, 15, 64, 131] {
            let src: Vec<f32> = (0..len).map(|_| rng.random_range(-1.2f32..1.2)).collect();
            check_mode_independent(&src);
        }
    }

    #[test]
    fn test_non_default_mode_survives_conversion() {
        let converter = Converter::with_kernel(Kernel::Scalar).unwrap();
        let expected = exercise(&converter);
        for mode in MODES {
            let _override = unsafe { set_rounding(mode) };
            for kernel in Kernel::supported() {
                let converter = Converter::with_kernel(kernel).unwrap();
                let before = control_word();
                let got = exercise(&converter);
                assert_eq!(rounding(), mode, "kernel {} clobbered the mode", kernel);
                assert_eq!(control_word(), before, "kernel {} leaked fp state", kernel);
                assert_eq!(got, expected, "kernel {} output under mode {:#x}", kernel, mode);
            }
        }
    }

    #[test]
    fn test_guard_installs_nearest_then_restores() {
        let _override = unsafe { set_rounding(_MM_ROUND_TOWARD_ZERO) };
        {
            let _guard = RoundingGuard::round_to_nearest();
            assert_eq!(rounding(), 0);
        }
        assert_eq!(rounding(), _MM_ROUND_TOWARD_ZERO);
    }

    #[test]
    fn test_guard_restores_while_unwinding() {
        let _override = unsafe { set_rounding(_MM_ROUND_UP) };
        let result = std::panic::catch_unwind(|| {
            let _guard = RoundingGuard::round_to_nearest();
            panic!("inside the block loop");
        });
        assert!(result.is_err());
        assert_eq!(rounding(), _MM_ROUND_UP);
    }
}
