use wasm_bindgen::prelude::*;

pub mod core;
pub mod interleave;
pub mod kernel;

#[cfg(feature = "symphonia")]
pub mod audio_buffer;
mod converter;

pub use crate::core::{
    convert_sample, PcmError, PcmResult, BLOCK_WIDTH, S16_LIMIT, S16_SCALE, VERSION_MAJOR,
    VERSION_MINOR,
};
pub use converter::{
    convert_interleaved, convert_interleaved_stereo, convert_mono, try_convert_interleaved,
    try_convert_interleaved_stereo, try_convert_mono, Converter, ConverterConfig,
};
pub use kernel::Kernel;

#[cfg(feature = "symphonia")]
pub use audio_buffer::{convert_audio_buffer, convert_audio_buffer_ref, interleaved_len};

// result helpers

/// turn an error into js
fn to_js_err(e: PcmError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// native helpers behind the wasm api

/// convert one channel into a new buffer
pub fn f32_to_s16_vec(converter: &Converter, samples: &[f32]) -> Vec<i16> {
    let mut out = vec![0i16; samples.len()];
    converter.convert_mono(&mut out, samples);
    out
}

/// Interleave channel-major samples into a new buffer.
///
/// `planar` holds all of channel 0, then all of channel 1, and so on.
pub fn planar_to_s16_vec(
    converter: &Converter,
    planar: &[f32],
    channels: usize,
) -> PcmResult<Vec<i16>> {
    if channels == 0 {
        return Err(PcmError::NoChannels);
    }
    if planar.len() % channels != 0 {
        return Err(PcmError::LengthMismatch {
            expected: planar.len() / channels * channels,
            actual: planar.len(),
        });
    }

    let frames = planar.len() / channels;
    if frames == 0 {
        return Ok(Vec::new());
    }

    let planes: Vec<&[f32]> = planar.chunks_exact(frames).collect();
    let mut out = vec![0i16; planar.len()];
    converter.try_convert_interleaved(&mut out, &planes)?;
    Ok(out)
}

/// interleave a left/right pair into a new buffer
pub fn stereo_to_s16_vec(
    converter: &Converter,
    left: &[f32],
    right: &[f32],
) -> PcmResult<Vec<i16>> {
    let mut out = vec![0i16; left.len() * 2];
    converter.try_convert_interleaved_stereo(&mut out, left, right)?;
    Ok(out)
}

// api functions

/// route rust panics to the browser console
#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// convert f32 samples to s16
///
/// # Arguments
/// * `samples` - Audio samples (f32, nominally -1.0 to 1.0)
///
/// # Returns
/// s16 samples, saturated to -32767..=32767
#[wasm_bindgen]
pub fn f32_to_s16(samples: &[f32]) -> Vec<i16> {
    f32_to_s16_vec(&Converter::new(), samples)
}

/// interleave planar f32 audio to s16
///
/// # Arguments
/// * `planar` - Channel-major samples: all of channel 0, then channel 1, ...
/// * `channels` - Number of channels
///
/// # Returns
/// Interleaved s16 samples
#[wasm_bindgen]
pub fn planar_to_s16(planar: &[f32], channels: u8) -> Result<Vec<i16>, JsValue> {
    planar_to_s16_vec(&Converter::new(), planar, channels as usize).map_err(to_js_err)
}

/// interleave a stereo pair to s16
///
/// # Arguments
/// * `left` - Left channel samples
/// * `right` - Right channel samples, same length as `left`
///
/// # Returns
/// Interleaved s16 samples (L R L R ...)
#[wasm_bindgen]
pub fn stereo_to_s16(left: &[f32], right: &[f32]) -> Result<Vec<i16>, JsValue> {
    stereo_to_s16_vec(&Converter::new(), left, right).map_err(to_js_err)
}

/// name of the kernel picked for this machine
#[wasm_bindgen]
pub fn active_kernel() -> String {
    Kernel::detect().name().to_string()
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    format!("{}.{}", VERSION_MAJOR, VERSION_MINOR)
}

// converter wasm api

#[wasm_bindgen]
pub struct WasmConverter {
    inner: Converter,
}

#[wasm_bindgen]
impl WasmConverter {
    /// converter on the fastest kernel
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Converter::new(),
        }
    }

    /// Create a converter from a settings object
    ///
    /// Accepts `{ kernel: "auto" | "scalar" | "simd128" | ... }`.
    #[wasm_bindgen]
    pub fn from_object(obj: JsValue) -> Result<WasmConverter, JsValue> {
        let config: ConverterConfig = serde_wasm_bindgen::from_value(obj)
            .map_err(|e| JsValue::from_str(&format!("Invalid converter config: {}", e)))?;
        let inner = Converter::from_config(&config).map_err(to_js_err)?;
        Ok(Self { inner })
    }

    /// kernel in use
    #[wasm_bindgen]
    pub fn kernel(&self) -> String {
        self.inner.kernel().name().to_string()
    }

    /// convert one channel
    #[wasm_bindgen]
    pub fn convert_mono(&self, samples: &[f32]) -> Vec<i16> {
        f32_to_s16_vec(&self.inner, samples)
    }

    /// interleave channel-major samples
    #[wasm_bindgen]
    pub fn convert_planar(&self, planar: &[f32], channels: u8) -> Result<Vec<i16>, JsValue> {
        planar_to_s16_vec(&self.inner, planar, channels as usize).map_err(to_js_err)
    }

    /// interleave a stereo pair
    #[wasm_bindgen]
    pub fn convert_stereo(&self, left: &[f32], right: &[f32]) -> Result<Vec<i16>, JsValue> {
        stereo_to_s16_vec(&self.inner, left, right).map_err(to_js_err)
    }
}

impl Default for WasmConverter {
    fn default() -> Self {
        Self::new()
    }
}
