//! Converter front door and its configuration.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{PcmError, PcmResult};
use crate::interleave::{check_interleaved, check_stereo, interleave};
use crate::kernel::Kernel;

/// converter settings
///
/// ```json
/// { "kernel": "auto" }
/// ```
///
/// `kernel` is `"auto"` (or missing) to pick the fastest supported kernel, or
/// one of the kernel names to force it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(
        default,
        serialize_with = "serialize_kernel_choice",
        deserialize_with = "deserialize_kernel_choice"
    )]
    pub kernel: Option<Kernel>,
}

impl ConverterConfig {
    /// parse from json
    pub fn from_json(json: &str) -> PcmResult<Self> {
        serde_json::from_str(json).map_err(|e| PcmError::InvalidConfig(e.to_string()))
    }

    /// to json
    pub fn to_json(&self) -> PcmResult<String> {
        serde_json::to_string(self).map_err(|e| PcmError::InvalidConfig(e.to_string()))
    }
}

fn serialize_kernel_choice<S: Serializer>(
    kernel: &Option<Kernel>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match kernel {
        Some(k) => serializer.serialize_str(k.name()),
        None => serializer.serialize_str("auto"),
    }
}

fn deserialize_kernel_choice<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Kernel>, D::Error> {
    let name: Option<String> = Option::deserialize(deserializer)?;
    match name.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(n) if n.eq_ignore_ascii_case("auto") => Ok(None),
        Some(n) => n.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Converts f32 sample buffers to s16 with one selected kernel.
///
/// Cheap to copy. Nothing is allocated per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converter {
    kernel: Kernel,
}

impl Converter {
    /// converter using the fastest kernel this cpu supports
    pub fn new() -> Self {
        Converter {
            kernel: Kernel::detect(),
        }
    }

    /// converter forced onto `kernel`
    pub fn with_kernel(kernel: Kernel) -> PcmResult<Self> {
        if !kernel.is_supported() {
            tracing::warn!(kernel = kernel.name(), "requested kernel is not supported");
            return Err(PcmError::UnsupportedKernel(kernel.name().to_string()));
        }
        tracing::debug!(kernel = kernel.name(), "using forced conversion kernel");
        Ok(Converter { kernel })
    }

    /// converter from settings
    pub fn from_config(config: &ConverterConfig) -> PcmResult<Self> {
        match config.kernel {
            Some(kernel) => Self::with_kernel(kernel),
            None => Ok(Self::new()),
        }
    }

    /// kernel in use
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Convert one channel.
    ///
    /// # Panics
    /// If `dest` and `src` differ in length.
    pub fn convert_mono(&self, dest: &mut [i16], src: &[f32]) {
        self.kernel.convert(dest, src);
    }

    /// [`convert_mono`](Self::convert_mono) reporting size problems instead of panicking
    pub fn try_convert_mono(&self, dest: &mut [i16], src: &[f32]) -> PcmResult<()> {
        if dest.len() != src.len() {
            return Err(PcmError::LengthMismatch {
                expected: src.len(),
                actual: dest.len(),
            });
        }
        self.kernel.convert(dest, src);
        Ok(())
    }

    /// Interleave `src.len()` channel buffers into `dest`.
    ///
    /// Every channel must hold the same number of frames and `dest` must hold
    /// `channels * frames` samples. Two channels use the stereo path.
    ///
    /// # Panics
    /// On an empty channel set or mismatched sizes.
    pub fn convert_interleaved<S: AsRef<[f32]>>(&self, dest: &mut [i16], src: &[S]) {
        if let Err(e) = self.try_convert_interleaved(dest, src) {
            panic!("convert_interleaved: {}", e);
        }
    }

    /// [`convert_interleaved`](Self::convert_interleaved) reporting size problems
    pub fn try_convert_interleaved<S: AsRef<[f32]>>(
        &self,
        dest: &mut [i16],
        src: &[S],
    ) -> PcmResult<()> {
        check_interleaved(dest.len(), src)?;
        interleave(self.kernel, dest, src);
        Ok(())
    }

    /// Interleave a left/right pair into `dest`.
    ///
    /// No alignment is required of any buffer.
    ///
    /// # Panics
    /// If `left` and `right` differ in length or `dest` isn't twice as long.
    pub fn convert_interleaved_stereo(&self, dest: &mut [i16], left: &[f32], right: &[f32]) {
        if let Err(e) = self.try_convert_interleaved_stereo(dest, left, right) {
            panic!("convert_interleaved_stereo: {}", e);
        }
    }

    /// [`convert_interleaved_stereo`](Self::convert_interleaved_stereo) reporting size problems
    pub fn try_convert_interleaved_stereo(
        &self,
        dest: &mut [i16],
        left: &[f32],
        right: &[f32],
    ) -> PcmResult<()> {
        check_stereo(dest.len(), left, right)?;
        self.kernel.convert_stereo(dest, left, right);
        Ok(())
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

// free functions on the detected kernel

/// Convert one channel with the fastest available kernel.
///
/// # Panics
/// If `dest` and `src` differ in length.
pub fn convert_mono(dest: &mut [i16], src: &[f32]) {
    Converter::new().convert_mono(dest, src);
}

/// Interleave channel buffers with the fastest available kernel.
///
/// # Panics
/// On an empty channel set or mismatched sizes.
pub fn convert_interleaved<S: AsRef<[f32]>>(dest: &mut [i16], src: &[S]) {
    Converter::new().convert_interleaved(dest, src);
}

/// Interleave a left/right pair with the fastest available kernel.
///
/// # Panics
/// If `left` and `right` differ in length or `dest` isn't twice as long.
pub fn convert_interleaved_stereo(dest: &mut [i16], left: &[f32], right: &[f32]) {
    Converter::new().convert_interleaved_stereo(dest, left, right);
}

/// checked [`convert_mono`]
pub fn try_convert_mono(dest: &mut [i16], src: &[f32]) -> PcmResult<()> {
    Converter::new().try_convert_mono(dest, src)
}

/// checked [`convert_interleaved`]
pub fn try_convert_interleaved<S: AsRef<[f32]>>(dest: &mut [i16], src: &[S]) -> PcmResult<()> {
    Converter::new().try_convert_interleaved(dest, src)
}

/// checked [`convert_interleaved_stereo`]
pub fn try_convert_interleaved_stereo(
    dest: &mut [i16],
    left: &[f32],
    right: &[f32],
) -> PcmResult<()> {
    Converter::new().try_convert_interleaved_stereo(dest, left, right)
}
