//! errors reported by the checked entry points

use thiserror::Error;

/// Contract violations and configuration problems.
///
/// The conversion itself has no failure states; these only come out of the
/// `try_` entry points and the converter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcmError {
    /// destination does not hold `expected` samples
    #[error("destination holds {actual} samples, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    /// one channel buffer has a different frame count than channel 0
    #[error("channel {channel} holds {actual} frames, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },
    /// interleaving needs at least one channel
    #[error("no channels to interleave")]
    NoChannels,
    /// kernel exists but this cpu can't run it
    #[error("kernel '{0}' is not supported on this cpu")]
    UnsupportedKernel(String),
    /// kernel name not recognised
    #[error("unknown kernel '{0}'")]
    UnknownKernel(String),
    /// config could not be parsed
    #[error("invalid converter config: {0}")]
    InvalidConfig(String),
    /// decoder handed us something that isn't f32
    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(&'static str),
}
