//! common types for pcm16 conversion

// constants

/// float to s16 scale, full scale maps to +/-32767
pub const S16_SCALE: f32 = 32767.0;

/// saturation limit, symmetric so -32768 is never produced
pub const S16_LIMIT: i16 = 32767;

/// samples per vector block
///
/// Every vector kernel consumes whole blocks of this many samples and hands the
/// remaining `0..BLOCK_WIDTH` samples to the scalar path.
pub const BLOCK_WIDTH: usize = 8;

/// library version
pub const VERSION_MAJOR: u8 = 0;
pub const VERSION_MINOR: u8 = 1;

/// result type for pcm16 stuff
pub type PcmResult<T> = Result<T, super::error::PcmError>;
