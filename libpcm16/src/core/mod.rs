pub mod error;
pub mod scalar;
pub mod types;

pub use error::PcmError;
pub use scalar::convert_sample;
pub use types::*;
