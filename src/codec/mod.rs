//! Bit-level and integer-sequence codecs underlying the wire format.

pub mod bits;
pub mod int32;

pub use bits::{BitReader, BitWriter};
pub use int32::Predictor;
