//! Error correction code implementations.
//!
//! This module provides:
//! - The Hamming(7,4) block coder with single-bit correction
//! - Framing of 16-bit samples into packed Hamming-coded byte frames
//! - A link layer that moves framed samples from a source to a sink
//!
//! # Examples
//!
//! ```rust
//! use hamming_link::ecc::{decode_frame, encode_sample16};
//!
//! let frame = encode_sample16(0xBEEF);
//! assert_eq!(frame.len(), 4);
//!
//! let decoded = decode_frame(&frame).unwrap();
//! assert_eq!(decoded.value(), 0xBEEF);
//! assert_eq!(decoded.corrections(), 0);
//! ```

pub use crate::error::Result;

/// Trait for error correction code implementations
pub trait ErrorCorrection {
    /// Encode data with error correction symbols
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decode data and correct errors if possible
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Hamming(7,4) block coder
pub mod hamming;
pub use hamming::{
    decode, encode, self_test, Codeword, DataUnit, Decoded, SelfTestReport, Syndrome,
    CODEWORD_BITS, DATA_BITS,
};

/// 16-bit sample framing
pub mod frame;
pub use frame::{
    decode_frame, decode_frames, decode_frames_par, encode_sample16, encode_samples,
    encode_samples_par, encode_stream, join16, pack_bits, sample_magnitude, split16, unpack_bits,
    BitStream, DecodedFrame, FrameConfig, FrameEncoder, SignMode, FRAME_BITS, FRAME_BYTES,
};

/// Source-to-sink transmission of framed samples
pub mod link;
pub use link::{
    FrameSink, IterSource, LinkStats, RetryPolicy, SampleSource, Transmission, Transmitter,
    WriteSink,
};

#[cfg(test)]
mod tests;
