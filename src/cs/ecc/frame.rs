//! Framing of 16-bit samples into Hamming(7,4) protected byte frames.
//!
//! A sample is split into four nibbles, most significant first. Each nibble is encoded into a
//! 7-bit codeword and the four codewords are concatenated into a 28-bit stream, which is packed
//! MSB-first into 4 bytes. The low 4 bits of the last byte are zero padding.
//!
//! ```text
//! value:  nnnn nnnn nnnn nnnn
//!          |    |    |    |
//! stream: [cw0][cw1][cw2][cw3]0000    (4 x 7 bits + 4 padding bits)
//! ```
//!
//! # Sign handling
//!
//! Sensor samples are signed, but the default [`SignMode::Magnitude`] frames `|sample|`, so a
//! sample and its negation produce the same frame and the receiver cannot recover the sign.
//! This matches deployed receivers. [`SignMode::TwosComplement`] frames the raw bits instead.

use crate::cs::ecc::hamming::{Codeword, DataUnit, Decoded, Syndrome, CODEWORD_BITS};
use crate::cs::ecc::{ErrorCorrection, Result};
use crate::error::Error;
use bitvec::prelude::*;
use log::{debug, trace};
use rayon::prelude::*;
use std::fmt;

/// Nibbles per 16-bit sample
pub const UNITS_PER_SAMPLE: usize = 4;

/// Bits in an unpacked frame
pub const FRAME_BITS: usize = UNITS_PER_SAMPLE * CODEWORD_BITS;

/// Bytes in a packed frame
pub const FRAME_BYTES: usize = FRAME_BITS.div_ceil(8);

/// MSB-first bit stream backed by bytes
pub type BitStream = BitVec<u8, Msb0>;

/// Magnitude of a sample as framed by [`SignMode::Magnitude`].
///
/// `i16::MIN` maps to `0x8000`.
pub fn sample_magnitude(sample: i16) -> u16 {
    sample.unsigned_abs()
}

/// Splits a 16-bit value into four data units, most significant nibble first.
pub fn split16(value: u16) -> [DataUnit; UNITS_PER_SAMPLE] {
    [12, 8, 4, 0].map(|shift| DataUnit::from_nibble(((value >> shift) & 0xF) as u8))
}

/// Reassembles four data units, most significant first, into a 16-bit value.
pub fn join16(units: &[DataUnit; UNITS_PER_SAMPLE]) -> u16 {
    units
        .iter()
        .fold(0u16, |acc, unit| (acc << 4) | u16::from(unit.nibble()))
}

/// Packs 0/1 values into bytes, MSB first, zero-padding the final byte.
///
/// Any nonzero element is treated as a 1 bit.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    let mut packed = bitvec![u8, Msb0; 0; bits.len()];
    for (idx, &bit) in bits.iter().enumerate() {
        packed.set(idx, bit != 0);
    }
    packed.into_vec()
}

/// Unpacks the first `bit_count` bits of `bytes`, MSB first, ignoring any padding.
///
/// # Arguments
///
/// * `bytes` - Packed bytes, as produced by [`pack_bits`]
/// * `bit_count` - Number of meaningful bits; anything after them is padding
///
/// # Returns
///
/// One 0/1 value per bit, or `Error::InvalidInput` if `bit_count` exceeds the bits available
pub fn unpack_bits(bytes: &[u8], bit_count: usize) -> Result<Vec<u8>> {
    let available = bytes.len() * 8;
    if bit_count > available {
        return Err(Error::InvalidInput(format!(
            "Cannot unpack {} bits from {} bytes",
            bit_count,
            bytes.len()
        )));
    }

    Ok(bytes.view_bits::<Msb0>()[..bit_count]
        .iter()
        .by_vals()
        .map(u8::from)
        .collect())
}

/// Encodes a 16-bit value into its 28-bit codeword stream.
pub fn encode_stream(value: u16) -> BitStream {
    let mut stream = bitvec![u8, Msb0; 0; FRAME_BITS];

    for (chunk, unit) in stream
        .chunks_mut(CODEWORD_BITS)
        .zip(split16(value).iter())
    {
        for (idx, &bit) in unit.encode().bits().iter().enumerate() {
            chunk.set(idx, bit == 1);
        }
    }

    stream
}

/// Encodes a 16-bit value into a 4-byte frame.
pub fn encode_sample16(value: u16) -> Vec<u8> {
    // The stream is allocated zeroed, so its spare low bits are already the padding
    let frame = encode_stream(value).into_vec();
    trace!("sample {:#06x} -> frame {}", value, hex::encode(&frame));
    frame
}

fn codeword_from_bits(bits: &BitSlice<u8, Msb0>) -> Result<Codeword> {
    let mut raw = [0u8; CODEWORD_BITS];
    for (slot, bit) in raw.iter_mut().zip(bits.iter().by_vals()) {
        *slot = u8::from(bit);
    }
    Codeword::new(&raw)
}

/// Decodes a 4-byte frame, correcting up to one bit error per codeword.
///
/// # Arguments
///
/// * `bytes` - A frame produced by [`encode_sample16`]; the 4 padding bits are ignored
///
/// # Returns
///
/// The per-nibble decode results, or `Error::InvalidInput` if `bytes` is not exactly
/// [`FRAME_BYTES`] long
pub fn decode_frame(bytes: &[u8]) -> Result<DecodedFrame> {
    if bytes.len() != FRAME_BYTES {
        return Err(Error::InvalidInput(format!(
            "Frame must be exactly {} bytes, got {}",
            FRAME_BYTES,
            bytes.len()
        )));
    }

    let bits = bytes.view_bits::<Msb0>();
    if bits[FRAME_BITS..].any() {
        debug!("frame {} has nonzero padding bits", hex::encode(bytes));
    }

    let mut codewords = [Codeword::default(); UNITS_PER_SAMPLE];
    for (slot, chunk) in codewords
        .iter_mut()
        .zip(bits[..FRAME_BITS].chunks_exact(CODEWORD_BITS))
    {
        *slot = codeword_from_bits(chunk)?;
    }

    let frame = DecodedFrame {
        units: codewords.map(|codeword| codeword.decode()),
    };
    trace!("frame {} -> {}", hex::encode(bytes), frame);
    Ok(frame)
}

/// Encodes a sequence of values into back-to-back frames.
pub fn encode_samples(values: &[u16]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|&value| encode_sample16(value))
        .collect()
}

/// Decodes back-to-back frames.
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<DecodedFrame>> {
    check_frame_multiple(bytes)?;
    bytes.chunks_exact(FRAME_BYTES).map(decode_frame).collect()
}

/// Parallel form of [`encode_samples`]; output is identical.
pub fn encode_samples_par(values: &[u16]) -> Vec<u8> {
    values
        .par_iter()
        .map(|&value| encode_sample16(value))
        .collect::<Vec<_>>()
        .concat()
}

/// Parallel form of [`decode_frames`]; output is identical.
pub fn decode_frames_par(bytes: &[u8]) -> Result<Vec<DecodedFrame>> {
    check_frame_multiple(bytes)?;
    bytes
        .par_chunks_exact(FRAME_BYTES)
        .map(decode_frame)
        .collect()
}

fn check_frame_multiple(bytes: &[u8]) -> Result<()> {
    if bytes.len() % FRAME_BYTES != 0 {
        return Err(Error::InvalidInput(format!(
            "Frame buffer length {} is not a multiple of {}",
            bytes.len(),
            FRAME_BYTES
        )));
    }
    Ok(())
}

/// A decoded frame: the four per-nibble decode results, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    units: [Decoded; UNITS_PER_SAMPLE],
}

impl DecodedFrame {
    /// The reassembled 16-bit value.
    pub fn value(&self) -> u16 {
        join16(&self.units.map(|unit| unit.data))
    }

    /// The reassembled value reinterpreted as two's complement.
    ///
    /// Only meaningful for frames produced with [`SignMode::TwosComplement`].
    pub fn as_i16(&self) -> i16 {
        self.value() as i16
    }

    /// Per-nibble decode results.
    pub fn units(&self) -> &[Decoded; UNITS_PER_SAMPLE] {
        &self.units
    }

    /// Per-nibble syndromes.
    pub fn syndromes(&self) -> [Syndrome; UNITS_PER_SAMPLE] {
        self.units.map(|unit| unit.syndrome)
    }

    /// Number of codewords in which a bit was flipped.
    pub fn corrections(&self) -> usize {
        self.units.iter().filter(|unit| unit.corrected).count()
    }

    /// Whether every codeword had a zero syndrome.
    pub fn is_clean(&self) -> bool {
        self.corrections() == 0
    }
}

impl fmt::Display for DecodedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.syndromes();
        write!(
            f,
            "{:#06x} (syndromes {} {} {} {})",
            self.value(),
            a,
            b,
            c,
            d
        )
    }
}

/// How a signed sample becomes the 16-bit word that gets framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignMode {
    /// Frame `|sample|`; the sign is discarded.
    #[default]
    Magnitude,
    /// Frame the raw two's-complement bits.
    TwosComplement,
}

/// Configuration for [`FrameEncoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameConfig {
    /// Sign handling for signed samples
    pub sign_mode: SignMode,
}

/// Frames signed samples according to a [`FrameConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameEncoder {
    config: FrameConfig,
}

impl FrameEncoder {
    /// Creates an encoder with the given configuration.
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Maps a signed sample to the word that gets framed.
    pub fn word(&self, sample: i16) -> u16 {
        match self.config.sign_mode {
            SignMode::Magnitude => {
                if sample < 0 {
                    debug!("sample {} framed as magnitude, sign discarded", sample);
                }
                sample_magnitude(sample)
            }
            SignMode::TwosComplement => sample as u16,
        }
    }

    /// Encodes a signed sample into a 4-byte frame.
    pub fn encode_sample(&self, sample: i16) -> Vec<u8> {
        encode_sample16(self.word(sample))
    }
}

/// Byte-buffer interface: input is big-endian 16-bit words, output is one frame per word.
impl ErrorCorrection for FrameEncoder {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.len() % 2 != 0 {
            return Err(Error::InvalidInput(format!(
                "Input must hold whole 16-bit words, got {} bytes",
                data.len()
            )));
        }

        let words: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        Ok(encode_samples(&words))
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(decode_frames(data)?
            .iter()
            .flat_map(|frame| frame.value().to_be_bytes())
            .collect())
    }
}
