//! Hamming(7,4) error correction code implementation.
//!
//! Hamming codes are a family of linear error-correcting codes developed by Richard Hamming in 1950.
//! The (7,4) variant encodes 4 data bits into 7 bits by adding 3 even-parity bits. Parity bit
//! `2^k` covers every position whose 1-indexed binary representation has bit `k` set:
//!
//! | Position | 1  | 2  | 3  | 4  | 5  | 6  | 7  |
//! |----------|----|----|----|----|----|----|----|
//! | Role     | P1 | P2 | d3 | P4 | d2 | d1 | d0 |
//!
//! The decoder computes a 3-bit syndrome that names the 1-indexed position of a single flipped
//! bit (0 means no error) and flips it back.
//!
//! # Limitations
//!
//! Any single-bit error per codeword is corrected. Two or more errors in one codeword are NOT
//! detected as such: the syndrome then points at some other position, the decoder "corrects" it
//! and returns the wrong data with `corrected == true`. Nothing in a [`Decoded`] distinguishes
//! that case from a genuine single-bit repair.

use crate::cs::ecc::Result;
use crate::error::Error;
use log::{debug, trace};
use std::fmt;

/// Number of data bits in a unit
pub const DATA_BITS: usize = 4;

/// Number of bits in a codeword
pub const CODEWORD_BITS: usize = 7;

/// Checks that `bits` has exactly `expected` elements and each of them is 0 or 1.
fn validate_bits(bits: &[u8], expected: usize, what: &str) -> Result<()> {
    if bits.len() != expected {
        return Err(Error::InvalidInput(format!(
            "{} must have exactly {} bits, got {}",
            what,
            expected,
            bits.len()
        )));
    }

    if let Some((idx, &bit)) = bits.iter().enumerate().find(|&(_, &b)| b > 1) {
        return Err(Error::InvalidInput(format!(
            "{} bit {} is {}, expected 0 or 1",
            what, idx, bit
        )));
    }

    Ok(())
}

fn fmt_bits(bits: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for bit in bits {
        write!(f, "{}", bit)?;
    }
    Ok(())
}

/// Four data bits `[d3, d2, d1, d0]`, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataUnit([u8; DATA_BITS]);

impl DataUnit {
    /// Creates a data unit from exactly four 0/1 values.
    pub fn new(bits: &[u8]) -> Result<Self> {
        validate_bits(bits, DATA_BITS, "Data unit")?;
        Ok(Self([bits[0], bits[1], bits[2], bits[3]]))
    }

    /// Creates a data unit from the low four bits of `nibble`.
    pub fn from_nibble(nibble: u8) -> Self {
        Self([
            (nibble >> 3) & 1,
            (nibble >> 2) & 1,
            (nibble >> 1) & 1,
            nibble & 1,
        ])
    }

    /// Returns the unit as a value in `0..16`.
    pub fn nibble(&self) -> u8 {
        self.0.iter().fold(0, |acc, &bit| (acc << 1) | bit)
    }

    /// Returns the bits, most significant first.
    pub fn bits(&self) -> &[u8; DATA_BITS] {
        &self.0
    }

    /// Encodes this unit into a codeword.
    pub fn encode(&self) -> Codeword {
        let [d3, d2, d1, d0] = self.0;

        // Even parity over positions {1,3,5,7}, {2,3,6,7}, {4,5,6,7}
        let p1 = d3 ^ d2 ^ d0;
        let p2 = d3 ^ d1 ^ d0;
        let p4 = d2 ^ d1 ^ d0;

        let codeword = Codeword([p1, p2, d3, p4, d2, d1, d0]);
        trace!("encoded {} -> {}", self, codeword);
        codeword
    }
}

impl TryFrom<&[u8]> for DataUnit {
    type Error = Error;

    fn try_from(bits: &[u8]) -> Result<Self> {
        Self::new(bits)
    }
}

impl fmt::Display for DataUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bits(&self.0, f)
    }
}

/// Seven code bits `[P1, P2, d3, P4, d2, d1, d0]` at 1-indexed positions 1..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Codeword([u8; CODEWORD_BITS]);

impl Codeword {
    /// Creates a codeword from exactly seven 0/1 values.
    pub fn new(bits: &[u8]) -> Result<Self> {
        validate_bits(bits, CODEWORD_BITS, "Codeword")?;
        let mut out = [0u8; CODEWORD_BITS];
        out.copy_from_slice(bits);
        Ok(Self(out))
    }

    /// Returns the bits in position order.
    pub fn bits(&self) -> &[u8; CODEWORD_BITS] {
        &self.0
    }

    /// Returns the bit at 1-indexed `position`, or `None` outside `1..=7`.
    pub fn bit(&self, position: usize) -> Option<u8> {
        position
            .checked_sub(1)
            .and_then(|idx| self.0.get(idx))
            .copied()
    }

    /// Returns a copy with the bit at 1-indexed `position` inverted.
    ///
    /// Useful for simulating channel errors.
    pub fn flip(&self, position: usize) -> Result<Self> {
        if !(1..=CODEWORD_BITS).contains(&position) {
            return Err(Error::InvalidInput(format!(
                "Codeword position must be in 1..={}, got {}",
                CODEWORD_BITS, position
            )));
        }
        Ok(self.toggled(position - 1))
    }

    fn toggled(&self, idx: usize) -> Self {
        let mut bits = self.0;
        bits[idx] ^= 1;
        Self(bits)
    }

    /// Computes the parity-check syndrome.
    pub fn syndrome(&self) -> Syndrome {
        let [c1, c2, c3, c4, c5, c6, c7] = self.0;

        let s1 = c1 ^ c3 ^ c5 ^ c7;
        let s2 = c2 ^ c3 ^ c6 ^ c7;
        let s4 = c4 ^ c5 ^ c6 ^ c7;

        Syndrome(s1 | (s2 << 1) | (s4 << 2))
    }

    /// Reads the data bits at positions 3, 5, 6, 7 without any correction.
    pub fn data(&self) -> DataUnit {
        DataUnit([self.0[2], self.0[4], self.0[5], self.0[6]])
    }

    /// Decodes this codeword, correcting the position named by a nonzero syndrome.
    pub fn decode(&self) -> Decoded {
        let syndrome = self.syndrome();

        let (codeword, corrected) = match syndrome.error_position() {
            Some(position) => {
                debug!(
                    "syndrome {} on codeword {}, flipping position {}",
                    syndrome, self, position
                );
                (self.toggled(position - 1), true)
            }
            None => (*self, false),
        };

        Decoded {
            data: codeword.data(),
            syndrome,
            corrected,
            codeword,
        }
    }
}

impl TryFrom<&[u8]> for Codeword {
    type Error = Error;

    fn try_from(bits: &[u8]) -> Result<Self> {
        Self::new(bits)
    }
}

impl fmt::Display for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bits(&self.0, f)
    }
}

/// Parity-check result in `0..=7`.
///
/// Zero means no error was detected; any other value is the 1-indexed codeword position
/// flagged as erroneous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Syndrome(u8);

impl Syndrome {
    /// Returns the raw syndrome value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Whether no error was detected.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The flagged 1-indexed position, if any.
    pub fn error_position(&self) -> Option<usize> {
        if self.is_zero() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

impl fmt::Display for Syndrome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The outcome of decoding one codeword.
///
/// `corrected == true` only says a bit was flipped; with two or more channel errors the flip
/// may have been the wrong one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decoded {
    /// Recovered data bits
    pub data: DataUnit,
    /// Raw syndrome of the received codeword
    pub syndrome: Syndrome,
    /// Whether a bit was flipped
    pub corrected: bool,
    /// The codeword after correction
    pub codeword: Codeword,
}

/// Encodes four 0/1 values `[d3, d2, d1, d0]` into a codeword.
///
/// # Arguments
///
/// * `data` - Exactly four bits, most significant first, each 0 or 1
///
/// # Returns
///
/// The codeword `[P1, P2, d3, P4, d2, d1, d0]`, or `Error::InvalidInput` if `data` has the
/// wrong length or a value other than 0 or 1
pub fn encode(data: &[u8]) -> Result<Codeword> {
    Ok(DataUnit::new(data)?.encode())
}

/// Decodes seven 0/1 values, correcting up to one bit error.
///
/// # Arguments
///
/// * `code` - Exactly seven bits in position order, each 0 or 1
///
/// # Returns
///
/// The recovered data, the syndrome, whether a bit was flipped and the corrected codeword, or
/// `Error::InvalidInput` if `code` has the wrong length or a value other than 0 or 1
pub fn decode(code: &[u8]) -> Result<Decoded> {
    Ok(Codeword::new(code)?.decode())
}

/// Result of the built-in verification scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfTestReport {
    /// Fixed test vector
    pub input: DataUnit,
    /// Its codeword
    pub encoded: Codeword,
    /// Decode of the untouched codeword
    pub clean: Decoded,
    /// The codeword with position 7 flipped
    pub corrupted: Codeword,
    /// Decode of the corrupted codeword
    pub recovered: Decoded,
}

impl SelfTestReport {
    /// Position flipped to build `corrupted`
    pub const FLIPPED_POSITION: usize = 7;

    /// Whether both decodes behaved as the code guarantees.
    pub fn passed(&self) -> bool {
        let clean_ok =
            self.clean.data == self.input && self.clean.syndrome.is_zero() && !self.clean.corrected;
        let recovered_ok = self.recovered.data == self.input
            && self.recovered.syndrome.error_position() == Some(Self::FLIPPED_POSITION)
            && self.recovered.corrected
            && self.recovered.codeword == self.encoded;
        clean_ok && recovered_ok
    }
}

/// Runs the fixed verification scenario: encode `[1, 0, 1, 1]`, decode it, then decode it again
/// with position 7 flipped.
pub fn self_test() -> SelfTestReport {
    let input = DataUnit::from_nibble(0b1011);
    let encoded = input.encode();
    let clean = encoded.decode();
    let corrupted = encoded.toggled(SelfTestReport::FLIPPED_POSITION - 1);
    let recovered = corrupted.decode();

    SelfTestReport {
        input,
        encoded,
        clean,
        corrupted,
        recovered,
    }
}
