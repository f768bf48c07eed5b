use crate::cs::ecc::{
    decode, decode_frame, encode, encode_sample16, encode_stream, pack_bits, split16, unpack_bits,
    Codeword, DataUnit, FRAME_BITS, FRAME_BYTES,
};
use bitvec::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn all_units() -> impl Iterator<Item = DataUnit> {
    (0..16u8).map(DataUnit::from_nibble)
}

#[test]
fn test_round_trip_all_units() {
    for unit in all_units() {
        let decoded = decode(encode(unit.bits()).unwrap().bits()).unwrap();
        assert_eq!(decoded.data, unit);
        assert_eq!(decoded.syndrome.value(), 0);
        assert!(!decoded.corrected);
    }
}

#[test]
fn test_single_bit_correction_all_positions() {
    for unit in all_units() {
        let codeword = unit.encode();
        for idx in 0..7 {
            let mut bits = *codeword.bits();
            bits[idx] ^= 1;

            let decoded = decode(&bits).unwrap();
            assert_eq!(decoded.data, unit, "unit {} bit {}", unit, idx);
            assert_eq!(decoded.syndrome.value() as usize, idx + 1);
            assert!(decoded.corrected);
            assert_eq!(decoded.codeword, codeword);
        }
    }
}

#[test]
fn test_parity_equations() {
    for unit in all_units() {
        let [d3, d2, d1, d0] = *unit.bits();
        let c = unit.encode();
        assert_eq!(c.bit(1), Some(d3 ^ d2 ^ d0));
        assert_eq!(c.bit(2), Some(d3 ^ d1 ^ d0));
        assert_eq!(c.bit(3), Some(d3));
        assert_eq!(c.bit(4), Some(d2 ^ d1 ^ d0));
        assert_eq!(c.bit(5), Some(d2));
        assert_eq!(c.bit(6), Some(d1));
        assert_eq!(c.bit(7), Some(d0));
    }
}

#[test]
fn test_codewords_are_distinct() {
    // Minimum distance 3 between any two codewords
    let codewords: Vec<Codeword> = all_units().map(|u| u.encode()).collect();
    for (i, a) in codewords.iter().enumerate() {
        for b in &codewords[i + 1..] {
            let distance = a
                .bits()
                .iter()
                .zip(b.bits())
                .filter(|(x, y)| x != y)
                .count();
            assert!(distance >= 3, "{} vs {}", a, b);
        }
    }
}

#[test]
fn test_frame_round_trip_all_values() {
    for value in 0..=u16::MAX {
        let frame = encode_sample16(value);
        assert_eq!(frame.len(), FRAME_BYTES);

        let bits = unpack_bits(&frame, FRAME_BITS).unwrap();
        let nibbles: Vec<u8> = bits
            .chunks_exact(7)
            .map(|code| decode(code).unwrap())
            .inspect(|d| assert!(!d.corrected))
            .map(|d| d.data.nibble())
            .collect();

        let expected: Vec<u8> = split16(value).iter().map(|u| u.nibble()).collect();
        assert_eq!(nibbles, expected, "value {:#06x}", value);
    }
}

#[test]
fn test_packing_length_and_padding() {
    for value in [0u16, 1, 0x7FFF, 0x8000, 0xFFFF, 0xA5A5] {
        let stream = encode_stream(value);
        let bits: Vec<u8> = stream.iter().by_vals().map(u8::from).collect();
        assert_eq!(bits.len(), 28);

        let packed = pack_bits(&bits);
        assert_eq!(packed.len(), 4);
        assert_eq!(packed[3] & 0x0F, 0);
        assert_eq!(packed, encode_sample16(value));
    }
}

#[test]
fn test_signed_sample_magnitude_framing() {
    let samples: [i16; 4] = [-1, 1, -32768, 32767];
    for sample in samples {
        let word = sample.unsigned_abs();
        let decoded = decode_frame(&encode_sample16(word)).unwrap();
        assert_eq!(decoded.value(), word);
    }
    assert_eq!(encode_sample16((-17i16).unsigned_abs()), encode_sample16(17));
}

#[test]
fn test_random_single_error_per_codeword() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..1000 {
        let value: u16 = rng.gen();
        let mut frame = encode_sample16(value);

        // One flipped bit in each of the four codewords
        let bits = frame.view_bits_mut::<Msb0>();
        for unit in 0..4 {
            let idx = unit * 7 + rng.gen_range(0..7);
            let old = bits[idx];
            bits.set(idx, !old);
        }

        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.value(), value);
        assert_eq!(decoded.corrections(), 4);
    }
}

#[test]
fn test_random_double_error_is_not_reliable() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut wrong = 0;

    for _ in 0..200 {
        let unit = DataUnit::from_nibble(rng.gen_range(0..16));
        let first = rng.gen_range(1..=7);
        let mut second = rng.gen_range(1..=7);
        while second == first {
            second = rng.gen_range(1..=7);
        }

        let damaged = unit.encode().flip(first).unwrap().flip(second).unwrap();
        let decoded = damaged.decode();

        // Two errors always leave a nonzero syndrome, so a "correction" is always claimed
        assert!(decoded.corrected);
        assert_eq!(decoded.syndrome.value() as usize, first ^ second);
        if decoded.data != unit {
            wrong += 1;
        }
    }

    // Flips a, b and a^b form another codeword, so the data is always wrong
    assert_eq!(wrong, 200);
}
