use hamming_link::ecc::{decode_frame, self_test, split16, FrameEncoder};
use std::env;
use std::process;

fn main() {
    println!("=== HAMMING(7,4) SELF-TEST ===");

    let report = self_test();
    println!("Test data:        {:?}", report.input.bits());
    println!("Encoded:          {:?}", report.encoded.bits());
    println!(
        "Decoded:          {:?}, syndrome: {}, corrected: {}",
        report.clean.data.bits(),
        report.clean.syndrome,
        report.clean.corrected
    );
    println!("With bit 7 flipped: {:?}", report.corrupted.bits());
    println!(
        "Recovered:        {:?}, syndrome: {}, corrected: {}",
        report.recovered.data.bits(),
        report.recovered.syndrome,
        report.recovered.corrected
    );

    if !report.passed() {
        eprintln!("ERROR: self-test failed");
        process::exit(1);
    }
    println!("=== SELF-TEST PASSED ===\n");

    let encoder = FrameEncoder::default();
    for arg in env::args().skip(1) {
        let sample: i16 = match arg.parse() {
            Ok(sample) => sample,
            Err(e) => {
                eprintln!("ERROR: '{}' is not a 16-bit sample: {}", arg, e);
                process::exit(1);
            }
        };

        let word = encoder.word(sample);
        println!("Sample {}: 0x{:04X} = {:016b}b", sample, word, word);
        for (idx, unit) in split16(word).iter().enumerate() {
            println!(
                "  Nibble {}: {:?} = 0x{:X} -> {:?}",
                idx + 1,
                unit.bits(),
                unit.nibble(),
                unit.encode().bits()
            );
        }

        let frame = encoder.encode_sample(sample);
        println!("  Frame: {} {:?}", hex::encode(&frame), frame);

        match decode_frame(&frame) {
            Ok(decoded) => println!("  Check: {}", decoded),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
        println!("{}", "-".repeat(50));
    }
}
