use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hamming_link::ecc::{
    decode_frame, decode_frames, decode_frames_par, encode_sample16, encode_samples,
    encode_samples_par, DataUnit,
};

fn bench_block_coder(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming74");
    let unit = DataUnit::from_nibble(0b1011);
    let damaged = unit.encode().flip(7).unwrap();

    group.bench_function("encode", |b| b.iter(|| black_box(unit).encode()));
    group.bench_function("decode_corrupted", |b| {
        b.iter(|| black_box(damaged).decode())
    });
    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    let frame = encode_sample16(0xBEEF);

    group.bench_function("encode_sample16", |b| {
        b.iter(|| encode_sample16(black_box(0xBEEF)))
    });
    group.bench_function("decode_frame", |b| {
        b.iter(|| decode_frame(black_box(&frame)).unwrap())
    });

    let values: Vec<u16> = (0..=u16::MAX).collect();
    let frames = encode_samples(&values);
    group.throughput(Throughput::Elements(values.len() as u64));

    group.bench_function("encode_samples", |b| {
        b.iter(|| encode_samples(black_box(&values)))
    });
    group.bench_function("encode_samples_par", |b| {
        b.iter(|| encode_samples_par(black_box(&values)))
    });
    group.bench_function("decode_frames", |b| {
        b.iter(|| decode_frames(black_box(&frames)).unwrap())
    });
    group.bench_function("decode_frames_par", |b| {
        b.iter(|| decode_frames_par(black_box(&frames)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_block_coder, bench_frames);
criterion_main!(benches);
