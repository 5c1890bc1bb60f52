use criterion::{criterion_group, criterion_main, Criterion};
use wordstat_core::huffman::{build_codec, decode};

fn bench_codec(c: &mut Criterion) {
    let text = "The quick brown fox jumps over the lazy dog; Съешь же ещё этих мягких булок. ".repeat(128);
    c.bench_function("build_codec", |b| b.iter(|| build_codec(&text).unwrap()));

    let enc = build_codec(&text).unwrap();
    c.bench_function("decode", |b| b.iter(|| decode(&enc.bits, &enc.codebook)));
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
