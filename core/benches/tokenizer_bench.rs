use criterion::{criterion_group, criterion_main, Criterion};
use wordstat_core::stats::compute_document_stats;
use wordstat_core::tokenizer::words_lowercased;

const TEXT: &str = "It was the best of times, it was the worst of times, it was the age of \
wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch of \
incredulity, it was the season of Light, it was the season of Darkness.";

fn bench_tokenize(c: &mut Criterion) {
    let text = TEXT.repeat(64);
    c.bench_function("words_lowercased", |b| b.iter(|| words_lowercased(&text)));
    c.bench_function("compute_document_stats", |b| b.iter(|| compute_document_stats(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
