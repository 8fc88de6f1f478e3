use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use git_ewah::{and, or, EwahBitmap};

fn sparse_bitmap(bit_size: u64, step: u64) -> EwahBitmap {
    let mut b = EwahBitmap::new();
    let mut i = 0;
    while i < bit_size {
        b.set(i);
        i += step;
    }
    b
}

fn bench_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder");
    group.throughput(Throughput::Elements(100_000));

    group.bench_function("set_sparse_100k", |b| {
        b.iter(|| sparse_bitmap(black_box(100_000 * 64), black_box(64)))
    });

    group.bench_function("add_empty_words_1m", |b| {
        b.iter(|| {
            let mut bm = EwahBitmap::new();
            bm.add_empty_words(black_box(false), black_box(1_000_000));
            bm
        })
    });

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let bm = sparse_bitmap(10_000 * 64, 64);

    let mut group = c.benchmark_group("iteration");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("word_iter_10k_words", |b| {
        b.iter(|| black_box(&bm).word_iter().count())
    });

    group.bench_function("bit_iter_10k_bits", |b| {
        b.iter(|| black_box(&bm).bit_iter().count())
    });

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let a = sparse_bitmap(50_000 * 64, 64);
    let b = sparse_bitmap(50_000 * 64, 96);

    let mut group = c.benchmark_group("combine");

    group.bench_function("or_50k_words", |bch| bch.iter(|| or(black_box(&a), black_box(&b))));
    group.bench_function("and_50k_words", |bch| bch.iter(|| and(black_box(&a), black_box(&b))));

    group.finish();
}

criterion_group!(benches, bench_builder, bench_iteration, bench_combine);
criterion_main!(benches);
