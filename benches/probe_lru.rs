use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use probecache::policy::probe_lru::ProbeLruCache;
use probecache::traits::{CoreCache, LruCacheTrait};

fn warm_cache(capacity: usize) -> ProbeLruCache<u64, u64> {
    let mut cache = ProbeLruCache::new(capacity);
    for i in 0..(capacity as u64 - 1) {
        cache.insert(i, i);
    }
    cache
}

fn bench_insert_get(c: &mut Criterion) {
    c.bench_function("probe_lru_insert_get", |b| {
        b.iter_batched(
            || warm_cache(1024),
            |mut cache| {
                for i in 0..1023u64 {
                    cache.insert(std::hint::black_box(i + 10_000), i);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_eviction_churn(c: &mut Criterion) {
    c.bench_function("probe_lru_eviction_churn", |b| {
        b.iter_batched(
            || warm_cache(1024),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.insert(std::hint::black_box(10_000 + i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_touch_hotset(c: &mut Criterion) {
    c.bench_function("probe_lru_touch_hotset", |b| {
        b.iter_batched(
            || warm_cache(4096),
            |mut cache| {
                for i in 0..4095u64 {
                    let _ = std::hint::black_box(cache.touch(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pop_lru_drain(c: &mut Criterion) {
    c.bench_function("probe_lru_pop_lru_drain", |b| {
        b.iter_batched(
            || warm_cache(1024),
            |mut cache| {
                while let Some(pair) = cache.pop_lru() {
                    std::hint::black_box(pair);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_insert_get,
    bench_eviction_churn,
    bench_touch_hotset,
    bench_pop_lru_drain
);
criterion_main!(benches);
