use criterion::{criterion_group, criterion_main, Criterion};
use srv_resolve::{order_records, SrvRecord};

/// Benchmark the performance of record ordering.
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = rand::rng();

    for size in [4usize, 64, 512] {
        let records: Vec<SrvRecord> = (0..size)
            .map(|i| {
                SrvRecord::new(
                    (i % 4) as u16,
                    (i * 7 % 100) as u16,
                    5060,
                    format!("host-{i}.example.com"),
                )
            })
            .collect();
        let mut group = c.benchmark_group(format!("order {size} records"));
        group.bench_function("order_records", |b| {
            b.iter(|| order_records(records.clone(), &mut rng));
        });
        drop(group);
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
