use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mmvec::{ElementType, MappedVector};
use tempfile::tempdir;

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    for batch in [1usize, 64, 1024] {
        let values: Vec<String> = (0..batch).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = values.iter().map(|s| s.as_str()).collect();

        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("batched", batch), &refs, |b, refs| {
            let dir = tempdir().unwrap();
            let mut v =
                MappedVector::open(dir.path().join("bench.mmap"), ElementType::Int64, None, true)
                    .unwrap();
            b.iter(|| {
                v.append(refs).unwrap();
            });
        });

        // One append call per element: pays one resize per element instead
        // of one per batch.
        group.bench_with_input(BenchmarkId::new("one_by_one", batch), &refs, |b, refs| {
            let dir = tempdir().unwrap();
            let mut v =
                MappedVector::open(dir.path().join("bench.mmap"), ElementType::Int64, None, true)
                    .unwrap();
            b.iter(|| {
                for r in refs {
                    v.append(&[*r]).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append);
criterion_main!(benches);
