use std::{collections::VecDeque, hint::black_box, time::Duration};

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use quicklist::QuickList;
use rand::{rngs::SmallRng, Rng, SeedableRng};

const SIZES: [usize; 3] = [1_000usize, 10_000usize, 100_000usize];
const BLOCK_CAPACITIES: [usize; 3] = [16usize, 128usize, 512usize];
const RANDOM_ACCESSES: usize = 1_000;

// Helper: fill containers with sequential integers 0..n-1
fn fill_vec(n: usize) -> Vec<i32> {
    (0..n as i32).collect()
}

fn fill_vecdeque(n: usize) -> VecDeque<i32> {
    (0..n as i32).collect()
}

fn fill_quicklist(
    n: usize,
    block_capacity: usize,
) -> QuickList<i32> {
    let mut q = QuickList::new(block_capacity);
    q.extend(0..n as i32);
    q
}

// Benchmark: bulk push
fn bench_push(c: &mut Criterion) {
    let mut g = c.benchmark_group("push_bulk");
    g.measurement_time(Duration::from_secs(5));
    for &size in SIZES.iter() {
        g.throughput(Throughput::Elements(size as u64));
        g.bench_with_input(BenchmarkId::new("QuickList", size), &size, |b, &n| {
            b.iter(|| {
                let mut q = QuickList::new(128);
                for i in 0..n {
                    q.push(i as i32);
                }
                black_box(q);
            })
        });
        g.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |b, &n| {
            b.iter(|| {
                let mut d = VecDeque::with_capacity(n);
                for i in 0..n {
                    d.push_back(i as i32);
                }
                black_box(d);
            })
        });
        g.bench_with_input(BenchmarkId::new("Vec", size), &size, |b, &n| {
            b.iter(|| {
                let mut v = Vec::with_capacity(n);
                for i in 0..n {
                    v.push(i as i32);
                }
                black_box(v);
            })
        });
    }
    g.finish();
}

// Benchmark: bulk unshift
fn bench_unshift(c: &mut Criterion) {
    let mut g = c.benchmark_group("unshift_bulk");
    g.measurement_time(Duration::from_secs(5));
    for &size in SIZES.iter() {
        g.throughput(Throughput::Elements(size as u64));
        g.bench_with_input(BenchmarkId::new("QuickList", size), &size, |b, &n| {
            b.iter(|| {
                let mut q = QuickList::new(128);
                for i in 0..n {
                    q.unshift(i as i32);
                }
                black_box(q);
            })
        });
        g.bench_with_input(BenchmarkId::new("VecDeque", size), &size, |b, &n| {
            b.iter(|| {
                let mut d = VecDeque::with_capacity(n);
                for i in 0..n {
                    d.push_front(i as i32);
                }
                black_box(d);
            })
        });
    }
    g.finish();
}

// Benchmark: pop / shift draining
fn bench_drain(c: &mut Criterion) {
    let mut g = c.benchmark_group("drain");
    g.measurement_time(Duration::from_secs(5));
    for &size in SIZES.iter() {
        g.throughput(Throughput::Elements(size as u64));
        g.bench_with_input(BenchmarkId::new("QuickList_pop", size), &size, |b, &n| {
            b.iter_batched(
                || fill_quicklist(n, 128),
                |mut q| {
                    while q.pop().is_ok() {}
                    black_box(q);
                },
                BatchSize::LargeInput,
            )
        });
        g.bench_with_input(BenchmarkId::new("QuickList_shift", size), &size, |b, &n| {
            b.iter_batched(
                || fill_quicklist(n, 128),
                |mut q| {
                    while q.shift().is_ok() {}
                    black_box(q);
                },
                BatchSize::LargeInput,
            )
        });
        g.bench_with_input(
            BenchmarkId::new("VecDeque_pop_front", size),
            &size,
            |b, &n| {
                b.iter_batched(
                    || fill_vecdeque(n),
                    |mut d| {
                        while d.pop_front().is_some() {}
                        black_box(d);
                    },
                    BatchSize::LargeInput,
                )
            },
        );
    }
    g.finish();
}

// Benchmark: random get (1000 random reads), по разным ёмкостям блока
fn bench_random_get(c: &mut Criterion) {
    let mut g = c.benchmark_group("random_get_1k");
    g.measurement_time(Duration::from_secs(5));
    let mut rng = SmallRng::seed_from_u64(0xDEADBEEF);

    for &size in SIZES.iter() {
        let indices: Vec<usize> = (0..RANDOM_ACCESSES)
            .map(|_| rng.gen_range(0..size))
            .collect();
        let d = fill_vecdeque(size);

        g.throughput(Throughput::Elements(RANDOM_ACCESSES as u64));

        g.bench_with_input(
            BenchmarkId::new("VecDeque_random_get", size),
            &indices,
            |b, idxs| {
                b.iter(|| {
                    for &i in idxs.iter() {
                        black_box(black_box(&d).get(i));
                    }
                })
            },
        );

        for &capacity in BLOCK_CAPACITIES.iter() {
            let q = fill_quicklist(size, capacity);
            g.bench_with_input(
                BenchmarkId::new(format!("QuickList_random_get/cap{capacity}"), size),
                &indices,
                |b, idxs| {
                    b.iter(|| {
                        for &i in idxs.iter() {
                            black_box(black_box(&q).get(i as isize).ok());
                        }
                    })
                },
            );
        }
    }
    g.finish();
}

// Benchmark: get_range over the middle tenth
fn bench_get_range(c: &mut Criterion) {
    let mut g = c.benchmark_group("get_range");
    g.measurement_time(Duration::from_secs(5));

    for &size in SIZES.iter() {
        let q = fill_quicklist(size, 128);
        let v = fill_vec(size);
        let (start, stop) = (size / 2, size / 2 + size / 10);

        g.throughput(Throughput::Elements((stop - start) as u64));

        g.bench_with_input(BenchmarkId::new("QuickList", size), &q, |b, q| {
            b.iter(|| black_box(q.get_range(start as isize, stop as isize).ok()))
        });
        g.bench_with_input(BenchmarkId::new("Vec_slice_to_vec", size), &v, |b, v| {
            b.iter(|| black_box(v[start..stop].to_vec()))
        });
    }
    g.finish();
}

// Benchmark: remove every 7th value (разделение/слияние блоков)
fn bench_remove_value(c: &mut Criterion) {
    let mut g = c.benchmark_group("remove_value");
    g.measurement_time(Duration::from_secs(5));

    for &size in SIZES.iter() {
        g.throughput(Throughput::Elements(size as u64));
        g.bench_with_input(BenchmarkId::new("QuickList", size), &size, |b, &n| {
            b.iter_batched(
                || {
                    let mut q = QuickList::new(128);
                    q.extend((0..n as i32).map(|i| i % 7));
                    q
                },
                |mut q| {
                    black_box(q.remove(&3));
                    black_box(q);
                },
                BatchSize::LargeInput,
            )
        });
        g.bench_with_input(BenchmarkId::new("Vec_retain", size), &size, |b, &n| {
            b.iter_batched(
                || (0..n as i32).map(|i| i % 7).collect::<Vec<_>>(),
                |mut v| {
                    v.retain(|&x| x != 3);
                    black_box(v);
                },
                BatchSize::LargeInput,
            )
        });
    }
    g.finish();
}

// Benchmark: sequential iterator performance
fn bench_sequential_iter(c: &mut Criterion) {
    let mut g = c.benchmark_group("sequential_iter");
    g.measurement_time(Duration::from_secs(5));

    for &size in SIZES.iter() {
        let v = fill_vec(size);
        let d = fill_vecdeque(size);
        let q = fill_quicklist(size, 128);

        g.throughput(Throughput::Elements(size as u64));

        g.bench_with_input(BenchmarkId::new("Vec_iter", size), &v, |b, v| {
            b.iter(|| {
                for x in v.iter() {
                    black_box(x);
                }
            })
        });
        g.bench_with_input(BenchmarkId::new("VecDeque_iter", size), &d, |b, d| {
            b.iter(|| {
                for x in d.iter() {
                    black_box(x);
                }
            })
        });
        g.bench_with_input(BenchmarkId::new("QuickList_iter", size), &q, |b, q| {
            b.iter(|| {
                for x in q.iter() {
                    black_box(x);
                }
            })
        });
    }
    g.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_push(c);
    bench_unshift(c);
    bench_drain(c);
    bench_random_get(c);
    bench_get_range(c);
    bench_remove_value(c);
    bench_sequential_iter(c);
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(100);
    targets = criterion_benchmark
}
criterion_main!(benches);
