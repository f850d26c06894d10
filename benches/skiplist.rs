//! Benchmarks for this crate's [`SkipList`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use multiskip::{Builder, SkipList};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Benchmarking sizes.
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// A list of `size` random values with reproducible tower heights.
fn random_list(rng: &mut StdRng, size: usize) -> SkipList<u64> {
    let mut list = Builder::new()
        .seed(0x1234_abcd)
        .build_set()
        .unwrap_or_else(|err| panic!("{err}"));
    list.extend(std::iter::repeat_with(|| rng.random()).take(size));
    list
}

/// Benchmarking insertion.
#[inline]
pub fn insert_equal(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Insert Equal");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut list = random_list(&mut rng, size);

            b.iter(|| {
                list.insert_equal(rng.random());
            });
        });
    }
}

/// Benchmarking lower bound searches.
#[inline]
pub fn lower_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Lower Bound");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let list = random_list(&mut rng, size);
            let probes: Vec<u64> = std::iter::repeat_with(|| rng.random()).take(10).collect();

            b.iter(|| {
                for probe in &probes {
                    black_box(list.lower_bound(probe));
                }
            });
        });
    }
}

/// Benchmarking iteration.
#[inline]
pub fn iter(c: &mut Criterion) {
    c.bench_function("SkipList Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let list = random_list(&mut rng, 100_000);

        b.iter(|| {
            for el in &list {
                black_box(el);
            }
        });
    });
}

/// Benchmarking the extraction of a run followed by merging it back.
#[inline]
pub fn extract_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Extract Merge");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut list = random_list(&mut rng, size);

            b.iter(|| {
                let (lo, hi) = (rng.random::<u64>(), rng.random::<u64>());
                let (lo, hi) = (lo.min(hi), lo.max(hi));
                let run = list
                    .extract_range(list.lower_bound(&lo), list.lower_bound(&hi))
                    .unwrap_or_else(|err| panic!("{err}"));
                list.merge_run(run)
                    .unwrap_or_else(|err| panic!("{err}"));
            });
        });
    }
}
