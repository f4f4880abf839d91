use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use webts::analysis::adf::{AugmentedDickeyFuller, UnitRootTest};
use webts::analysis::{BatchDiagnosticsRunner, StationarityClassifier};
use webts::config::StationarityConfig;
use webts::core::{BucketKey, EntityAttributes, EntityRecord, EntityTimeSeriesTable, TimeBucket};
use webts::storage::{MemoryRepository, SeriesRepository};

fn lcg_next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    *state
}

/// Monthly revision counts: a slow random walk with noise, always positive.
fn revision_series(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    let mut level = 50.0;
    (0..n)
        .map(|_| {
            let u = (lcg_next(&mut state) >> 11) as f64 / (1u64 << 53) as f64;
            level = (level + (u - 0.5) * 6.0).max(1.0);
            level
        })
        .collect()
}

fn record(n: usize, seed: u64) -> EntityRecord {
    let buckets = revision_series(n, seed)
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let month = chrono::NaiveDate::from_ymd_opt(2001 + (i / 12) as i32, (i % 12) as u32 + 1, 1)
                .expect("valid month");
            (BucketKey::Month(month), TimeBucket { revision_count: v as i64, size_revision: v * 40.0 })
        })
        .collect();
    EntityRecord {
        name: format!("entity_{}", seed),
        attributes: EntityAttributes { unique_contributors: Some(25), ..Default::default() },
        table: EntityTimeSeriesTable::from_buckets(buckets),
    }
}

fn benchmark_adf(c: &mut Criterion) {
    let adf = AugmentedDickeyFuller::default();
    let mut group = c.benchmark_group("adf");
    for n in [24usize, 120, 600] {
        let series = revision_series(n, 0xfeed_f00d);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, s| {
            b.iter(|| adf.test(black_box(s)).expect("series is long enough"))
        });
    }
    group.finish();
}

fn benchmark_classifier(c: &mut Criterion) {
    let classifier = StationarityClassifier::new(StationarityConfig::default());
    let series = revision_series(120, 0xdead_beef);
    c.bench_function("classify_n120", |b| {
        b.iter(|| classifier.classify(black_box(&series)).expect("series is long enough"))
    });
}

fn benchmark_batch(c: &mut Criterion) {
    let mut repo = MemoryRepository::new();
    for seed in 0..50 {
        repo.store(record(96, seed)).expect("memory store");
    }
    let runner = BatchDiagnosticsRunner::new(StationarityClassifier::new(StationarityConfig::default()));
    c.bench_function("batch_50x96", |b| {
        b.iter(|| runner.run(black_box(&repo)).expect("memory repository"))
    });
}

criterion_group!(benches, benchmark_adf, benchmark_classifier, benchmark_batch);
criterion_main!(benches);
