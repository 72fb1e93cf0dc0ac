//! Criterion benchmarks for the stress engine.
//!
//! Benchmarks cover:
//! - Correlated path generation across underlying counts
//! - Per-account revaluation across path counts

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use margin_core::types::{Exchange, Side, Variety};
use margin_models::holdings::{FutureTerms, Leg};
use margin_risk::reval::evaluate_account_paths;
use margin_risk::{
    generate_return_paths, CovarianceTable, DriftTable, StressConfig, UnderlyingIndex,
};

fn synthetic_legs(n_varieties: usize) -> Vec<Leg> {
    (0..n_varieties)
        .map(|i| {
            let variety = format!("V{}", i);
            Leg::future(
                "BENCH",
                format!("{}2401.DCE", variety),
                if i % 2 == 0 { Side::Long } else { Side::Short },
                (i % 5 + 1) as u64,
                Exchange::Dce,
                Variety::new(&variety),
                FutureTerms {
                    multiplier: 10.0,
                    close_price: 3000.0 + 100.0 * i as f64,
                    last_tradedate: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
                },
                0.08,
            )
        })
        .collect()
}

fn synthetic_cov(n_varieties: usize) -> CovarianceTable {
    let labels: Vec<String> = (0..n_varieties).map(|i| format!("V{}", i)).collect();
    let mut data = vec![0.0; n_varieties * n_varieties];
    for i in 0..n_varieties {
        data[i * n_varieties + i] = 0.2 + 0.01 * i as f64;
        for j in (i + 1)..n_varieties {
            data[i * n_varieties + j] = 0.3;
        }
    }
    CovarianceTable::new(labels, data)
}

fn bench_path_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_generation");
    for n_varieties in [1, 4, 16] {
        let legs = synthetic_legs(n_varieties);
        let index = UnderlyingIndex::from_legs(&legs);
        let cov = synthetic_cov(n_varieties);
        let config = StressConfig::builder()
            .n_paths(10_000)
            .seed(20)
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(n_varieties),
            &n_varieties,
            |b, _| {
                b.iter(|| {
                    generate_return_paths(&index, &cov, &DriftTable::new(), &config).unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_account_revaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("account_revaluation");
    let legs = synthetic_legs(8);
    let leg_refs: Vec<&Leg> = legs.iter().collect();
    let index = UnderlyingIndex::from_legs(&legs);
    let cov = synthetic_cov(8);
    for n_paths in [1_000, 10_000, 100_000] {
        let config = StressConfig::builder()
            .n_paths(n_paths)
            .seed(20)
            .build()
            .unwrap();
        let paths =
            generate_return_paths(&index, &cov, &DriftTable::new(), &config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n_paths), &n_paths, |b, _| {
            b.iter(|| evaluate_account_paths(&leg_refs, &paths, &index))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_path_generation, bench_account_revaluation);
criterion_main!(benches);
