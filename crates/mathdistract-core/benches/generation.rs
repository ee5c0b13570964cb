use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathdistract_core::config::ExperimentConfig;
use mathdistract_core::generator::{
    generate_battery, generate_proposed, prepare_set, seeded_rng, BatterySpec, DeviationTable,
};
use mathdistract_core::model::Operator;

fn bench_battery(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_battery");

    let small = BatterySpec {
        count: 100,
        term_count: 3,
        term_range: 1..=9,
        operators: vec![Operator::Add],
        unique_terms: false,
        exclude_repeats: true,
    };
    group.bench_function("100x3,domain=9", |b| {
        let mut rng = seeded_rng(Some(7));
        b.iter(|| generate_battery(&mut rng, black_box(&small)))
    });

    let unique = BatterySpec {
        count: 100,
        term_count: 5,
        term_range: 1..=20,
        operators: vec![Operator::Add, Operator::Subtract],
        unique_terms: true,
        exclude_repeats: true,
    };
    group.bench_function("100x5,unique,plus-minus", |b| {
        let mut rng = seeded_rng(Some(7));
        b.iter(|| generate_battery(&mut rng, black_box(&unique)))
    });

    group.finish();
}

fn bench_proposed(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_proposed");
    let table = DeviationTable::new(&[0, -10, -1, 1, 10], Some(&[0.5, 0.125, 0.125, 0.125, 0.125]))
        .expect("valid table");

    group.bench_function("answer=15", |b| {
        let mut rng = seeded_rng(Some(11));
        b.iter(|| generate_proposed(&mut rng, black_box(15), &table, false))
    });

    group.bench_function("answer=3,positive-only", |b| {
        let mut rng = seeded_rng(Some(11));
        b.iter(|| generate_proposed(&mut rng, black_box(3), &table, true))
    });

    group.finish();
}

fn bench_prepare_set(c: &mut Criterion) {
    let config = ExperimentConfig::default();
    c.bench_function("prepare_set/default", |b| {
        let mut rng = seeded_rng(Some(3));
        b.iter(|| prepare_set(&mut rng, black_box(&config)))
    });
}

criterion_group!(benches, bench_battery, bench_proposed, bench_prepare_set);
criterion_main!(benches);
