use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use used_car_pricing::optimizer::{GridSearch, SearchConfig};
use used_car_pricing::preprocessing::FeatureConfig;
use used_car_pricing::training::Pipeline;

fn create_vehicle_features(n_rows: usize) -> (DataFrame, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let fuels = ["Petrol", "Diesel", "CNG"];

    let ages: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(0..=15) as f64).collect();
    let kms: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(1_000.0..150_000.0)).collect();
    let selling: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(0.5..20.0)).collect();
    let owner: Vec<i64> = (0..n_rows).map(|_| rng.gen_range(0..3)).collect();
    let fuel: Vec<&str> = (0..n_rows).map(|_| fuels[rng.gen_range(0..3)]).collect();
    let seller: Vec<&str> = (0..n_rows)
        .map(|_| if rng.gen_bool(0.6) { "Dealer" } else { "Individual" })
        .collect();
    let trans: Vec<&str> = (0..n_rows)
        .map(|_| if rng.gen_bool(0.8) { "Manual" } else { "Automatic" })
        .collect();

    let y: Array1<f64> = (0..n_rows)
        .map(|i| 1.2 * selling[i] - 0.3 * ages[i] - kms[i] * 1e-5 + rng.gen::<f64>() * 0.5)
        .collect();

    let df = df!(
        "Selling_Price" => selling,
        "Driven_Kms" => kms,
        "Fuel_Type" => fuel,
        "Selling_type" => seller,
        "Transmission" => trans,
        "Owner" => owner,
        "Age" => ages
    )
    .unwrap();
    (df, y)
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);

    for n_rows in [300, 1000, 5000].iter() {
        let (x, y) = create_vehicle_features(*n_rows);
        let pipeline = Pipeline::from_frame(&x, &FeatureConfig::default(), 1).unwrap();

        group.bench_with_input(BenchmarkId::new("search", n_rows), &(x, y), |b, (x, y)| {
            b.iter(|| {
                GridSearch::new(SearchConfig::default())
                    .search(black_box(&pipeline), black_box(x), black_box(y))
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_pipeline_fit(c: &mut Criterion) {
    let (x, y) = create_vehicle_features(5000);
    let pipeline = Pipeline::from_frame(&x, &FeatureConfig::default(), 6).unwrap();

    c.bench_function("pipeline_fit_5000", |b| {
        b.iter(|| pipeline.fit(black_box(&x), black_box(&y)).unwrap())
    });
}

criterion_group!(benches, bench_grid_search, bench_pipeline_fit);
criterion_main!(benches);
