use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kolosal_tune::training::{KFold, LogisticRegression, SVMClassifier, SVMConfig};
use kolosal_tune::tuning::{Algorithm, GridSearch};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

fn create_classification_data(n_rows: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let y: Array1<f64> = (0..n_rows).map(|i| (i % 3) as f64).collect();
    let x = Array2::from_shape_fn((n_rows, n_features), |(r, c)| {
        let center = if (r % 3) == c % 3 { 2.0 } else { 0.0 };
        center + rng.gen::<f64>() - 0.5
    });
    (x, y)
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10);

    for n_rows in [100, 300].iter() {
        let (x, y) = create_classification_data(*n_rows, 4);
        let search = GridSearch::new(KFold::new(10));

        let lr_grid = Algorithm::LogisticRegression.param_grid();
        group.bench_with_input(BenchmarkId::new("lr", n_rows), n_rows, |b, _| {
            b.iter(|| {
                search
                    .fit(
                        &lr_grid,
                        |p| Ok(LogisticRegression::new().with_c(p.get_f64("C")?)),
                        black_box(&x),
                        black_box(&y),
                    )
                    .unwrap()
            });
        });

        let svm_grid = Algorithm::SupportVector.param_grid();
        for n_jobs in [1, 4] {
            let search = search.clone().with_n_jobs(n_jobs);
            group.bench_with_input(
                BenchmarkId::new(format!("svm_jobs_{}", n_jobs), n_rows),
                n_rows,
                |b, _| {
                    b.iter(|| {
                        search
                            .fit(
                                &svm_grid,
                                |p| {
                                    Ok(SVMClassifier::new(SVMConfig {
                                        c: p.get_f64("C")?,
                                        kernel: p.get_str("kernel")?.parse()?,
                                        ..Default::default()
                                    }))
                                },
                                black_box(&x),
                                black_box(&y),
                            )
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_grid_search);
criterion_main!(benches);
