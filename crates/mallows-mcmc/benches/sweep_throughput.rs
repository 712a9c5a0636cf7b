use criterion::{criterion_group, criterion_main, Criterion};

use mallows_core::{Ranking, RankingMatrix};
use mallows_mcmc::{run_mcmc, RunConfig};
use mallows_rank::{distance_cardinalities, Metric};

fn sample_data() -> RankingMatrix {
    let columns = vec![
        Ranking::new(vec![1, 2, 3, 4, 5, 6]).unwrap(),
        Ranking::new(vec![2, 1, 3, 4, 6, 5]).unwrap(),
        Ranking::new(vec![1, 3, 2, 5, 4, 6]).unwrap(),
        Ranking::new(vec![2, 3, 1, 4, 5, 6]).unwrap(),
        Ranking::new(vec![1, 2, 4, 3, 5, 6]).unwrap(),
    ];
    RankingMatrix::new(columns).unwrap()
}

fn bench_sweep(c: &mut Criterion) {
    let data = sample_data();
    let cardinalities = distance_cardinalities(6, Metric::Footrule).unwrap();
    let mut config = RunConfig::default();
    config.nmc = 50;
    config.n_clusters = 2;

    c.bench_function("mallows_sweep", |b| {
        b.iter(|| {
            let _ = run_mcmc(&data, &[], &cardinalities, &config, 42).unwrap();
        })
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
