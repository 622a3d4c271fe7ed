use criterion::{criterion_group, criterion_main, Criterion};
use gridpick::fusion::ScoreFuser;
use gridpick::grid::{ClassScoreGrid, CLASS_COUNT, GRID_SIZE};
use gridpick::optimizer::{NoProgress, SearchOptions, Searcher, Trial, TrialParams};
use std::hint::black_box;

fn bench_grid() -> ClassScoreGrid {
    let mut values = Vec::with_capacity(GRID_SIZE * GRID_SIZE * CLASS_COUNT);
    let mut rng = fastrand::Rng::with_seed(12345);
    for i in 0..GRID_SIZE * GRID_SIZE {
        let film = 0.5 + rng.f64() * 0.5;
        let ice = (1.0 - film) * rng.f64();
        let carbon = if i % 37 == 0 { 0.9 } else { 0.0 };
        values.extend_from_slice(&[film, (1.0 - film - ice).max(0.0), ice, carbon]);
    }
    ClassScoreGrid::from_flat(&values).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let grid = bench_grid();
    let fuser = ScoreFuser::default();
    let fused = fuser.run(&grid);
    let params = TrialParams::default();

    c.bench_function("fuse_grid", |b| b.iter(|| fuser.run(black_box(&grid))));

    c.bench_function("single_trial", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            Trial::new(&fused.quality, &fused.candidates, &params, black_box(seed)).run()
        })
    });

    let searcher = Searcher::new(SearchOptions {
        trials: 5000,
        ..Default::default()
    });
    c.bench_function("search_5000_trials", |b| {
        b.iter(|| {
            searcher
                .run(&fused.quality, &fused.candidates, black_box(42), NoProgress)
                .unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
