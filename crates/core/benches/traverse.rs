use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use tossem_solver_core::cfr::{run_iteration, Table};
use tossem_solver_core::game::TossemState;
use tossem_solver_core::hand_eval::evaluate_best;
use tossem_solver_core::poker::{full_deck, Card};

fn bench_evaluator(c: &mut Criterion) {
    let pool: Vec<Card> = ["As", "Ks", "Qs", "Js", "9d", "8c", "7h", "2d"]
        .iter()
        .map(|s| Card::parse(s).unwrap())
        .collect();
    c.bench_function("evaluate_best_8", |b| {
        b.iter(|| evaluate_best(black_box(&pool)));
    });
}

fn bench_iteration(c: &mut Criterion) {
    c.bench_function("cfr_iteration", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        let mut table = Table::new();
        let mut state = TossemState::from_deck(full_deck());
        b.iter(|| run_iteration(&mut state, &mut rng, &mut table));
    });
}

criterion_group!(benches, bench_evaluator, bench_iteration);
criterion_main!(benches);
