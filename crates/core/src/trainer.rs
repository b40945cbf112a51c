//! Batched parallel training.
//!
//! Each batch fans `threads` workers out over the rayon pool. A worker owns
//! a private [`Table`] and a deterministically seeded RNG, runs its share of
//! iterations, and hands the table back; the orchestrator folds worker
//! tables into the global table in worker order and is the only thread that
//! ever touches it. No locks are taken during traversal.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cfr::{run_iteration, Table};
use crate::error::SolverError;
use crate::game::TossemState;
use crate::poker::full_deck;
use crate::strategy;

/// Default total outer iterations.
pub const DEFAULT_ITERATIONS: i64 = 1_000_000;
/// Default per-thread batch size hint.
pub const DEFAULT_BATCH_SIZE: i64 = 20_000;
/// Default iteration interval between checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: i64 = 500_000;
/// Default artifact path.
pub const DEFAULT_OUTPUT_PATH: &str = "cfr_strategy.bin";

/// Training run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Total outer iterations (one fresh deal, two traversals each).
    pub iterations: i64,
    /// Worker thread count.
    pub threads: usize,
    /// Per-thread batch size hint.
    pub batch_size: i64,
    /// Iterations between checkpoint files.
    pub checkpoint_interval: i64,
    /// Final artifact path; checkpoints append `.checkpoint_<N>k`.
    pub output_path: PathBuf,
    /// Fixed seed source for reproducible runs; `None` draws OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            threads: default_threads(),
            batch_size: DEFAULT_BATCH_SIZE,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            seed: None,
        }
    }
}

/// Hardware concurrency minus one, floor one.
#[must_use]
pub fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().saturating_sub(1).max(1))
}

/// Progress snapshot delivered to the batch observer.
#[derive(Debug, Clone, Copy)]
pub struct BatchStats {
    /// Iterations completed so far.
    pub done: i64,
    /// Target iteration count.
    pub target: i64,
    /// Iterations completed by this batch.
    pub batch_iterations: i64,
    /// This batch's iterations per second.
    pub batch_rate: f64,
    /// Whole-run iterations per second.
    pub total_rate: f64,
    /// Information sets in the global table after the merge.
    pub info_sets: usize,
}

/// The training orchestrator.
pub struct Trainer {
    config: TrainerConfig,
    seed_source: u64,
    global: Table,
    done: i64,
}

impl Trainer {
    /// Build a trainer; draws the seed source now so a whole run shares it.
    #[must_use]
    pub fn new(config: TrainerConfig) -> Self {
        let seed_source = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            seed_source,
            global: Table::new(),
            done: 0,
        }
    }

    /// Run to completion.
    ///
    /// Invokes `on_batch` after every merge, writes a checkpoint whenever
    /// `checkpoint_interval` iterations have passed since the last one, and
    /// writes the final artifact at the configured output path.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Config`] for a zero thread count or negative
    /// iteration target, and [`SolverError::Io`] when a checkpoint or the
    /// final artifact cannot be written.
    pub fn run<F: FnMut(&BatchStats)>(&mut self, mut on_batch: F) -> Result<(), SolverError> {
        if self.config.threads == 0 {
            return Err(SolverError::Config("thread count must be positive".into()));
        }
        if self.config.iterations < 0 {
            return Err(SolverError::Config(
                "iteration target must be non-negative".into(),
            ));
        }

        let started = Instant::now();
        let mut last_checkpoint = 0i64;

        while self.done < self.config.iterations {
            let batch_started = Instant::now();
            let batch_iterations = self.run_batch();

            let stats = BatchStats {
                done: self.done,
                target: self.config.iterations,
                batch_iterations,
                batch_rate: rate(batch_iterations, batch_started.elapsed().as_secs_f64()),
                total_rate: rate(self.done, started.elapsed().as_secs_f64()),
                info_sets: self.global.len(),
            };
            on_batch(&stats);

            if self.done - last_checkpoint >= self.config.checkpoint_interval {
                strategy::save(&self.checkpoint_path(), &self.global, self.done)?;
                last_checkpoint = self.done;
            }
        }

        strategy::save(&self.config.output_path, &self.global, self.done)
    }

    /// One batch: fan workers out, join, merge in worker order.
    fn run_batch(&mut self) -> i64 {
        let per_worker = per_worker_iterations(
            self.config.batch_size,
            self.config.iterations - self.done,
            self.config.threads,
        );
        let seed_source = self.seed_source;
        let done = self.done;

        let tables: Vec<Table> = (0..self.config.threads)
            .into_par_iter()
            .map(|worker| run_worker(per_worker, worker_seed(seed_source, done, worker)))
            .collect();

        for table in &tables {
            self.global.merge_from(table);
        }

        #[allow(clippy::cast_possible_wrap)]
        let batch_iterations = per_worker * self.config.threads as i64;
        self.done += batch_iterations;
        batch_iterations
    }

    fn checkpoint_path(&self) -> PathBuf {
        let mut name: OsString = self.config.output_path.as_os_str().to_os_string();
        name.push(format!(".checkpoint_{}k", self.done / 1000));
        PathBuf::from(name)
    }

    /// The merged global table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.global
    }

    /// Iterations completed so far.
    #[must_use]
    pub fn iterations_done(&self) -> i64 {
        self.done
    }
}

/// Batch share per worker: `max(1, min(batch_hint, remaining / threads + 1))`.
fn per_worker_iterations(batch_hint: i64, remaining: i64, threads: usize) -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let fair_share = remaining / threads as i64 + 1;
    batch_hint.min(fair_share).max(1)
}

/// Seed for one worker in one batch: `seed_source ^ (done + worker * 1337)`.
fn worker_seed(seed_source: u64, done: i64, worker: usize) -> u64 {
    #[allow(clippy::cast_sign_loss)]
    let counter = done as u64;
    seed_source ^ counter.wrapping_add(worker as u64 * 1337)
}

/// One worker: a private table and RNG, `iterations` fresh deals.
fn run_worker(iterations: i64, seed: u64) -> Table {
    let mut table = Table::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = TossemState::from_deck(full_deck());
    for _ in 0..iterations {
        run_iteration(&mut state, &mut rng, &mut table);
    }
    table
}

fn rate(iterations: i64, seconds: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let iterations = iterations as f64;
    iterations / seconds.max(1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_worker_honors_hint_remaining_and_floor() {
        // Hint caps the share.
        assert_eq!(per_worker_iterations(20_000, 1_000_000, 4), 20_000);
        // Tail of the run divides the remainder.
        assert_eq!(per_worker_iterations(20_000, 100, 4), 26);
        // Never zero, even with nothing left.
        assert_eq!(per_worker_iterations(20_000, 0, 4), 1);
    }

    #[test]
    fn worker_seeds_follow_the_xor_schedule() {
        assert_eq!(worker_seed(0, 0, 0), 0);
        assert_eq!(worker_seed(0xFF, 10, 2), 0xFF ^ (10 + 2 * 1337));
        // Distinct workers in a batch get distinct seeds.
        let seeds: Vec<u64> = (0..8).map(|w| worker_seed(42, 100, w)).collect();
        let unique: std::collections::HashSet<_> = seeds.iter().collect();
        assert_eq!(unique.len(), seeds.len());
    }

    #[test]
    fn workers_with_equal_seeds_build_equal_tables() {
        let a = run_worker(3, 1234);
        let b = run_worker(3, 1234);
        assert_eq!(a.len(), b.len());
        for (key, node) in a.iter() {
            assert_eq!(b.get(key), Some(node));
        }
    }

    #[test]
    fn zero_threads_is_a_config_error() {
        let config = TrainerConfig {
            threads: 0,
            iterations: 10,
            ..TrainerConfig::default()
        };
        let mut trainer = Trainer::new(config);
        match trainer.run(|_| {}) {
            Err(SolverError::Config(_)) => {}
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn default_threads_is_at_least_one() {
        assert!(default_threads() >= 1);
    }
}
