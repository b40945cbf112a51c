//! End-to-end training pipeline tests: a short real run through the
//! trainer, the artifact it writes, and reproducibility guarantees.

use std::fs;

use tempfile::tempdir;

use tossem_solver_core::strategy::{self, HEADER_BYTES, NODE_BYTES};
use tossem_solver_core::trainer::{Trainer, TrainerConfig};

fn small_config(out: std::path::PathBuf, threads: usize, seed: u64) -> TrainerConfig {
    TrainerConfig {
        iterations: 24,
        threads,
        batch_size: 8,
        checkpoint_interval: i64::MAX,
        output_path: out,
        seed: Some(seed),
    }
}

#[test]
fn training_writes_a_v2_artifact() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("strategy.bin");

    let mut trainer = Trainer::new(small_config(out.clone(), 2, 7));
    let mut batches = 0;
    trainer.run(|stats| {
        batches += 1;
        assert!(stats.batch_iterations > 0);
        assert!(stats.done <= stats.target + stats.batch_iterations);
    }).unwrap();

    assert!(batches > 0);
    assert!(trainer.iterations_done() >= 24);
    assert!(!trainer.table().is_empty());

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[0..4], &[0x53, 0x53, 0x4F, 0x54], "LE \"TOSS\" magic");
    assert_eq!(&bytes[4..8], &[2, 0, 0, 0], "version 2");

    let num_nodes = u64::from_le_bytes(bytes[16..24].try_into().unwrap());
    assert_eq!(num_nodes as usize, trainer.table().len());
    assert_eq!(bytes.len(), HEADER_BYTES + trainer.table().len() * NODE_BYTES);
}

#[test]
fn trained_artifact_roundtrips() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("strategy.bin");

    let mut trainer = Trainer::new(small_config(out.clone(), 2, 11));
    trainer.run(|_| {}).unwrap();

    let (loaded, iterations) = strategy::load(&out).unwrap();
    assert_eq!(iterations, trainer.iterations_done());
    assert_eq!(loaded.len(), trainer.table().len());
    for (key, node) in trainer.table().iter() {
        assert_eq!(loaded.get(key), Some(node), "mismatch at {key:?}");
    }
}

#[test]
fn no_discard_street_is_ever_trained() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("strategy.bin");

    let mut trainer = Trainer::new(small_config(out, 1, 13));
    trainer.run(|_| {}).unwrap();

    for (key, _) in trainer.table().iter() {
        assert_ne!(key.street, 2, "BB discard key in table");
        assert_ne!(key.street, 3, "SB discard key in table");
    }
}

#[test]
fn single_threaded_runs_with_one_seed_are_byte_identical() {
    let dir = tempdir().unwrap();
    let out_a = dir.path().join("a.bin");
    let out_b = dir.path().join("b.bin");

    Trainer::new(small_config(out_a.clone(), 1, 99))
        .run(|_| {})
        .unwrap();
    Trainer::new(small_config(out_b.clone(), 1, 99))
        .run(|_| {})
        .unwrap();

    let a = fs::read(&out_a).unwrap();
    let b = fs::read(&out_b).unwrap();
    assert_eq!(a, b, "same seed, same thread count, different bytes");
}

#[test]
fn checkpoints_use_the_thousands_suffix() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("strategy.bin");

    let config = TrainerConfig {
        iterations: 16,
        threads: 1,
        batch_size: 8,
        checkpoint_interval: 8,
        output_path: out.clone(),
        seed: Some(5),
    };
    Trainer::new(config).run(|_| {}).unwrap();

    // 16 iterations in batches of 8: checkpoints after each batch, both
    // below 1k so the suffix rounds down to 0k.
    let checkpoint = dir.path().join("strategy.bin.checkpoint_0k");
    assert!(checkpoint.exists(), "missing {}", checkpoint.display());
    assert!(out.exists());

    let (table, iterations) = strategy::load(&checkpoint).unwrap();
    assert!(iterations >= 8);
    assert!(!table.is_empty());
}
