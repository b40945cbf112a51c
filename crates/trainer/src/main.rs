//! Toss'em Hold'em MCCFR trainer CLI.
//!
//! Runs the batched parallel trainer and writes the V2 strategy artifact,
//! with periodic checkpoints and a live throughput readout.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use tossem_solver_core::trainer::{
    default_threads, Trainer, TrainerConfig, DEFAULT_BATCH_SIZE, DEFAULT_CHECKPOINT_INTERVAL,
    DEFAULT_ITERATIONS, DEFAULT_OUTPUT_PATH,
};

#[derive(Parser)]
#[command(name = "tossem-trainer")]
#[command(about = "Train a Toss'em Hold'em betting policy with external-sampling MCCFR")]
struct Cli {
    /// Total outer iterations
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    iters: i64,

    /// Worker thread count (default: hardware concurrency - 1)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Batch size hint per thread
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch: i64,

    /// Iteration interval between checkpoints
    #[arg(short, long, default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    checkpoint: i64,

    /// Final artifact path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    out: PathBuf,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let threads = cli.threads.unwrap_or_else(default_threads).max(1);

    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    println!("Toss'em Hold'em MCCFR trainer (V2 artifact)");
    println!(
        "  iters={} threads={threads} batch={} checkpoint={} out={}",
        cli.iters,
        cli.batch,
        cli.checkpoint,
        cli.out.display()
    );

    let config = TrainerConfig {
        iterations: cli.iters,
        threads,
        batch_size: cli.batch,
        checkpoint_interval: cli.checkpoint,
        output_path: cli.out.clone(),
        seed: cli.seed,
    };

    #[allow(clippy::cast_sign_loss)]
    let bar = ProgressBar::new(cli.iters.max(0) as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut trainer = Trainer::new(config);
    trainer.run(|stats| {
        #[allow(clippy::cast_sign_loss)]
        let position = stats.done.min(stats.target) as u64;
        bar.set_position(position);
        bar.set_message(format!(
            "{:.0}/s batch, {:.0}/s total, {} info sets",
            stats.batch_rate, stats.total_rate, stats.info_sets
        ));
    })?;
    bar.finish_and_clear();

    println!(
        "Saved {} ({} nodes, {} iterations)",
        cli.out.display(),
        trainer.table().len(),
        trainer.iterations_done()
    );
    Ok(())
}
