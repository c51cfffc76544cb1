use chrono::Local;
use clap::Parser;
use log::{debug, info};
use merkle_tree::{BinaryHashTree, HashTree, OddNodePolicy, Result, TreeConfig, splitmix_values};
use rand::Rng;
use sha2::Sha256;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::time::Instant;

mod stat;

use stat::Report;

#[derive(Parser)]
#[command(name = "merkle-bench")]
#[command(about = "Measure tree construction, update and proof throughput")]
struct Args {
  /// Output directory for the CSV reports
  #[arg(index = 1, default_value = ".")]
  dir: PathBuf,

  /// Largest number of leaves
  #[arg(long, default_value_t = 64 * 1024)]
  max_n: usize,

  /// Number of steps between 0 and max-n
  #[arg(long, default_value_t = 8)]
  div: usize,

  /// Repetitions per step
  #[arg(long, default_value_t = 10)]
  loops: usize,

  /// Leaf hashing batches (0 = one per rayon thread)
  #[arg(long, default_value_t = 0)]
  workers: usize,

  /// Hash leaves on the calling thread below this many items
  #[arg(long, default_value_t = merkle_tree::config::DEFAULT_PARALLEL_THRESHOLD)]
  threshold: usize,

  /// Hash a trailing odd node alone instead of promoting it
  #[arg(long)]
  hash_single: bool,
}

impl Args {
  fn config(&self) -> TreeConfig {
    let odd_node = if self.hash_single { OddNodePolicy::HashSingle } else { OddNodePolicy::Promote };
    TreeConfig { parallel_threshold: self.threshold, workers: self.workers, odd_node, ..Default::default() }
  }
}

const OPERATIONS: [&str; 4] = ["build", "update", "prove", "verify"];

fn main() -> Result<()> {
  env_logger::init();
  let args = Args::parse();
  let config = args.config();
  debug!("{config:?}");

  let id = Local::now().format("%Y%m%d%H%M%S").to_string();
  create_dir_all(&args.dir)?;
  println!("Working directory: {:?}", &args.dir);

  let step = (args.max_n / args.div.max(1)).max(1);
  let mut reports = OPERATIONS.map(|_| Report::new());
  let mut rng = rand::rng();
  for n in (step..=args.max_n).step_by(step) {
    let values = splitmix_values(n);
    for _ in 0..args.loops {
      let input = values.clone();
      let t0 = Instant::now();
      let mut tree = BinaryHashTree::<Sha256>::with_config(input, config)?;
      reports[0].add(n, t0.elapsed());

      let index = rng.random_range(0..n);
      let replacement = rng.random::<u64>().to_le_bytes().to_vec();
      let t0 = Instant::now();
      tree.update(index, replacement.clone())?;
      reports[1].add(n, t0.elapsed());

      let t0 = Instant::now();
      let proof = tree.generate_proof(index)?;
      reports[2].add(n, t0.elapsed());

      let t0 = Instant::now();
      tree.verify_path(&proof, &replacement)?;
      reports[3].add(n, t0.elapsed());
    }
    let summary = OPERATIONS.iter().zip(reports.iter()).map(|(op, r)| format!("{op} {}", r.single(n)));
    println!("  n={n}: {}", summary.collect::<Vec<_>>().join("; "));
  }

  for (op, report) in OPERATIONS.iter().zip(reports.iter()) {
    save(report, &args.dir, &id, op)?;
  }
  Ok(())
}

fn save(report: &Report<usize>, dir: &Path, id: &str, op: &str) -> Result<()> {
  let path = dir.join(format!("{id}-{op}.csv"));
  report.save_to_csv(&path)?;
  info!("saved {op} report");
  println!("==> {}", path.to_string_lossy());
  Ok(())
}
