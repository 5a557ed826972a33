//! ocr-eval - Batch OCR evaluation harness
//!
//! Scores a black-box OCR engine against a labeled dataset split and writes a
//! per-sample correctness CSV for later analysis.

mod config;
mod dataset;
mod eval;
mod ocr;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::EvalConfig;
use crate::dataset::Split;

/// Evaluate an OCR engine on a labeled dataset split
#[derive(Parser, Debug)]
#[command(name = "ocr-eval")]
#[command(about = "Score a black-box OCR engine against a labeled dataset split")]
struct Args {
    /// Which split to evaluate
    #[arg(long, value_enum, default_value_t = Split::Val)]
    split: Split,

    /// OCR language (japan, korean, thai, arabic, etc.)
    #[arg(long, default_value = "japan")]
    lang: String,

    /// Enable GPU if available
    #[arg(long = "use_gpu")]
    use_gpu: bool,

    /// Minimum confidence to accept a prediction (0~1)
    #[arg(long = "rec_thresh", default_value_t = 0.0)]
    rec_thresh: f64,

    /// Path to a TOML settings file (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Pin library thread pools before anything else touches them.
    init_runtime_env();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    if !(0.0..=1.0).contains(&args.rec_thresh) {
        anyhow::bail!("--rec_thresh must be within [0, 1], got {}", args.rec_thresh);
    }

    let cfg = load_or_default_config(args.config.as_deref());
    cfg.data.ensure_dirs().context("Failed to create data directories")?;

    let split_csv = cfg.data.split_csv_path(args.split);
    let rows = dataset::load_split(&split_csv)?;
    info!("Loaded {} rows from {}", rows.len(), split_csv.display());

    info!(
        "Loading OCR engine (requested lang={}, use_gpu={}) ...",
        args.lang, args.use_gpu
    );
    let (engine, mode) = ocr::build_engine(&cfg.engine, &args.lang, args.use_gpu)
        .context("All engine construction modes failed")?;
    info!("[build_engine] success with mode: {mode}");

    let records = eval::evaluate_split(&engine, &rows, args.rec_thresh, true);

    let out_csv = cfg.data.eval_csv_path(args.split);
    report::write_eval(&out_csv, &records)?;
    info!("Eval saved: {} (rows={})", out_csv.display(), records.len());

    Ok(())
}

/// Set single-threaded MKL/OMP environment for this process and its children;
/// Paddle's MKL runtime misbehaves under the defaults.
fn init_runtime_env() {
    for (key, value) in [
        ("KMP_DUPLICATE_LIB_OK", "TRUE"),
        ("MKL_NUM_THREADS", "1"),
        ("NUMEXPR_NUM_THREADS", "1"),
        ("OMP_NUM_THREADS", "1"),
        ("MKL_THREADING_LAYER", "GNU"),
    ] {
        std::env::set_var(key, value);
    }
}

/// Load configuration from file or fall back to defaults
fn load_or_default_config(path: Option<&std::path::Path>) -> EvalConfig {
    if let Some(path) = path {
        match config::load_config(path) {
            Ok(cfg) => {
                info!("Loaded configuration from {}", path.display());
                return cfg;
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}; using defaults", path.display());
            }
        }
    }
    EvalConfig::default()
}
