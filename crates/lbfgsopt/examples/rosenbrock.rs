//! Extended Rosenbrock in 100 dimensions with periodic checkpoints.
//!
//! Run with: cargo run -p lbfgsopt --example rosenbrock
//!
//! Progress is logged through `tracing`; set `RUST_LOG=debug` for more detail.
//! A checkpoint is written to `checkpoint.txt` every 10 iterations and picked
//! up again on the next run.

use lbfgsopt::prelude::*;
use tracing_subscriber::EnvFilter;

const DIMENSION: usize = 100;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = LBFGSParams::new()
        .with_checkpoint_interval(10)
        .with_resume(true);
    let mut optimizer = LBFGS::new(params).with_checkpoint_store(FileCheckpoint::default());

    let start = Rosenbrock::standard_start::<f64>(DIMENSION);
    let result = optimizer.optimize(&Rosenbrock::new(), &start)?;

    tracing::info!(
        iterations = result.iterations,
        value = result.value,
        gradient_norm = result.gradient_norm,
        reason = %result.termination_reason,
        elapsed_ms = result.duration.as_millis() as u64,
        "optimization finished"
    );

    println!("Optimization finished in {} iterations.", result.iterations);
    println!("First 10 components of the solution:");
    for (i, value) in result.point.iter().take(10).enumerate() {
        println!("x[{i}] = {value:.6}");
    }

    Ok(())
}
