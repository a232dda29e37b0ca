//! Direct-execution entry point for the smoke harness.
//!
//! Runs one full session against the local helper with default
//! configuration. Exit status is nonzero on any fatal error and zero on
//! normal completion through the disposal step.
//!
//! Usage:
//!   cargo run
//!   RUST_LOG=helper_harness=debug cargo run

// ============================================================================
// Imports
// ============================================================================

use helper_harness::{Result, Session, SessionConfig};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = SessionConfig::new();
    let session = Session::new(config)?;

    let report = session.run().await?;

    println!("Total frames: {}", report.frames);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Initialize tracing/logging.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("helper_harness=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
