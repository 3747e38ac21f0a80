//! Pentagon closure solver
//!
//! Prints `Result: <m>` on stdout. Diagnostics go to stderr, filtered by
//! `RUST_LOG` (default `pentagon_core=warn`).

use pentagon_core::{solve, SolverConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pentagon_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Configuration from environment
    let config = SolverConfig::from_env();
    info!(
        precision_bits = config.precision_bits,
        display_digits = config.display_digits,
        "starting pentagon solve"
    );

    let solution = solve(&config).map_err(|e| {
        error!(code = e.code(), "solve failed: {}", e);
        e
    })?;
    println!("{}", solution);
    Ok(())
}
