use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use partition_mapping::config::Config;
use partition_mapping::util::{validate_instance_id, validate_partitions};
use partition_mapping::{MappingCoordinator, Partition};

/// One line of input: the partitions to cover and the live consumers.
#[derive(Debug, Deserialize)]
struct RebalanceRequest {
    partitions: Vec<Partition>,
    consumers: Vec<String>,
}

/// Replays newline-delimited rebalance requests from stdin against a single
/// coordinator and prints each resulting mapping as a JSON line on stdout.
fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::init_with_defaults()
        .context("Failed to load configuration from environment variables")?;
    info!(?config, "configuration loaded");

    let coordinator = MappingCoordinator::from_config(&config)
        .context("Failed to build the mapping coordinator")?;

    let mut stdout = io::stdout().lock();
    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let request: RebalanceRequest = serde_json::from_str(&line)
            .with_context(|| format!("Invalid rebalance request on line {line_no}"))?;
        validate_partitions(coordinator.ring_size(), &request.partitions)
            .with_context(|| format!("Invalid partitions on line {line_no}"))?;
        for id in &request.consumers {
            validate_instance_id(id)
                .with_context(|| format!("Invalid consumer on line {line_no}"))?;
        }

        let outcome = coordinator.rebalance(&request.partitions, &request.consumers);
        info!(line = line_no, ?outcome, "processed rebalance request");

        serde_json::to_writer(&mut stdout, coordinator.current().as_ref())
            .context("Failed to write mapping")?;
        writeln!(stdout)?;
    }

    Ok(())
}
