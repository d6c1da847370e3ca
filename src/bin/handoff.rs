//! handoff CLI — run one worker pool to completion.

use clap::Parser;
use handoff::config::Config;
use handoff::engine::{Manager, ManagerConfig};
use handoff::telemetry::{TelemetryConfig, init_telemetry};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "handoff",
    about = "Feed a bounded message stream to a fixed worker pool"
)]
struct Cli {
    /// Worker count (overrides NUM_WORKERS)
    #[arg(long)]
    workers: Option<usize>,
    /// Message count (overrides NUM_MESSAGES)
    #[arg(long)]
    messages: Option<usize>,
    /// Upper bound on each item's simulated processing delay
    #[arg(long, default_value_t = 100)]
    max_delay_ms: u64,
    /// Fail if workers have not all reported within this many seconds
    #[arg(long)]
    drain_timeout_secs: Option<u64>,
    /// Print the run summary as JSON when done
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "handoff".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let mut manager_config = ManagerConfig::from_config(&config);
    if let Some(workers) = cli.workers {
        manager_config.workers = workers;
    }
    if let Some(messages) = cli.messages {
        manager_config.messages = messages;
    }
    manager_config.max_delay = Duration::from_millis(cli.max_delay_ms);
    manager_config.drain_timeout = cli.drain_timeout_secs.map(Duration::from_secs);

    let summary = Manager::new(manager_config).run().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
