//! Headless run of the segregation model: ticks until equilibrium or Ctrl+C,
//! logging a status line after every tick.
//!
//! Run with `cargo run -p schelling-runner --example headless`.

use anyhow::Result;
use schelling_core::{RunnerConfig, SimulationConfig};
use schelling_runner::{telemetry, SimulationRunner};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let runner_config = RunnerConfig {
        tick_delay_ms: 50,
        ..Default::default()
    };
    telemetry::init_tracing(&runner_config.telemetry)?;

    let simulation = match std::env::var("SCHELLING_CONFIG") {
        Ok(json) => SimulationConfig::from_json_str(&json)?,
        Err(_) => SimulationConfig::default(),
    };
    info!(parameters = ?simulation.parameters, seed = ?simulation.seed, "Starting headless run");

    let mut runner = SimulationRunner::from_config(simulation, &runner_config)?;
    let mut updates = runner.subscribe();
    let reporter = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let status = updates.borrow().clone();
            info!(
                tick = status.tick_count,
                unhappy = status.unhappy_count,
                unhappy_percent = format!("{:.1}%", status.census.unhappy_percent(status.unhappy_count)),
                "Status"
            );
        }
    });

    runner.start();
    let finished = tokio::select! {
        res = runner.wait() => Some(res),
        _ = signal::ctrl_c() => None,
    };
    let outcome = match finished {
        Some(res) => res,
        None => {
            info!("Interrupted; stopping");
            runner.stop();
            runner.wait().await
        }
    };
    if let Err(e) = outcome {
        error!(error = %e, ticks = runner.status().tick_count, "Run failed");
        return Err(e.into());
    }

    let status = runner.status();
    info!(
        ticks = status.tick_count,
        kind_a = status.census.kind_a,
        kind_b = status.census.kind_b,
        empty = status.census.empty,
        "Run finished"
    );

    drop(runner);
    reporter.await?;
    Ok(())
}
