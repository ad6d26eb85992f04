//! Minimal composition root: logs a line at the top of every minute and at
//! every quarter-hour until ctrl-c.
//!
//! ```sh
//! cargo run -p chime-scheduler --example minute_ticker
//! ```

use std::time::Duration;

use chime_core::{SystemClock, TimeChangeNotifier};
use chime_scheduler::SchedulerEngine;
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,chime_scheduler=debug")),
        )
        .init();

    let notifier = TimeChangeNotifier::new();
    let (engine, scheduler) = SchedulerEngine::new(SystemClock, notifier.subscribe());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));

    // 100 ms past the boundary, clear of the system clock's own rollover.
    scheduler.add_minute_callback(
        || info!(now = %chrono::Local::now().format("%H:%M:%S%.3f"), "minute tick"),
        Duration::from_millis(100),
    )?;
    scheduler.add_quarter_hour_callback(|| {
        info!(now = %chrono::Local::now().format("%H:%M:%S"), "quarter-hour tick");
    })?;

    info!("ticking; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    shutdown_tx.send(true)?;
    engine_task.await?;
    Ok(())
}
