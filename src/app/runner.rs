use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::http::build_client;
use crate::metrics::{Metrics, RunInfo, RunReport, setup_metrics_collector};
use crate::shutdown::shutdown_channel;
use crate::shutdown_handlers::setup_signal_shutdown_handler;
use crate::swarm::spawn_swarm;
use crate::user::UserContext;

use super::plan::RunPlan;

/// Buffered samples between virtual users and the collector.
const METRICS_CHANNEL_CAPACITY: usize = 10_000;

/// Runs the swarm against the plan's host until shutdown and returns the
/// final statistics.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built, a background task
/// panics, or statistics cannot be recorded.
pub async fn run_plan(plan: &RunPlan) -> AppResult<RunReport> {
    let client = build_client(plan.client)?;
    let (shutdown_tx, _) = shutdown_channel();
    let (metrics_tx, metrics_rx) = mpsc::channel::<Metrics>(METRICS_CHANNEL_CAPACITY);
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let task_names: Vec<&str> = plan.tasks.iter().map(|task| task.kind().as_str()).collect();
    info!(
        host = plan.host.as_str(),
        users = plan.swarm.users,
        spawn_rate = plan.swarm.spawn_rate,
        tasks = task_names.join(",").as_str(),
        "Starting load run"
    );

    let run_start = Instant::now();
    let context = UserContext {
        host: Arc::new(plan.host.clone()),
        tasks: Arc::from(plan.tasks.as_slice()),
        client,
        metrics_tx,
    };
    let swarm = spawn_swarm(plan.swarm, &context, &shutdown_tx);
    // Only the users hold senders now, so the collector notices when the
    // last one retires.
    drop(context);

    let collector = setup_metrics_collector(
        plan.collector,
        run_start,
        &shutdown_tx,
        metrics_rx,
        Arc::clone(&swarm.running_users),
    );

    let table = collector.await??;
    let duration = run_start.elapsed();
    drop(shutdown_tx.send(()));

    swarm.handle.await?;
    if let Err(err) = signal_handle.await {
        warn!("Signal handler task failed: {}", err);
    }

    let info = RunInfo {
        host: plan.host.to_string(),
        users: plan.swarm.users,
        duration,
    };
    let report = table.into_report(&info)?;
    info!(
        requests = report.aggregated.requests,
        failures = report.aggregated.failures,
        "Load run finished"
    );
    Ok(report)
}
