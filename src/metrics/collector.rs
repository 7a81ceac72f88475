use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::error::MetricsError;
use crate::shutdown::ShutdownSender;

use super::{Metrics, StatsTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    /// Broadcast shutdown once this much time has passed.
    pub run_time: Option<Duration>,
    /// Broadcast shutdown once this many samples were recorded.
    pub request_limit: Option<u64>,
    pub stats_interval: Duration,
}

/// Spawns the task that owns the statistics table.
///
/// The collector is the only consumer of `metrics_rx`. It stops on shutdown,
/// when the run time elapses, when the request limit is reached, or when
/// every sender is gone; samples already queued at that point are still
/// counted.
#[must_use]
pub fn setup_metrics_collector(
    settings: CollectorSettings,
    run_start: Instant,
    shutdown_tx: &ShutdownSender,
    mut metrics_rx: mpsc::Receiver<Metrics>,
    running_users: Arc<AtomicUsize>,
) -> JoinHandle<Result<StatsTable, MetricsError>> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let mut table = StatsTable::new()?;
        // An interval too large to schedule never ticks.
        let first_tick = run_start.checked_add(settings.stats_interval);
        let mut stats_interval = tokio::time::interval_at(
            first_tick.unwrap_or(run_start),
            settings.stats_interval,
        );
        stats_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_tick = run_start;
        let mut requests_at_last_tick: u64 = 0;

        // A run time past the end of the clock behaves like no run time.
        let deadline = settings
            .run_time
            .and_then(|run_time| run_start.checked_add(run_time));
        let run_timer = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(run_timer);

        loop {
            tokio::select! {
                () = &mut run_timer => {
                    info!("Run time elapsed, stopping.");
                    drop(shutdown_tx.send(()));
                    break;
                }
                _ = shutdown_rx.recv() => break,
                maybe_msg = metrics_rx.recv() => {
                    let Some(msg) = maybe_msg else {
                        debug!("All virtual users finished.");
                        drop(shutdown_tx.send(()));
                        break;
                    };
                    table.record(&msg)?;
                    if let Some(limit) = settings.request_limit
                        && table.total().requests() >= limit
                    {
                        info!("Request limit of {} reached, stopping.", limit);
                        drop(shutdown_tx.send(()));
                        break;
                    }
                }
                _ = stats_interval.tick(), if first_tick.is_some() => {
                    let now = Instant::now();
                    let total = table.total();
                    let window_requests = total.requests().saturating_sub(requests_at_last_tick);
                    let window_ms = now.duration_since(last_tick).as_millis().max(1);
                    let rps = u128::from(window_requests)
                        .saturating_mul(1000)
                        .checked_div(window_ms)
                        .unwrap_or(0);
                    info!(
                        elapsed_s = run_start.elapsed().as_secs(),
                        users = running_users.load(Ordering::Relaxed),
                        requests = total.requests(),
                        failures = total.failures(),
                        rps = u64::try_from(rps).unwrap_or(u64::MAX),
                        "progress"
                    );
                    last_tick = now;
                    requests_at_last_tick = total.requests();
                }
            }
        }

        while let Ok(msg) = metrics_rx.try_recv() {
            if let Some(limit) = settings.request_limit
                && table.total().requests() >= limit
            {
                break;
            }
            table.record(&msg)?;
        }

        Ok::<StatsTable, MetricsError>(table)
    })
}
