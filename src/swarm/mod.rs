//! User-spawning engine: ramps virtual users up at a fixed rate and keeps
//! them looping until shutdown.
mod limiter;


use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::shutdown::ShutdownSender;
use crate::user::{UserContext, VirtualUser};

pub(crate) use limiter::RequestLimiter;

/// How often the ramp-up ticker releases users.
const SPAWN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwarmSettings {
    pub users: usize,
    /// Users released per second.
    pub spawn_rate: usize,
    pub request_limit: Option<u64>,
}

/// Handle to a running swarm.
#[derive(Debug)]
pub struct Swarm {
    pub handle: tokio::task::JoinHandle<()>,
    pub running_users: Arc<AtomicUsize>,
}

/// Spawns `settings.users` virtual users. Each waits for a start permit;
/// the ramp-up ticker hands out `spawn_rate` permits per second (the first
/// batch immediately) until every user is running.
///
/// The returned handle resolves once every user has stopped.
#[must_use]
pub fn spawn_swarm(
    settings: SwarmSettings,
    context: &UserContext,
    shutdown_tx: &ShutdownSender,
) -> Swarm {
    let shutdown_tx = shutdown_tx.clone();
    let context = context.clone();
    let running_users = Arc::new(AtomicUsize::new(0));
    let running = Arc::clone(&running_users);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let handle = tokio::spawn(async move {
        let users = settings.users;
        let spawn_rate = settings.spawn_rate.max(1);
        let permits = Arc::new(Semaphore::new(0));
        let request_limiter = settings.request_limit.map(RequestLimiter::new).map(Arc::new);
        let mut worker_handles = Vec::with_capacity(users);

        for id in 0..users {
            let permits = Arc::clone(&permits);
            let mut shutdown_rx_user = shutdown_tx.subscribe();
            let request_limiter = request_limiter.clone();
            let running = Arc::clone(&running);
            let user = VirtualUser::new(id, context.clone());

            let handle = tokio::spawn(async move {
                let startup_permit_result = tokio::select! {
                    _ = shutdown_rx_user.recv() => return,
                    permit = permits.acquire_owned() => permit,
                };
                let Ok(_startup_permit) = startup_permit_result else {
                    return;
                };
                running.fetch_add(1, Ordering::Relaxed);
                debug!(user = user.id(), "virtual user started");

                loop {
                    if let Some(limiter) = request_limiter.as_ref()
                        && !limiter.try_reserve()
                    {
                        break;
                    }
                    if user.run_once(&mut shutdown_rx_user).await {
                        break;
                    }
                }

                running.fetch_sub(1, Ordering::Relaxed);
                debug!(user = user.id(), "virtual user stopped");
            });
            worker_handles.push(handle);
        }

        let mut spawn_interval = interval(SPAWN_TICK);
        spawn_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut total_spawned: usize = 0;

        while total_spawned < users {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    permits.close();
                    break;
                }
                _ = spawn_interval.tick() => {
                    let available = users.saturating_sub(total_spawned);
                    let to_spawn = spawn_rate.min(available);
                    permits.add_permits(to_spawn);
                    total_spawned = total_spawned.saturating_add(to_spawn);
                    debug!(spawned = total_spawned, users, "ramping up");
                    if total_spawned >= users {
                        info!("All {} virtual users spawned.", users);
                    }
                }
            }
        }

        for handle in worker_handles {
            if handle.await.is_err() {
                break;
            }
        }
        if let Some(limiter) = request_limiter.as_ref() {
            debug!(reserved = limiter.reserved(), "request limiter drained");
        }
    });

    Swarm {
        handle,
        running_users,
    }
}
