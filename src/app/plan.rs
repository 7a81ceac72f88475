use crate::args::{LoadArgs, TargetPreset, TaskKind};
use crate::error::{AppError, AppResult};
use crate::http::ClientSettings;
use crate::metrics::CollectorSettings;
use crate::swarm::SwarmSettings;
use crate::user::{Host, SummaryWindow, Task};

/// Fully resolved run, ready to execute.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub host: Host,
    pub tasks: Vec<Task>,
    pub swarm: SwarmSettings,
    pub collector: CollectorSettings,
    pub client: ClientSettings,
    pub export_json: Option<String>,
    pub export_csv: Option<String>,
    pub exit_code_on_error: u8,
}

/// Resolves and validates everything a run needs from the parsed arguments.
///
/// # Errors
///
/// Returns an error when the host is invalid or the summary window is
/// inverted.
pub fn build_plan(args: &LoadArgs) -> AppResult<RunPlan> {
    let host = resolve_host(args)?;
    let tasks = build_tasks(args)?;
    let request_limit = args.requests.map(u64::from);

    Ok(RunPlan {
        host,
        tasks,
        swarm: SwarmSettings {
            users: args.users.get(),
            spawn_rate: args.spawn_rate.get(),
            request_limit,
        },
        collector: CollectorSettings {
            run_time: args.run_time,
            request_limit,
            stats_interval: args.stats_interval,
        },
        client: ClientSettings::from_args(args),
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
        exit_code_on_error: args.exit_code_on_error,
    })
}

/// `--host`, then `--target`, then `RINHA_LOAD_HOST`, then `local`.
/// Config values have already been folded into `host`/`target` when
/// neither the CLI nor the environment pinned the host.
///
/// # Errors
///
/// Returns an error when the resolved host is not a valid http(s) URL.
pub fn resolve_host(args: &LoadArgs) -> AppResult<Host> {
    let raw = match (args.host.as_deref(), args.target, args.env_host.as_deref()) {
        (Some(host), _, _) => host,
        (None, Some(target), _) => target.host(),
        (None, None, Some(env_host)) => env_host,
        (None, None, None) => TargetPreset::default().host(),
    };
    Host::parse(raw).map_err(AppError::http)
}

/// One task per `--task` occurrence (duplicates raise that task's share);
/// `summary` when none were given.
///
/// # Errors
///
/// Returns an error when the summary window is inverted.
pub fn build_tasks(args: &LoadArgs) -> AppResult<Vec<Task>> {
    let window = SummaryWindow::new(args.from, args.to)?;
    let kinds: &[TaskKind] = if args.tasks.is_empty() {
        &[TaskKind::Summary]
    } else {
        &args.tasks
    };

    Ok(kinds
        .iter()
        .map(|kind| {
            let task = Task::new(*kind)
                .with_amount(args.amount)
                .with_window(window);
            match args.wait {
                Some(wait) => task.with_wait(wait),
                None => task,
            }
        })
        .collect())
}
