use std::process::ExitCode;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::warn;

use crate::app::{build_plan, print_summary, run_plan, write_exports};
use crate::args::{LoadArgs, parsers::read_host_env};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::logger::init_logging;

/// Parses arguments, merges config, runs the load test, prints the report.
///
/// # Errors
///
/// Returns an error when arguments or config are invalid, the runtime cannot
/// start, or the run itself fails.
pub fn run() -> AppResult<ExitCode> {
    let matches = LoadArgs::command().get_matches();
    let args = resolve_args(&matches)?;

    init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn resolve_args(matches: &ArgMatches) -> AppResult<LoadArgs> {
    let mut args = LoadArgs::from_arg_matches(matches)?;
    args.env_host = read_host_env();
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, matches, &config)?;
    }
    Ok(args)
}

async fn run_async(args: LoadArgs) -> AppResult<ExitCode> {
    let plan = build_plan(&args)?;
    let report = run_plan(&plan).await?;

    print_summary(&report);
    write_exports(&plan, &report).await?;

    if report.has_failures() {
        warn!(
            failures = report.aggregated.failures,
            "Run finished with failed requests"
        );
        return Ok(ExitCode::from(plan.exit_code_on_error));
    }
    Ok(ExitCode::SUCCESS)
}
