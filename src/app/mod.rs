//! Run orchestration: plan resolution, execution, and end-of-run output.
mod export;
mod plan;
mod runner;
mod summary;


use tracing::error;

use crate::error::{AppError, AppResult, MetricsError};
use crate::metrics::RunReport;

pub use plan::{RunPlan, build_plan, build_tasks, resolve_host};
pub use runner::run_plan;

pub use summary::print_summary;

/// Writes the requested exports for a finished run.
///
/// # Errors
///
/// Returns an error when an export file cannot be written.
pub async fn write_exports(plan: &RunPlan, report: &RunReport) -> AppResult<()> {
    if let Some(path) = plan.export_json.as_deref() {
        export::export_json(path, report).await.map_err(|err| {
            error!("Failed to export JSON to {}: {}", path, err);
            AppError::metrics(MetricsError::Io {
                context: "JSON export",
                source: err,
            })
        })?;
    }
    if let Some(path) = plan.export_csv.as_deref() {
        export::export_csv(path, report).await.map_err(|err| {
            error!("Failed to export CSV to {}: {}", path, err);
            AppError::metrics(MetricsError::Io {
                context: "CSV export",
                source: err,
            })
        })?;
    }
    Ok(())
}
