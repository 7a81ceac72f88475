use crate::metrics::{EndpointReport, RunReport};

/// Divisor for x100 fixed-point values.
const PERCENT_DIVISOR: u64 = 100;
/// Width of the name column in the stats tables.
const NAME_WIDTH: usize = 24;

/// Renders the end-of-run statistics as printable lines.
pub(crate) fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Host: {}  Users: {}  Duration: {}",
        report.host,
        report.users,
        format_duration_ms(report.duration_ms)
    ));
    lines.push(String::new());

    lines.push(format!(
        "{:<6} {:<width$} {:>8} {:>16} | {:>7} {:>7} {:>7} {:>7} | {:>9} {:>10}",
        "Type",
        "Name",
        "# reqs",
        "# fails",
        "Avg",
        "Min",
        "Max",
        "Med",
        "req/s",
        "failures/s",
        width = NAME_WIDTH
    ));
    lines.push(separator());
    for endpoint in &report.endpoints {
        lines.push(stats_row(endpoint));
    }
    lines.push(separator());
    lines.push(stats_row(&report.aggregated));
    lines.push(String::new());

    lines.push("Response time percentiles (ms)".to_owned());
    lines.push(format!(
        "{:<6} {:<width$} {:>7} {:>7} {:>7} {:>7} {:>7} {:>8}",
        "Type",
        "Name",
        "50%",
        "90%",
        "95%",
        "99%",
        "100%",
        "# reqs",
        width = NAME_WIDTH
    ));
    lines.push(separator());
    for endpoint in &report.endpoints {
        lines.push(percentile_row(endpoint));
    }
    lines.push(separator());
    lines.push(percentile_row(&report.aggregated));

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Error report".to_owned());
        lines.push(format!("{:>13}  {}", "# occurrences", "Error"));
        lines.push(separator());
        for failure in &report.failures {
            lines.push(format!(
                "{:>13}  {} {}: {}",
                failure.occurrences, failure.method, failure.name, failure.error
            ));
        }
    }

    if !report.status_counts.is_empty() {
        lines.push(String::new());
        let counts: Vec<String> = report
            .status_counts
            .iter()
            .map(|(status, count)| format!("{}={}", status, count))
            .collect();
        lines.push(format!("Status codes: {}", counts.join(", ")));
    }

    lines
}

/// Prints the end-of-run statistics to stdout.
pub fn print_summary(report: &RunReport) {
    for line in summary_lines(report) {
        println!("{}", line);
    }
}

fn stats_row(endpoint: &EndpointReport) -> String {
    let failure_rate_x100 = ratio_x100(endpoint.failures, endpoint.requests);
    format!(
        "{:<6} {:<width$} {:>8} {:>16} | {:>7} {:>7} {:>7} {:>7} | {:>9} {:>10}",
        endpoint.method,
        endpoint.name,
        endpoint.requests,
        format!(
            "{}({}.{:02}%)",
            endpoint.failures,
            failure_rate_x100 / PERCENT_DIVISOR,
            failure_rate_x100 % PERCENT_DIVISOR
        ),
        endpoint.avg_ms,
        endpoint.min_ms,
        endpoint.max_ms,
        endpoint.median_ms,
        format_x100(endpoint.rps_x100),
        format_x100(endpoint.failures_per_sec_x100),
        width = NAME_WIDTH
    )
}

fn percentile_row(endpoint: &EndpointReport) -> String {
    format!(
        "{:<6} {:<width$} {:>7} {:>7} {:>7} {:>7} {:>7} {:>8}",
        endpoint.method,
        endpoint.name,
        endpoint.median_ms,
        endpoint.p90_ms,
        endpoint.p95_ms,
        endpoint.p99_ms,
        endpoint.max_ms,
        endpoint.requests,
        width = NAME_WIDTH
    )
}

fn separator() -> String {
    "-".repeat(NAME_WIDTH.saturating_add(80))
}

pub(crate) fn ratio_x100(part: u64, total: u64) -> u64 {
    let scaled = u128::from(part)
        .saturating_mul(10_000)
        .checked_div(u128::from(total))
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

pub(crate) fn format_x100(value: u64) -> String {
    format!("{}.{:02}", value / PERCENT_DIVISOR, value % PERCENT_DIVISOR)
}

fn format_duration_ms(duration_ms: u64) -> String {
    format!("{}.{:03}s", duration_ms / 1_000, duration_ms % 1_000)
}
