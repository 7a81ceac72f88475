use serde::Serialize;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::metrics::{EndpointReport, RunReport};

use super::summary::format_x100;

const CSV_HEADER: &[u8] = b"Type,Name,Request Count,Failure Count,Median Response Time,Average Response Time,Min Response Time,Max Response Time,Average Content Size,Requests/s,Failures/s,90%,95%,99%\n";

#[derive(Serialize)]
struct JsonExport<'report> {
    generated_at: String,
    report: &'report RunReport,
}

pub(crate) async fn export_csv(path: &str, report: &RunReport) -> Result<(), std::io::Error> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(CSV_HEADER).await?;
    for endpoint in &report.endpoints {
        writer.write_all(csv_row(endpoint).as_bytes()).await?;
    }
    writer
        .write_all(csv_row(&report.aggregated).as_bytes())
        .await?;
    writer.flush().await?;
    Ok(())
}

pub(crate) async fn export_json(path: &str, report: &RunReport) -> Result<(), std::io::Error> {
    let payload = JsonExport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        report,
    };
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let json = serde_json::to_vec_pretty(&payload).map_err(std::io::Error::other)?;
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

fn csv_row(endpoint: &EndpointReport) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
        endpoint.method,
        csv_escape(&endpoint.name),
        endpoint.requests,
        endpoint.failures,
        endpoint.median_ms,
        endpoint.avg_ms,
        endpoint.min_ms,
        endpoint.max_ms,
        endpoint.avg_bytes,
        format_x100(endpoint.rps_x100),
        format_x100(endpoint.failures_per_sec_x100),
        endpoint.p90_ms,
        endpoint.p95_ms,
        endpoint.p99_ms
    )
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
