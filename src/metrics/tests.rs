use super::*;
use crate::args::HttpMethod;
use crate::error::{AppError, AppResult};
use crate::shutdown::shutdown_channel;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;
use tokio::time::Instant;

const SUMMARY: &str = "/payments-summary";
const PAYMENTS: &str = "/payments";
const COLLECTOR_TIMEOUT: Duration = Duration::from_secs(2);

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::metrics(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn sample(name: &'static str, method: HttpMethod, latency_ms: u64, status: u16) -> Metrics {
    let failure = if status >= 400 {
        Some(Failure::new(FailureKind::Status, format!("HTTP {}", status)))
    } else {
        None
    };
    Metrics {
        name,
        method,
        start: Instant::now(),
        response_time: Duration::from_millis(latency_ms),
        status_code: status,
        response_bytes: 64,
        failure,
    }
}

fn transport_failure(name: &'static str) -> Metrics {
    Metrics {
        name,
        method: HttpMethod::Get,
        start: Instant::now(),
        response_time: Duration::from_millis(1),
        status_code: 0,
        response_bytes: 0,
        failure: Some(Failure::new(
            FailureKind::Transport,
            "connection refused".to_owned(),
        )),
    }
}

fn collector_settings(request_limit: Option<u64>, run_time: Option<Duration>) -> CollectorSettings {
    CollectorSettings {
        run_time,
        request_limit,
        stats_interval: Duration::from_secs(60),
    }
}

#[test]
fn histogram_percentiles() -> AppResult<()> {
    let mut histogram = LatencyHistogram::new()?;
    for value in 1..=100 {
        histogram.record(value)?;
    }

    if histogram.count() != 100 {
        return Err(AppError::metrics(format!(
            "Unexpected count {}",
            histogram.count()
        )));
    }
    let checks = [(50, 50), (90, 90), (99, 99), (100, 100)];
    for (percentile, expected) in checks {
        let value = histogram.percentile(percentile);
        if value != expected {
            return Err(AppError::metrics(format!(
                "p{} expected {}, got {}",
                percentile, expected, value
            )));
        }
    }
    Ok(())
}

#[test]
fn empty_histogram_reports_zero() -> AppResult<()> {
    let histogram = LatencyHistogram::new()?;
    if histogram.percentile(99) != 0 {
        return Err(AppError::metrics("Expected zero percentile"));
    }
    if histogram.encode_base64()?.is_empty() {
        return Err(AppError::metrics("Expected an encoded empty histogram"));
    }
    Ok(())
}

#[test]
fn histogram_records_sub_millisecond_as_one() -> AppResult<()> {
    let mut histogram = LatencyHistogram::new()?;
    histogram.record(0)?;
    histogram.record(20)?;
    histogram.record(30)?;

    if histogram.count() != 3 {
        return Err(AppError::metrics("Expected count of 3"));
    }
    if histogram.percentile(0) != 1 {
        return Err(AppError::metrics(
            "Sub-millisecond samples should be recorded as 1ms",
        ));
    }
    Ok(())
}

#[test]
fn stats_table_groups_by_method_and_name() -> AppResult<()> {
    let mut table = StatsTable::new()?;
    table.record(&sample(SUMMARY, HttpMethod::Get, 10, 200))?;
    table.record(&sample(SUMMARY, HttpMethod::Get, 30, 200))?;
    table.record(&sample(PAYMENTS, HttpMethod::Post, 20, 500))?;
    table.record(&transport_failure(SUMMARY))?;

    let summary = table
        .endpoint(HttpMethod::Get, SUMMARY)
        .ok_or_else(|| AppError::metrics("Missing summary row"))?;
    if summary.requests() != 3 || summary.failures() != 1 {
        return Err(AppError::metrics(format!(
            "Unexpected summary counts {}/{}",
            summary.requests(),
            summary.failures()
        )));
    }
    if summary.min_ms() != 1 || summary.max_ms() != 30 {
        return Err(AppError::metrics("Unexpected summary min/max"));
    }

    if table.endpoint(HttpMethod::Get, PAYMENTS).is_some() {
        return Err(AppError::metrics("GET /payments was never recorded"));
    }

    let total = table.total();
    if total.requests() != 4 || total.failures() != 2 {
        return Err(AppError::metrics("Unexpected aggregated counts"));
    }
    if table.status_count(200) != 2 || table.status_count(500) != 1 || table.status_count(0) != 0
    {
        return Err(AppError::metrics("Unexpected status counts"));
    }
    Ok(())
}

#[test]
fn report_orders_failures_by_occurrences() -> AppResult<()> {
    let mut table = StatsTable::new()?;
    table.record(&sample(PAYMENTS, HttpMethod::Post, 5, 500))?;
    for _ in 0..3 {
        table.record(&transport_failure(SUMMARY))?;
    }
    table.record(&sample(SUMMARY, HttpMethod::Get, 5, 200))?;

    let report = table.into_report(&RunInfo {
        host: "http://localhost:9999".to_owned(),
        users: 2,
        duration: Duration::from_secs(2),
    })?;

    if !report.has_failures() {
        return Err(AppError::metrics("Expected failures"));
    }
    let first = report
        .failures
        .first()
        .ok_or_else(|| AppError::metrics("Missing failure rows"))?;
    if first.occurrences != 3 || first.kind != FailureKind::Transport {
        return Err(AppError::metrics("Expected transport failure first"));
    }
    if report.endpoints.len() != 2 {
        return Err(AppError::metrics("Expected two endpoint rows"));
    }
    if report.aggregated.name != "Aggregated" || report.aggregated.requests != 5 {
        return Err(AppError::metrics("Unexpected aggregated row"));
    }
    // 5 requests over 2s.
    if report.aggregated.rps_x100 != 250 {
        return Err(AppError::metrics(format!(
            "Unexpected rps_x100 {}",
            report.aggregated.rps_x100
        )));
    }
    if report.duration_ms != 2000 {
        return Err(AppError::metrics("Unexpected duration"));
    }
    Ok(())
}

#[test]
fn collector_stops_at_request_limit() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let mut observer = shutdown_tx.subscribe();
        let (metrics_tx, metrics_rx) = tokio::sync::mpsc::channel::<Metrics>(16);

        let handle = setup_metrics_collector(
            collector_settings(Some(3), None),
            Instant::now(),
            &shutdown_tx,
            metrics_rx,
            Arc::new(AtomicUsize::new(0)),
        );

        for _ in 0..5 {
            metrics_tx
                .send(sample(SUMMARY, HttpMethod::Get, 2, 200))
                .await
                .map_err(|err| AppError::metrics(format!("send failed: {}", err)))?;
        }

        let table = tokio::time::timeout(COLLECTOR_TIMEOUT, handle)
            .await
            .map_err(|err| AppError::metrics(format!("Collector timed out: {}", err)))???;

        if table.total().requests() != 3 {
            return Err(AppError::metrics(format!(
                "Expected exactly 3 recorded requests, got {}",
                table.total().requests()
            )));
        }
        if observer.try_recv().is_err() {
            return Err(AppError::metrics("Expected shutdown broadcast"));
        }
        Ok(())
    })
}

#[test]
fn collector_stops_after_run_time() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let mut observer = shutdown_tx.subscribe();
        let (metrics_tx, metrics_rx) = tokio::sync::mpsc::channel::<Metrics>(16);

        let handle = setup_metrics_collector(
            collector_settings(None, Some(Duration::from_millis(200))),
            Instant::now(),
            &shutdown_tx,
            metrics_rx,
            Arc::new(AtomicUsize::new(0)),
        );

        let table = tokio::time::timeout(COLLECTOR_TIMEOUT, handle)
            .await
            .map_err(|err| AppError::metrics(format!("Collector timed out: {}", err)))???;
        drop(metrics_tx);

        if table.total().requests() != 0 {
            return Err(AppError::metrics("Expected no requests"));
        }
        if observer.try_recv().is_err() {
            return Err(AppError::metrics("Expected shutdown broadcast"));
        }
        Ok(())
    })
}

#[test]
fn collector_drains_queue_on_shutdown() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let (metrics_tx, metrics_rx) = tokio::sync::mpsc::channel::<Metrics>(16);

        for _ in 0..4 {
            metrics_tx
                .send(sample(SUMMARY, HttpMethod::Get, 2, 200))
                .await
                .map_err(|err| AppError::metrics(format!("send failed: {}", err)))?;
        }

        let handle = setup_metrics_collector(
            collector_settings(None, None),
            Instant::now(),
            &shutdown_tx,
            metrics_rx,
            Arc::new(AtomicUsize::new(0)),
        );
        if shutdown_tx.send(()).is_err() {
            return Err(AppError::metrics("Failed to send shutdown"));
        }

        let table = tokio::time::timeout(COLLECTOR_TIMEOUT, handle)
            .await
            .map_err(|err| AppError::metrics(format!("Collector timed out: {}", err)))???;
        drop(metrics_tx);

        if table.total().requests() != 4 {
            return Err(AppError::metrics(format!(
                "Expected queued samples to be counted, got {}",
                table.total().requests()
            )));
        }
        Ok(())
    })
}

#[test]
fn collector_keeps_running_when_deadlines_overflow() -> AppResult<()> {
    run_async_test(async {
        let (shutdown_tx, _) = shutdown_channel();
        let mut observer = shutdown_tx.subscribe();
        let (metrics_tx, metrics_rx) = tokio::sync::mpsc::channel::<Metrics>(16);

        let settings = CollectorSettings {
            run_time: Some(Duration::MAX),
            request_limit: None,
            stats_interval: Duration::MAX,
        };
        let handle = setup_metrics_collector(
            settings,
            Instant::now(),
            &shutdown_tx,
            metrics_rx,
            Arc::new(AtomicUsize::new(0)),
        );

        tokio::time::sleep(Duration::from_millis(200)).await;
        if handle.is_finished() {
            return Err(AppError::metrics("Collector stopped before shutdown"));
        }
        if observer.try_recv().is_ok() {
            return Err(AppError::metrics("Unexpected shutdown broadcast"));
        }

        metrics_tx
            .send(sample(SUMMARY, HttpMethod::Get, 2, 200))
            .await
            .map_err(|err| AppError::metrics(format!("send failed: {}", err)))?;
        if shutdown_tx.send(()).is_err() {
            return Err(AppError::metrics("Failed to send shutdown"));
        }
        let table = tokio::time::timeout(COLLECTOR_TIMEOUT, handle)
            .await
            .map_err(|err| AppError::metrics(format!("Collector timed out: {}", err)))???;
        drop(metrics_tx);

        if table.total().requests() != 1 {
            return Err(AppError::metrics(format!(
                "Expected one sample, got {}",
                table.total().requests()
            )));
        }
        Ok(())
    })
}
