//! Prometheus metrics for observability.
//!
//! HTTP request metrics are recorded by middleware; pipeline metrics are
//! recorded by the download handler around each spawned run.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use songbundle_core::{PipelineOutcome, Stage};
use std::time::Duration;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
///
/// For the download stream this is the time until the response head is
/// sent, not the length of the run.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "songbundle_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .expect("valid http duration histogram")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("songbundle_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid http request counter")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "songbundle_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid in-flight gauge")
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Finished pipeline runs by outcome and, for failures, the failing stage.
pub static PIPELINE_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("songbundle_pipeline_runs_total", "Finished pipeline runs"),
        &["outcome", "stage"],
    )
    .expect("valid pipeline run counter")
});

/// Pipelines currently running.
pub static PIPELINES_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "songbundle_pipelines_active",
        "Number of pipeline runs in progress",
    )
    .expect("valid active pipeline gauge")
});

/// Wall-clock duration of a pipeline run in seconds.
pub static PIPELINE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "songbundle_pipeline_duration_seconds",
            "Pipeline run duration in seconds",
        )
        .buckets(vec![
            1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0, 1800.0,
        ]),
        &["outcome"],
    )
    .expect("valid pipeline duration histogram")
});

/// Progress events forwarded to clients, by stage.
pub static PROGRESS_EVENTS_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "songbundle_progress_events_sent_total",
            "Progress events written to event streams",
        ),
        &["stage"],
    )
    .expect("valid progress event counter")
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // Pipeline
        Box::new(PIPELINE_RUNS_TOTAL.clone()),
        Box::new(PIPELINES_ACTIVE.clone()),
        Box::new(PIPELINE_DURATION.clone()),
        Box::new(PROGRESS_EVENTS_SENT.clone()),
    ];
    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            tracing::error!("Failed to register metric: {}", e);
        }
    }
}

/// Records a finished run.
pub fn record_pipeline_outcome(outcome: &PipelineOutcome, elapsed: Duration) {
    let (label, stage) = match outcome {
        PipelineOutcome::Completed { .. } => ("completed", Stage::Complete),
        PipelineOutcome::Failed { stage, .. } => ("failed", *stage),
    };
    PIPELINE_RUNS_TOTAL
        .with_label_values(&[label, stage.as_str()])
        .inc();
    PIPELINE_DURATION
        .with_label_values(&[label])
        .observe(elapsed.as_secs_f64());
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics().unwrap();
        assert!(output.contains("songbundle_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_record_pipeline_outcome_labels() {
        record_pipeline_outcome(
            &PipelineOutcome::Failed {
                stage: Stage::Download,
                error: "download failed".to_string(),
            },
            Duration::from_secs(3),
        );
        record_pipeline_outcome(
            &PipelineOutcome::Completed {
                filename: "songs.zip".to_string(),
                archive_bytes: 10,
            },
            Duration::from_secs(40),
        );

        assert!(
            PIPELINE_RUNS_TOTAL
                .with_label_values(&["failed", "download"])
                .get()
                >= 1
        );
        let output = encode_metrics().unwrap();
        assert!(output.contains("songbundle_pipeline_runs_total"));
        assert!(output.contains("songbundle_pipeline_duration_seconds"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        PIPELINES_ACTIVE.set(0);
        PROGRESS_EVENTS_SENT.with_label_values(&["init"]).inc();

        let output = encode_metrics().unwrap();

        assert!(output.contains("songbundle_http_request_duration_seconds"));
        assert!(output.contains("songbundle_http_requests_in_flight"));
        assert!(output.contains("songbundle_pipelines_active"));
        assert!(output.contains("songbundle_progress_events_sent_total"));
    }
}
