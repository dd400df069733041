// observability/metrics.rs - Prometheus Metrics

use ::metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for metrics
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Address to expose metrics endpoint
    pub listen_addr: SocketAddr,

    /// Histogram buckets for batch evaluation time (in seconds)
    pub evaluation_buckets: Vec<f64>,

    /// Histogram buckets for decision confidence
    pub confidence_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            evaluation_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0,
            ],
            confidence_buckets: vec![
                0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 0.95, 0.99, 1.0,
            ],
        }
    }
}

/// Handle to the Prometheus metrics exporter
#[derive(Clone)]
pub struct MetricsHandle {
    handle: PrometheusHandle,
}

impl MetricsHandle {
    /// Render metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Batch evaluation metrics
pub struct EvaluationMetrics;

impl EvaluationMetrics {
    pub const EVALUATIONS_TOTAL: &'static str = "travos_evaluations_total";
    pub const OBSERVATIONS_TOTAL: &'static str = "travos_observations_total";
    pub const EVALUATION_SECONDS: &'static str = "travos_evaluation_seconds";
}

/// Per-observation decision metrics
pub struct DecisionMetrics;

impl DecisionMetrics {
    pub const DECISIONS_TOTAL: &'static str = "travos_decisions_total";
    pub const CONFIDENCE: &'static str = "travos_confidence";
}

/// Initialize the metrics system
///
/// Starts an HTTP server on the configured address to expose Prometheus metrics.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(config: MetricsConfig) -> Result<MetricsHandle, Box<dyn std::error::Error>> {
    let builder = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(EvaluationMetrics::EVALUATION_SECONDS.into()),
            &config.evaluation_buckets,
        )?
        .set_buckets_for_metric(
            Matcher::Full(DecisionMetrics::CONFIDENCE.into()),
            &config.confidence_buckets,
        )?;

    let handle = builder.install_recorder()?;
    let metrics_handle = MetricsHandle { handle: handle.clone() };

    let listen_addr = config.listen_addr;
    tokio::spawn(async move {
        use axum::{http::StatusCode, routing::get, Json, Router};
        use serde::Serialize;

        #[derive(Serialize)]
        struct HealthResponse {
            status: &'static str,
            version: &'static str,
            uptime_secs: u64,
        }

        let start_time = std::time::Instant::now();

        let app = Router::new()
            .route("/metrics", get(move || {
                let h = handle.clone();
                async move { h.render() }
            }))
            .route("/health", get(move || {
                let uptime = start_time.elapsed().as_secs();
                async move {
                    Json(HealthResponse {
                        status: "healthy",
                        version: env!("CARGO_PKG_VERSION"),
                        uptime_secs: uptime,
                    })
                }
            }))
            .route("/ready", get(|| async { StatusCode::OK }))
            .route("/live", get(|| async { StatusCode::OK }));

        match tokio::net::TcpListener::bind(listen_addr).await {
            Ok(listener) => {
                tracing::info!(addr = %listen_addr, "Metrics HTTP server started");
                if let Err(e) = axum::serve(listener, app).await {
                    tracing::error!(error = %e, "Metrics server error");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, addr = %listen_addr, "Failed to bind metrics server");
            }
        }
    });

    describe_counter!(
        EvaluationMetrics::EVALUATIONS_TOTAL,
        "Total number of scenario evaluations"
    );
    describe_counter!(
        EvaluationMetrics::OBSERVATIONS_TOTAL,
        "Total number of observations submitted for evaluation"
    );
    describe_histogram!(
        EvaluationMetrics::EVALUATION_SECONDS,
        "Scenario evaluation time in seconds"
    );
    describe_counter!(
        DecisionMetrics::DECISIONS_TOTAL,
        "Trust decisions by value source and outcome"
    );
    describe_histogram!(
        DecisionMetrics::CONFIDENCE,
        "Confidence in direct experience at decision time"
    );

    tracing::info!(addr = %config.listen_addr, "Metrics initialized");

    Ok(metrics_handle)
}

// Recording functions

/// Record a finished scenario evaluation
pub fn record_evaluation(observations: usize, duration: Duration, success: bool) {
    let status = if success { "ok" } else { "error" };
    counter!(EvaluationMetrics::EVALUATIONS_TOTAL, "status" => status).increment(1);
    counter!(EvaluationMetrics::OBSERVATIONS_TOTAL).increment(observations as u64);
    histogram!(EvaluationMetrics::EVALUATION_SECONDS, "status" => status)
        .record(duration.as_secs_f64());
}

/// Record one trust decision
pub fn record_decision(source: &'static str, outcome: &'static str, confidence: f64) {
    counter!(
        DecisionMetrics::DECISIONS_TOTAL,
        "source" => source,
        "outcome" => outcome
    ).increment(1);
    histogram!(DecisionMetrics::CONFIDENCE).record(confidence);
}
