//! Business and HTTP metrics.
//!
//! The workflow depends only on the [`BusinessMetrics`] trait, which is
//! handed to it at construction. [`PrometheusMetrics`] owns its own
//! `Registry`; nothing is registered globally.
//!
//! ## Exported series
//!
//! - `pvz_created_total`
//! - `reception_created_total`
//! - `product_added_total`
//! - `http_requests_total{method, endpoint, status}`
//! - `http_request_duration_seconds{method, endpoint}`

use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Counters the workflow bumps after a successful commit.
///
/// Implementations must not fail or block.
pub trait BusinessMetrics: Send + Sync {
    fn pickup_point_created(&self);
    fn reception_created(&self);
    fn product_added(&self);
}

/// Metrics sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl BusinessMetrics for NoopMetrics {
    fn pickup_point_created(&self) {}
    fn reception_created(&self) {}
    fn product_added(&self) {}
}

const HTTP_DURATION_BUCKETS: &[f64] = &[0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0];

/// Prometheus-backed metrics with a private registry.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    pvz_created: IntCounter,
    receptions_created: IntCounter,
    products_added: IntCounter,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
}

impl PrometheusMetrics {
    /// Create the collectors and register them.
    ///
    /// # Errors
    ///
    /// Returns `prometheus::Error` if a collector is malformed or registered twice.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let pvz_created = IntCounter::new("pvz_created_total", "Total number of created PVZs")?;
        let receptions_created = IntCounter::new(
            "reception_created_total",
            "Total number of created receptions",
        )?;
        let products_added =
            IntCounter::new("product_added_total", "Total number of added products")?;
        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        let http_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(HTTP_DURATION_BUCKETS.to_vec()),
            &["method", "endpoint"],
        )?;

        registry.register(Box::new(pvz_created.clone()))?;
        registry.register(Box::new(receptions_created.clone()))?;
        registry.register(Box::new(products_added.clone()))?;
        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_duration.clone()))?;

        Ok(Self {
            registry,
            pvz_created,
            receptions_created,
            products_added,
            http_requests,
            http_duration,
        })
    }

    /// Record one finished HTTP request.
    pub fn observe_request(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        self.http_requests
            .with_label_values(&[method, endpoint, &status.to_string()])
            .inc();
        self.http_duration
            .with_label_values(&[method, endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Render every series in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns `prometheus::Error` if encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl BusinessMetrics for PrometheusMetrics {
    fn pickup_point_created(&self) {
        self.pvz_created.inc();
    }

    fn reception_created(&self) {
        self.receptions_created.inc();
    }

    fn product_added(&self) {
        self.products_added.inc();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_business_counters_render() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.pickup_point_created();
        metrics.product_added();
        metrics.product_added();

        let text = metrics.render().unwrap();
        assert!(text.contains("pvz_created_total 1"));
        assert!(text.contains("product_added_total 2"));
        assert!(text.contains("reception_created_total 0"));
    }

    #[test]
    fn test_http_request_series() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.observe_request("POST", "/pvz", 201, Duration::from_millis(20));

        let text = metrics.render().unwrap();
        let line = text
            .lines()
            .find(|l| l.starts_with("http_requests_total{"))
            .unwrap();
        assert!(line.contains(r#"endpoint="/pvz""#));
        assert!(line.contains(r#"status="201""#));
        assert!(line.ends_with(" 1"));
        assert!(text.contains("http_request_duration_seconds_bucket"));
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let first = PrometheusMetrics::new().unwrap();
        let second = PrometheusMetrics::new().unwrap();
        first.reception_created();

        assert!(second.render().unwrap().contains("reception_created_total 0"));
    }
}
