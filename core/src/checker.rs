//! Concurrent check dispatch
//!
//! [`ServiceChecker`] fans a heterogeneous batch of checks out over a
//! bounded worker pool, bounds the total wait for every member, records
//! each outcome into history, and aggregates the batch. Single checks run
//! directly on the caller's task; only batches go through the pool.

use crate::error::{CoreError, Result};
use crate::health::{self, Expect, HttpProbe, Probe, TcpProbe};
use crate::history::{ServiceHistory, DEFAULT_HISTORY_LIMIT};
use crate::report;
use reqwest::Client;
use schema::{BatchReport, CheckRequest, MonitorConfig, ServiceResult, ServiceStatus};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

/// Concurrent service checker with a bounded worker pool
///
/// The checker owns the history store and a shared HTTP client. Batch
/// members acquire a semaphore permit before running, so at most
/// `max_concurrent_checks` probes are in flight at any moment regardless of
/// batch size.
pub struct ServiceChecker {
    config: MonitorConfig,
    history: Arc<ServiceHistory>,
    client: Client,
    permits: Arc<Semaphore>,
}

impl ServiceChecker {
    /// Create a checker from runtime configuration
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            history: Arc::new(ServiceHistory::new(config.retention())),
            client: Client::new(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_checks)),
            config,
        }
    }

    /// Shared access to the underlying history store
    pub fn history(&self) -> Arc<ServiceHistory> {
        Arc::clone(&self.history)
    }

    /// Shut the worker pool down
    ///
    /// Subsequent batch calls are rejected with a scheduling error. Single
    /// checks are unaffected since they run on the caller's task.
    pub fn shutdown(&self) {
        self.permits.close();
    }

    /// Check a single TCP port, recording the result
    pub async fn check_port(&self, host: &str, port: u16, timeout_secs: Option<f64>) -> ServiceResult {
        let probe = TcpProbe::new(host, port, self.effective_timeout(timeout_secs));
        let result = probe.run().await;
        self.history.add_result(result.clone());
        result
    }

    /// Check a single HTTP endpoint, recording the result
    pub async fn check_http(
        &self,
        url: &str,
        timeout_secs: Option<f64>,
        expected_status: Option<u16>,
        method: Option<&str>,
    ) -> ServiceResult {
        // No expectation means the endpoint must answer 200
        let expect = match expected_status {
            Some(code) => Expect::Status(code),
            None => Expect::Status(200),
        };
        let mut probe = HttpProbe::new(url, expect, self.effective_timeout(timeout_secs))
            .with_client(self.client.clone());
        if let Some(method) = method {
            probe = probe.with_method(method);
        }
        let result = probe.run().await;
        self.history.add_result(result.clone());
        result
    }

    /// Most recent `limit` recorded results for a service, oldest first
    pub fn get_history(&self, name: &str, limit: Option<usize>) -> Vec<ServiceResult> {
        self.history
            .get_history(name, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    }

    /// Uptime percentage over recent results within `hours`
    pub fn get_uptime(&self, name: &str, hours: Option<u64>) -> f64 {
        self.history
            .get_uptime_percentage(name, hours.unwrap_or(24))
    }

    /// Run a batch of checks concurrently and aggregate the outcome
    ///
    /// Always produces exactly one result per request. A member that
    /// overruns the collection ceiling or whose task dies is converted into
    /// a synthetic error result instead of hanging or shrinking the batch.
    /// Results arrive in collection order, which is not the submission
    /// order; callers correlate by `name`.
    pub async fn check_batch(&self, requests: Vec<CheckRequest>) -> Result<BatchReport> {
        let results = self.run_batch(requests).await?;
        let batch_report = report::summarize(results);
        info!("Batch complete: {}", batch_report.summary);
        Ok(batch_report)
    }

    /// Run a batch of untyped check records from the config boundary
    ///
    /// Malformed entries (unknown `type`, missing `port`/`url`, wrong field
    /// types) become synthetic error results so the batch count is
    /// preserved; the batch itself never aborts over a bad entry.
    pub async fn check_batch_values(&self, entries: Vec<Value>) -> Result<BatchReport> {
        let mut requests = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();

        for value in entries {
            let fallback_name = invalid_entry_name(&value);
            match CheckRequest::from_value(value) {
                Ok(request) => requests.push(request),
                Err(parse_error) => {
                    warn!("Rejecting malformed check entry: {}", parse_error);
                    rejected.push(self.synthetic_error(
                        &fallback_name,
                        format!("Invalid check request: {parse_error}"),
                    ));
                }
            }
        }

        let mut results = self.run_batch(requests).await?;
        results.append(&mut rejected);
        let batch_report = report::summarize(results);
        info!("Batch complete: {}", batch_report.summary);
        Ok(batch_report)
    }

    async fn run_batch(&self, requests: Vec<CheckRequest>) -> Result<Vec<ServiceResult>> {
        if self.permits.is_closed() {
            return Err(CoreError::SchedulingError(
                "worker pool is shut down".to_string(),
            ));
        }

        let total = requests.len();
        info!("Dispatching batch of {} checks", total);

        let mut tasks = Vec::with_capacity(total);
        for request in requests {
            let permits = Arc::clone(&self.permits);
            let history = Arc::clone(&self.history);
            let client = self.client.clone();
            let display_name = request.display_name();

            let handle = tokio::spawn({
                let display_name = display_name.clone();
                async move {
                    let result = match permits.acquire_owned().await {
                        Ok(_permit) => health::create_probe(&request, client).run().await,
                        Err(_closed) => {
                            let mut result =
                                ServiceResult::new(&display_name, ServiceStatus::Error);
                            result.error_message =
                                Some("Worker pool shut down before the check ran".to_string());
                            result
                        }
                    };
                    history.add_result(result.clone());
                    result
                }
            });
            tasks.push((display_name, handle));
        }

        let ceiling = self.config.collect_timeout();
        let mut results = Vec::with_capacity(total);
        for (name, mut handle) in tasks {
            let result = match timeout(ceiling, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => {
                    warn!("Check task for {} died: {}", name, join_error);
                    self.synthetic_error(&name, format!("Check task failed: {join_error}"))
                }
                Err(_elapsed) => {
                    warn!(
                        "Check for {} exceeded the {:?} collection ceiling",
                        name, ceiling
                    );
                    // The overrunning task is left to finish on its own; the
                    // batch moves on with a synthesized outcome.
                    self.synthetic_error(
                        &name,
                        format!("Check did not complete within {}s", ceiling.as_secs()),
                    )
                }
            };
            results.push(result);
        }

        Ok(results)
    }

    fn effective_timeout(&self, timeout_secs: Option<f64>) -> Duration {
        match timeout_secs {
            Some(secs) => Duration::from_secs_f64(secs.max(0.0)),
            None => self.config.default_timeout(),
        }
    }

    fn synthetic_error(&self, name: &str, message: String) -> ServiceResult {
        let mut result = ServiceResult::new(name, ServiceStatus::Error);
        result.error_message = Some(message);
        self.history.add_result(result.clone());
        result
    }
}

/// Display name for an entry that failed to parse
fn invalid_entry_name(value: &Value) -> String {
    if let Some(name) = value.get("name").and_then(Value::as_str) {
        return name.to_string();
    }
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    format!("Error checking {kind}")
}
