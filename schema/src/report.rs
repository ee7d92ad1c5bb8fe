//! Batch report types produced by the aggregator
//!
//! A [`BatchReport`] is the summary handed back to callers after a batch of
//! checks completes: the individual results, counts by status, latency
//! statistics, and an overall verdict.

use crate::check::ServiceResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall verdict for a completed batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    /// Every result in the batch was healthy
    Healthy,
    /// At least one result was not healthy
    Unhealthy,
}

/// Counts and latency statistics for a completed batch
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BatchStatistics {
    /// Number of results in the batch
    pub total_services: usize,
    /// Results with a healthy status
    pub healthy_count: usize,
    /// Results with any other status
    pub unhealthy_count: usize,
    /// Result count per status string
    pub status_distribution: BTreeMap<String, usize>,
    /// Mean response time over results that have one, in milliseconds
    pub average_response_time_ms: Option<f64>,
}

/// Summary of a completed batch of checks
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BatchReport {
    /// Healthy iff every member result is healthy
    pub overall_status: OverallStatus,
    /// Individual results in collection order
    pub services: Vec<ServiceResult>,
    /// Counts and latency statistics
    pub statistics: BatchStatistics,
    /// One-line human-readable summary, e.g. "3/4 services healthy"
    pub summary: String,
    /// When the aggregation was produced, RFC3339
    pub timestamp: String,
}

impl BatchReport {
    /// Current time in RFC3339 format
    pub fn current_timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}
