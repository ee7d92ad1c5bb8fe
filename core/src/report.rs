//! Batch aggregation
//!
//! Pure, stateless summarization of a completed batch of check results into
//! a [`BatchReport`]: counts by status, the healthy/unhealthy split, average
//! latency, and an overall verdict.

use schema::{BatchReport, BatchStatistics, OverallStatus, ServiceResult};
use std::collections::BTreeMap;

/// Summarize a completed batch of results
///
/// The overall status is healthy iff every member result is healthy (an
/// empty batch is vacuously healthy). The latency average considers only
/// results carrying a response time and is `None` when no result has one.
pub fn summarize(results: Vec<ServiceResult>) -> BatchReport {
    let total = results.len();
    let healthy = results.iter().filter(|result| result.is_healthy()).count();

    let mut status_distribution: BTreeMap<String, usize> = BTreeMap::new();
    for result in &results {
        *status_distribution
            .entry(result.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    let timings: Vec<f64> = results.iter().filter_map(|result| result.response_time).collect();
    let average_response_time_ms = if timings.is_empty() {
        None
    } else {
        let mean = timings.iter().sum::<f64>() / timings.len() as f64;
        Some((mean * 100.0).round() / 100.0)
    };

    let overall_status = if healthy == total {
        OverallStatus::Healthy
    } else {
        OverallStatus::Unhealthy
    };

    BatchReport {
        overall_status,
        summary: format!("{healthy}/{total} services healthy"),
        statistics: BatchStatistics {
            total_services: total,
            healthy_count: healthy,
            unhealthy_count: total - healthy,
            status_distribution,
            average_response_time_ms,
        },
        services: results,
        timestamp: BatchReport::current_timestamp(),
    }
}
