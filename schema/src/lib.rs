//! Schema definitions for Procyon
//!
//! This crate contains shared data structures and schemas used across
//! the entire Procyon ecosystem: check requests, classified check results,
//! batch reports, and monitor configuration. All types here implement JSON
//! Schema generation for external consumption.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod check;
pub mod report;


pub use check::{CheckRequest, ServiceResult, ServiceStatus};
pub use report::{BatchReport, BatchStatistics, OverallStatus};

/// Runtime tuning knobs for the service checker
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Maximum number of checks running at the same time
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
    /// Timeout applied to a check when the request does not carry one, in seconds
    #[serde(default = "default_check_timeout_secs")]
    pub default_timeout_secs: f64,
    /// Ceiling on how long the dispatcher waits for any single check when
    /// collecting a batch, in seconds
    #[serde(default = "default_collect_timeout_secs")]
    pub collect_timeout_secs: u64,
    /// How long recorded results are retained in history, in hours
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
}

impl MonitorConfig {
    /// Get the default per-check timeout as a Duration
    pub fn default_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.default_timeout_secs.max(0.0))
    }

    /// Get the batch collection ceiling as a Duration
    pub fn collect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.collect_timeout_secs)
    }

    /// Get the history retention window as a Duration
    pub fn retention(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.retention_hours * 3600)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_checks: default_max_concurrent_checks(),
            default_timeout_secs: default_check_timeout_secs(),
            collect_timeout_secs: default_collect_timeout_secs(),
            retention_hours: default_retention_hours(),
        }
    }
}

const fn default_max_concurrent_checks() -> usize {
    10
}

const fn default_check_timeout_secs() -> f64 {
    5.0
}

const fn default_collect_timeout_secs() -> u64 {
    30
}

const fn default_retention_hours() -> u64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_config_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.max_concurrent_checks, 10);
        assert_eq!(config.default_timeout(), std::time::Duration::from_secs(5));
        assert_eq!(config.collect_timeout(), std::time::Duration::from_secs(30));
        assert_eq!(
            config.retention(),
            std::time::Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn test_monitor_config_negative_timeout_clamped() {
        let config = MonitorConfig {
            default_timeout_secs: -1.0,
            ..MonitorConfig::default()
        };
        assert_eq!(config.default_timeout(), std::time::Duration::ZERO);
    }
}
