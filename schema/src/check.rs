//! Check request and result types for the Procyon service checker
//!
//! This module contains the core data structures flowing through the
//! checking engine: the tagged union of check requests accepted at the
//! wire boundary, the classified result of a single check, and the
//! status taxonomy shared by probing, history, and aggregation.
//!
//! ## Status taxonomy
//!
//! Every check outcome is classified into exactly one [`ServiceStatus`].
//! "Healthy" always means `Up` or `Open`; every component answers that
//! question through [`ServiceStatus::is_healthy`] so the vocabulary cannot
//! drift between call sites.
//!
//! ## Wire shape
//!
//! [`ServiceResult`] serializes with snake_case keys and every field present
//! (nullable where optional). This shape round-trips losslessly and is the
//! contract consumed by dashboard and protocol-server front ends.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Classified outcome of a single check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// HTTP endpoint responded as expected
    Up,
    /// TCP port accepted a connection
    Open,
    /// HTTP endpoint unreachable or responded with the wrong status
    Down,
    /// TCP port actively refused the connection
    Closed,
    /// No response within the configured timeout
    Timeout,
    /// Resolution, transport, or internal failure
    Error,
    /// Not yet checked
    Unknown,
}

impl ServiceStatus {
    /// Check if this status means the target is reachable and behaving
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceStatus::Up | ServiceStatus::Open)
    }

    /// Canonical lowercase string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Up => "up",
            ServiceStatus::Open => "open",
            ServiceStatus::Down => "down",
            ServiceStatus::Closed => "closed",
            ServiceStatus::Timeout => "timeout",
            ServiceStatus::Error => "error",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

/// Immutable record of one check outcome
///
/// Constructed once at the end of a check attempt, recorded into history,
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ServiceResult {
    /// Identifier of the checked target (e.g. "Port 5432 Service Check")
    pub name: String,
    /// Classified outcome
    pub status: ServiceStatus,
    /// Wall-clock duration of the check in milliseconds, when measurable
    pub response_time: Option<f64>,
    /// Human-readable cause, present iff the status is not healthy
    pub error_message: Option<String>,
    /// Human-readable description of the target, when derivable
    pub details: Option<String>,
    /// Check completion time, seconds since the Unix epoch
    pub timestamp: f64,
}

impl ServiceResult {
    /// Create a result stamped with the current time
    pub fn new(name: impl Into<String>, status: ServiceStatus) -> Self {
        Self {
            name: name.into(),
            status,
            response_time: None,
            error_message: None,
            details: None,
            timestamp: Self::current_timestamp(),
        }
    }

    /// Check if this result counts as healthy for uptime and aggregation
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Current time as fractional seconds since the Unix epoch
    pub fn current_timestamp() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// A single check descriptor accepted at the wire boundary
///
/// Tagged by `type`; unknown tags and missing required fields fail to parse
/// and are converted into synthetic error results by the dispatcher instead
/// of aborting the batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckRequest {
    /// TCP connect check against `host:port`
    Port {
        /// Host to connect to
        #[serde(default = "default_host")]
        host: String,
        /// Port to connect to
        port: u16,
        /// Connect timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout: f64,
        /// Optional display name for the result
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// HTTP request check against `url`
    Http {
        /// URL to request
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout: f64,
        /// Required response status; 200 is required when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_status: Option<u16>,
        /// HTTP method to use
        #[serde(default = "default_method")]
        method: String,
        /// Optional display name for the result
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl CheckRequest {
    /// Parse an untyped record from the config-loader boundary
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Get the per-check timeout as a Duration
    pub fn timeout(&self) -> Duration {
        let secs = match self {
            CheckRequest::Port { timeout, .. } | CheckRequest::Http { timeout, .. } => *timeout,
        };
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Name under which the result of this check is recorded
    pub fn display_name(&self) -> String {
        match self {
            CheckRequest::Port {
                name: Some(name), ..
            }
            | CheckRequest::Http {
                name: Some(name), ..
            } => name.clone(),
            CheckRequest::Port { port, .. } => format!("Port {port} Service Check"),
            CheckRequest::Http { url, .. } => format!("HTTP Service: {url}"),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_timeout_secs() -> f64 {
    5.0
}

fn default_method() -> String {
    "GET".to_string()
}
