//! Core functionality for the Procyon project
//!
//! This crate contains the service checking engine shared by any front end:
//! TCP and HTTP probes, the per-service result history, the concurrent
//! batch dispatcher, and batch aggregation.

pub mod checker;
pub mod error;
pub mod health;
pub mod history;
pub mod report;

// Re-export schema types for convenience
pub use schema::*;

pub use checker::ServiceChecker;
pub use error::{CoreError, Result};
pub use history::ServiceHistory;

/// Core utilities and helper functions
pub mod utils {
    use tracing::{debug, info};

    /// Initialize tracing for the application
    pub fn init_tracing(level: &str) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| crate::CoreError::InitializationError(e.to_string()))?;

        info!("Tracing initialized with level: {}", level);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate_config(config: &crate::MonitorConfig) -> crate::Result<()> {
        if config.max_concurrent_checks == 0 {
            return Err(crate::CoreError::ConfigurationError(
                "Max concurrent checks must be greater than 0".to_string(),
            ));
        }

        if config.default_timeout_secs <= 0.0 {
            return Err(crate::CoreError::ConfigurationError(
                "Default timeout must be positive".to_string(),
            ));
        }

        if config.collect_timeout_secs == 0 {
            return Err(crate::CoreError::ConfigurationError(
                "Collection timeout must be greater than 0".to_string(),
            ));
        }

        if config.retention_hours == 0 {
            return Err(crate::CoreError::ConfigurationError(
                "Retention window must be at least one hour".to_string(),
            ));
        }

        debug!("Configuration validated successfully");
        Ok(())
    }
}
