//! Core types and traits for health checking

use async_trait::async_trait;
use schema::ServiceResult;

/// Expectation for HTTP response validation
#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    /// Accept any 2xx status code (200-299)
    Any2xx,
    /// Require a specific status code
    Status(u16),
}

impl Expect {
    /// Check if a status code matches this expectation
    pub fn matches_status(&self, status: u16) -> bool {
        match self {
            Expect::Any2xx => (200..=299).contains(&status),
            Expect::Status(expected) => status == *expected,
        }
    }

    /// Label used in status-mismatch messages
    pub fn expected_label(&self) -> String {
        match self {
            Expect::Any2xx => "2xx".to_string(),
            Expect::Status(expected) => expected.to_string(),
        }
    }
}

/// Trait for health check implementations
///
/// This trait is implemented by specific probe types (TCP, HTTP) to provide
/// a uniform interface for the dispatcher. A probe never fails at this
/// boundary: every underlying outcome, including timeouts and transport
/// errors, is classified into the returned `ServiceResult`.
#[async_trait]
pub trait Probe {
    /// Execute the check and classify the outcome
    async fn run(&self) -> ServiceResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_matches_status() {
        // Test Any2xx
        let any2xx = Expect::Any2xx;
        assert!(any2xx.matches_status(200));
        assert!(any2xx.matches_status(201));
        assert!(any2xx.matches_status(299));
        assert!(!any2xx.matches_status(199));
        assert!(!any2xx.matches_status(300));
        assert!(!any2xx.matches_status(404));

        // Test specific status
        let status200 = Expect::Status(200);
        assert!(status200.matches_status(200));
        assert!(!status200.matches_status(201));
        assert!(!status200.matches_status(404));

        let status503 = Expect::Status(503);
        assert!(status503.matches_status(503));
        assert!(!status503.matches_status(200));
    }

    #[test]
    fn test_expect_labels() {
        assert_eq!(Expect::Any2xx.expected_label(), "2xx");
        assert_eq!(Expect::Status(204).expected_label(), "204");
    }
}
