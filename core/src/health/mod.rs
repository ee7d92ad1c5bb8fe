//! Health checking and probing functionality
//!
//! This module provides HTTP and TCP probing primitives for checking the
//! services of a local development stack. Probes classify every possible
//! outcome into the shared status taxonomy; nothing at this boundary fails
//! with an error.
//!
//! ## Types
//!
//! - [`Probe`]: The main trait for check implementations
//! - [`TcpProbe`]: TCP connection-based checking
//! - [`HttpProbe`]: HTTP request-based checking
//! - [`Expect`]: Expected response criteria for HTTP probes
//! - [`HealthError`]: Internal failure taxonomy feeding classification
//!
//! ## Integration
//!
//! [`create_probe`] translates a wire-level `schema::CheckRequest` into the
//! matching probe implementation; the dispatcher uses it for every batch
//! member.

pub mod error;
pub mod http;
pub mod tcp;
pub mod types;

// Tests are included inline in each module

pub use error::HealthError;
pub use http::HttpProbe;
pub use tcp::{describe_port, TcpProbe};
pub use types::{Expect, Probe};

use reqwest::Client;
use schema::CheckRequest;

/// Create a probe from a check request
///
/// This function translates between the wire-level request and the concrete
/// probe implementations, applying the request's timeout, expectation, and
/// display name. HTTP probes issue their request through the shared client.
pub fn create_probe(request: &CheckRequest, client: Client) -> Box<dyn Probe + Send + Sync> {
    match request {
        CheckRequest::Port {
            host, port, name, ..
        } => {
            let mut probe = TcpProbe::new(host.clone(), *port, request.timeout());
            if let Some(name) = name {
                probe = probe.named(name);
            }
            Box::new(probe)
        }
        CheckRequest::Http {
            url,
            expected_status,
            method,
            name,
            ..
        } => {
            // No expectation means the endpoint must answer 200
            let expect = match expected_status {
                Some(code) => Expect::Status(*code),
                None => Expect::Status(200),
            };
            let mut probe = HttpProbe::new(url.clone(), expect, request.timeout())
                .with_client(client)
                .with_method(method.clone());
            if let Some(name) = name {
                probe = probe.named(name);
            }
            Box::new(probe)
        }
    }
}

/// Round a millisecond reading to two decimal places
pub(crate) fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}
