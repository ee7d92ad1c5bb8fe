//! HTTP request health probing

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{round_ms, Expect, HealthError, Probe};
use schema::{ServiceResult, ServiceStatus};

/// HTTP health probe that issues one request and validates the response
///
/// The probe sends a single request (GET unless configured otherwise) to the
/// specified URL, following the client's default redirect policy, and
/// classifies the outcome:
///
/// - response received and status matches the expectation → `up`
/// - response received with the wrong status → `down`
/// - no response within the timeout → `timeout`
/// - connection refused or unreachable → `down`
/// - any other transport or protocol error → `error`
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// URL to request
    url: String,
    /// HTTP method to use
    method: String,
    /// Expected response criteria
    expect: Expect,
    /// Request timeout
    timeout: Duration,
    /// Name under which the result is reported
    name: String,
    /// Client issuing the request
    client: Client,
}

impl HttpProbe {
    /// Create a new HTTP probe with its own client
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `expect` - The expectation for validating the response status
    /// * `timeout` - Maximum time to wait for the request to complete
    pub fn new(url: impl Into<String>, expect: Expect, timeout: Duration) -> Self {
        let url = url.into();
        Self {
            name: format!("HTTP Service: {url}"),
            url,
            method: "GET".to_string(),
            expect,
            timeout,
            client: Client::new(),
        }
    }

    /// Issue the request through a shared client instead of a private one
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Use a method other than GET
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Report the result under a caller-supplied name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the expected response criteria
    pub fn expect(&self) -> &Expect {
        &self.expect
    }

    async fn send(&self, method: Method) -> Result<reqwest::Response, HealthError> {
        let response = self
            .client
            .request(method, &self.url)
            .timeout(self.timeout)
            .send()
            .await;
        match response {
            Ok(response) => Ok(response),
            Err(error) if error.is_timeout() => Err(HealthError::Timeout(self.timeout)),
            Err(error) => Err(HealthError::Http(error)),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn run(&self) -> ServiceResult {
        debug!("HTTP probe requesting {} {}", self.method, self.url);

        let mut result = ServiceResult::new(&self.name, ServiceStatus::Unknown);

        let method = match Method::from_bytes(self.method.to_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                result.status = ServiceStatus::Error;
                result.error_message = Some(format!("Unsupported HTTP method: {}", self.method));
                return result;
            }
        };

        let start = Instant::now();
        let outcome = self.send(method).await;
        let elapsed_ms = round_ms(start.elapsed().as_secs_f64() * 1000.0);
        result.response_time = Some(elapsed_ms);

        match outcome {
            Ok(response) => {
                let status_code = response.status().as_u16();
                debug!(
                    "HTTP probe to {} returned status {} in {}ms",
                    self.url, status_code, elapsed_ms
                );
                result.details = Some(describe_response(&self.url, &response));

                if self.expect.matches_status(status_code) {
                    result.status = ServiceStatus::Up;
                } else {
                    result.status = ServiceStatus::Down;
                    result.error_message = Some(format!(
                        "Unexpected status: expected {}, got {}",
                        self.expect.expected_label(),
                        status_code
                    ));
                }
            }
            Err(HealthError::Timeout(bound)) => {
                debug!("HTTP probe to {} timed out after {:?}", self.url, bound);
                result.status = ServiceStatus::Timeout;
                result.response_time = Some(round_ms(bound.as_secs_f64() * 1000.0));
                result.error_message = Some(format!(
                    "HTTP request timed out after {}s",
                    bound.as_secs_f64()
                ));
                result.details = Some(format!(
                    "Service at {} - timeout occurred",
                    host_label(&self.url)
                ));
            }
            Err(HealthError::Http(error)) if error.is_connect() => {
                debug!("HTTP probe to {} failed to connect: {}", self.url, error);
                result.status = ServiceStatus::Down;
                result.error_message = Some("Connection failed - service unreachable".to_string());
                result.details = Some(format!(
                    "Service at {} is not responding",
                    host_label(&self.url)
                ));
            }
            Err(error) => {
                debug!("HTTP probe to {} failed: {}", self.url, error);
                result.status = ServiceStatus::Error;
                result.error_message = Some(format!("HTTP error: {error}"));
                result.details = Some(format!(
                    "Service at {} - request error",
                    host_label(&self.url)
                ));
            }
        }

        result
    }
}

/// Describe a responding service from its response headers
fn describe_response(url: &str, response: &reqwest::Response) -> String {
    let headers = response.headers();
    let server = headers
        .get(reqwest::header::SERVER)
        .and_then(|v| v.to_str().ok());
    let content_type = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match (server, content_type) {
        (Some(server), Some(content_type)) => format!("{server} serving {content_type}"),
        (Some(server), None) => format!("{server} is responding"),
        (None, Some(content_type)) => format!("Service responding with {content_type}"),
        (None, None) => format!("Service at {} is responding", host_label(url)),
    }
}

/// Host portion of a URL, falling back to the raw string
fn host_label(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
