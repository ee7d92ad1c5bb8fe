//! TCP connection health probing

use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use super::{round_ms, HealthError, Probe};
use schema::{ServiceResult, ServiceStatus};

/// Well-known ports and the services commonly listening on them
const PORT_SERVICES: &[(u16, &str)] = &[
    (22, "SSH (Secure Shell)"),
    (25, "SMTP Mail Server"),
    (53, "DNS Server"),
    (80, "HTTP Web Server"),
    (110, "POP3 Mail Retrieval"),
    (143, "IMAP Mail Access"),
    (443, "HTTPS Web Server"),
    (587, "SMTP Submission"),
    (993, "IMAPS Secure Mail"),
    (995, "POP3S Secure Mail"),
    (3000, "React/Express Development Server"),
    (3306, "MySQL Database Server"),
    (4000, "Next.js Development Server"),
    (4200, "Angular Development Server"),
    (5000, "Flask Development Server"),
    (5432, "PostgreSQL Database Server"),
    (6379, "Redis Cache Server"),
    (8000, "Django/FastAPI Development Server"),
    (8025, "MailHog Web UI"),
    (8080, "HTTP Alternate"),
    (9000, "PHP Development Server"),
    (9200, "Elasticsearch Search Engine"),
    (15672, "RabbitMQ Management"),
    (27017, "MongoDB Database Server"),
];

/// Human-readable description of the service commonly found on a port
///
/// Falls back to a range-based guess for unknown ports in the usual
/// development-server ranges, then to a generic label.
pub fn describe_port(port: u16) -> String {
    if let Some((_, service)) = PORT_SERVICES.iter().find(|(p, _)| *p == port) {
        return (*service).to_string();
    }
    match port {
        3000..=3999 => format!("Port {port} - Likely Development Server"),
        8000..=8999 => format!("Port {port} - Likely Web Server/API"),
        _ => format!("Port {port} - Custom Service"),
    }
}

/// TCP health probe that tests connection establishment
///
/// This probe attempts to establish a TCP connection to the specified
/// host and port. The connection is immediately closed after establishment;
/// no data is exchanged. Every outcome is classified:
///
/// - connection established → `open`
/// - connection refused → `closed`
/// - no response within the timeout → `timeout`
/// - resolution or any other I/O failure → `error`
#[derive(Debug, Clone)]
pub struct TcpProbe {
    /// Target host to connect to
    host: String,
    /// Target port to connect to
    port: u16,
    /// Connection timeout
    timeout: Duration,
    /// Name under which the result is reported
    name: String,
}

impl TcpProbe {
    /// Create a new TCP probe
    ///
    /// # Arguments
    ///
    /// * `host` - The host to connect to (e.g., "127.0.0.1", "localhost")
    /// * `port` - The port to connect to
    /// * `timeout` - Maximum time to wait for connection establishment
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
            name: format!("Port {port} Service Check"),
        }
    }

    /// Report the result under a caller-supplied name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the target address as a string
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn connect(&self) -> Result<(), HealthError> {
        let address = self.address();
        let connect = async {
            let addrs: Vec<SocketAddr> = lookup_host(address.as_str())
                .await
                .map_err(|e| HealthError::Resolution(e.to_string()))?
                .collect();
            let Some(addr) = addrs.first().copied() else {
                return Err(HealthError::Resolution(format!(
                    "no addresses found for {}",
                    self.host
                )));
            };
            let _stream = TcpStream::connect(addr).await?;
            // Stream is dropped here, closing the connection
            Ok(())
        };
        match timeout(self.timeout, connect).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(HealthError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn run(&self) -> ServiceResult {
        let address = self.address();
        debug!("TCP probe connecting to {}", address);

        let start = Instant::now();
        let outcome = self.connect().await;
        let elapsed_ms = round_ms(start.elapsed().as_secs_f64() * 1000.0);

        let mut result = ServiceResult::new(&self.name, ServiceStatus::Unknown);
        result.details = Some(describe_port(self.port));
        result.response_time = Some(elapsed_ms);

        match outcome {
            Ok(()) => {
                debug!("TCP probe to {} succeeded in {}ms", address, elapsed_ms);
                result.status = ServiceStatus::Open;
            }
            Err(HealthError::Timeout(bound)) => {
                debug!("TCP probe to {} timed out after {:?}", address, bound);
                result.status = ServiceStatus::Timeout;
                result.response_time = Some(round_ms(bound.as_secs_f64() * 1000.0));
                result.error_message = Some(format!(
                    "Connection timeout after {}s",
                    bound.as_secs_f64()
                ));
            }
            Err(HealthError::Resolution(msg)) => {
                debug!("TCP probe to {} failed to resolve: {}", address, msg);
                result.status = ServiceStatus::Error;
                result.error_message = Some(format!("DNS resolution failed: {msg}"));
            }
            Err(HealthError::Connect(io_error))
                if io_error.kind() == ErrorKind::ConnectionRefused =>
            {
                debug!("TCP probe to {} refused", address);
                result.status = ServiceStatus::Closed;
                result.error_message = Some(
                    "Connection refused - service not running or blocking connections".to_string(),
                );
            }
            Err(error) => {
                debug!("TCP probe to {} failed: {}", address, error);
                result.status = ServiceStatus::Error;
                result.error_message = Some(format!("Network error: {error}"));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::task;

    #[tokio::test]
    async fn test_tcp_probe_open_port() {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local address");

        // Spawn a task to accept connections (but we don't need to do anything with them)
        let _handle = task::spawn(async move {
            while let Ok((_stream, _addr)) = listener.accept().await {
                // Just accept and drop connections
            }
        });

        let probe = TcpProbe::new("127.0.0.1", addr.port(), Duration::from_secs(1));
        let result = probe.run().await;

        assert_eq!(result.status, ServiceStatus::Open, "probe result: {result:?}");
        assert!(result.is_healthy());
        assert!(result.response_time.is_some());
        assert!(result.error_message.is_none());
        assert!(result.details.is_some());
    }

    #[tokio::test]
    async fn test_tcp_probe_connection_refused() {
        // Port 1 is essentially never listening
        let probe = TcpProbe::new("127.0.0.1", 1, Duration::from_secs(1));
        let result = probe.run().await;

        assert_eq!(result.status, ServiceStatus::Closed, "probe result: {result:?}");
        assert!(!result.is_healthy());
        assert!(result.error_message.is_some());
        assert!(result.response_time.is_some());
    }

    #[tokio::test]
    async fn test_tcp_probe_never_healthy_without_listener() {
        let probe = TcpProbe::new("127.0.0.1", 1, Duration::from_millis(100));
        let result = probe.run().await;

        assert!(matches!(
            result.status,
            ServiceStatus::Closed | ServiceStatus::Timeout | ServiceStatus::Error
        ));
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn test_tcp_probe_timeout() {
        // 10.255.255.1 is non-routable and should time out
        let probe = TcpProbe::new("10.255.255.1", 80, Duration::from_millis(100));
        let result = probe.run().await;

        assert_eq!(result.status, ServiceStatus::Timeout, "probe result: {result:?}");
        // On timeout the response time equals the configured bound
        assert_eq!(result.response_time, Some(100.0));
        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("timeout"));
    }

    #[tokio::test]
    async fn test_tcp_probe_resolution_failure() {
        let probe = TcpProbe::new(
            "no-such-host.invalid",
            80,
            Duration::from_secs(2),
        );
        let result = probe.run().await;

        assert!(matches!(
            result.status,
            ServiceStatus::Error | ServiceStatus::Timeout
        ));
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn test_tcp_probe_custom_name() {
        let probe =
            TcpProbe::new("127.0.0.1", 1, Duration::from_millis(100)).named("Postgres (staging)");
        let result = probe.run().await;
        assert_eq!(result.name, "Postgres (staging)");
    }

    #[test]
    fn test_tcp_probe_address() {
        let probe = TcpProbe::new("localhost", 8080, Duration::from_secs(5));
        assert_eq!(probe.address(), "localhost:8080");

        let probe = TcpProbe::new("127.0.0.1", 3000, Duration::from_secs(1));
        assert_eq!(probe.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_describe_port_known_services() {
        assert_eq!(describe_port(5432), "PostgreSQL Database Server");
        assert_eq!(describe_port(6379), "Redis Cache Server");
        assert_eq!(describe_port(22), "SSH (Secure Shell)");
        assert_eq!(describe_port(27017), "MongoDB Database Server");
    }

    #[test]
    fn test_describe_port_ranges_and_fallback() {
        assert_eq!(describe_port(3123), "Port 3123 - Likely Development Server");
        assert_eq!(describe_port(8500), "Port 8500 - Likely Web Server/API");
        assert_eq!(describe_port(12345), "Port 12345 - Custom Service");
    }
}
