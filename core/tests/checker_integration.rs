//! End-to-end tests for the service checker
//!
//! These tests drive the full pipeline — dispatch, probing, history
//! recording, aggregation — against real local listeners and a real HTTP
//! server, the way an external front end would use the crate.

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Response, Server};
use procyon_core::{CheckRequest, MonitorConfig, OverallStatus, ServiceChecker, ServiceStatus};
use std::convert::Infallible;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task;

async fn spawn_tcp_listener() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().expect("no local addr").port();
    task::spawn(async move {
        while let Ok((_stream, _addr)) = listener.accept().await {
            // Accept and drop connections
        }
    });
    port
}

async fn spawn_http_server() -> u16 {
    let make_svc = make_service_fn(|_conn| async {
        Ok::<_, Infallible>(service_fn(|req| async move {
            match req.uri().path() {
                "/health" => {
                    let response = Response::builder()
                        .header("content-type", "application/json")
                        .body(Body::from("{\"ok\":true}"))
                        .unwrap();
                    Ok::<_, Infallible>(response)
                }
                _ => {
                    let response = Response::builder()
                        .status(404)
                        .body(Body::from("not found"))
                        .unwrap();
                    Ok::<_, Infallible>(response)
                }
            }
        }))
    });

    let addr = ([127, 0, 0, 1], 0).into();
    let server = Server::bind(&addr).serve(make_svc);
    let port = server.local_addr().port();
    task::spawn(async move {
        if let Err(e) = server.await {
            eprintln!("Server error: {}", e);
        }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    port
}

#[tokio::test]
async fn mixed_batch_end_to_end() {
    let checker = ServiceChecker::new(MonitorConfig::default());
    let tcp_port = spawn_tcp_listener().await;
    let http_port = spawn_http_server().await;

    let requests = vec![
        CheckRequest::Port {
            host: "127.0.0.1".to_string(),
            port: tcp_port,
            timeout: 1.0,
            name: Some("Local TCP".to_string()),
        },
        CheckRequest::Http {
            url: format!("http://127.0.0.1:{http_port}/health"),
            timeout: 1.0,
            expected_status: None,
            method: "GET".to_string(),
            name: Some("Local HTTP".to_string()),
        },
        CheckRequest::Port {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout: 0.5,
            name: Some("Dead Port".to_string()),
        },
    ];

    let report = checker.check_batch(requests).await.expect("batch should run");

    assert_eq!(report.services.len(), 3);
    assert_eq!(report.overall_status, OverallStatus::Unhealthy);
    assert_eq!(report.statistics.healthy_count, 2);
    assert_eq!(report.statistics.unhealthy_count, 1);
    assert_eq!(report.summary, "2/3 services healthy");

    // Every member was recorded into history under its request name
    for name in ["Local TCP", "Local HTTP", "Dead Port"] {
        let entries = checker.get_history(name, None);
        assert_eq!(entries.len(), 1, "missing history for {name}");
    }

    // The healthy members drive their uptime to 100%
    assert_eq!(checker.get_uptime("Local TCP", None), 100.0);
    assert_eq!(checker.get_uptime("Dead Port", None), 0.0);
}

#[tokio::test]
async fn http_expectation_mismatch_reported_down() {
    let checker = ServiceChecker::new(MonitorConfig::default());
    let http_port = spawn_http_server().await;

    let result = checker
        .check_http(
            &format!("http://127.0.0.1:{http_port}/missing"),
            Some(1.0),
            None,
            None,
        )
        .await;

    assert_eq!(result.status, ServiceStatus::Down);
    let message = result.error_message.expect("mismatch should carry a message");
    assert!(message.contains("expected 200"), "message: {message}");

    // An explicit expectation of 404 flips the same endpoint to healthy
    let result = checker
        .check_http(
            &format!("http://127.0.0.1:{http_port}/missing"),
            Some(1.0),
            Some(404),
            None,
        )
        .await;
    assert_eq!(result.status, ServiceStatus::Up);
}

#[tokio::test]
async fn sequential_port_checks_accumulate_history() {
    let checker = ServiceChecker::new(MonitorConfig::default());
    let tcp_port = spawn_tcp_listener().await;

    let first = checker.check_port("127.0.0.1", tcp_port, Some(1.0)).await;
    let second = checker.check_port("127.0.0.1", tcp_port, Some(1.0)).await;

    assert_eq!(first.status, ServiceStatus::Open);
    assert_eq!(second.status, ServiceStatus::Open);

    let entries = checker.get_history(&first.name, None);
    assert_eq!(entries.len(), 2);
    assert!(entries[0].timestamp <= entries[1].timestamp);
}

#[tokio::test]
async fn batch_report_serializes_to_wire_shape() {
    let checker = ServiceChecker::new(MonitorConfig::default());

    let report = checker
        .check_batch(vec![CheckRequest::Port {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout: 0.2,
            name: None,
        }])
        .await
        .expect("batch should run");

    let value = serde_json::to_value(&report).expect("report should serialize");
    assert!(value["overall_status"].is_string());
    assert!(value["summary"].is_string());
    assert!(value["timestamp"].is_string());
    assert!(value["statistics"]["total_services"].is_number());

    let service = &value["services"][0];
    for key in [
        "name",
        "status",
        "response_time",
        "error_message",
        "details",
        "timestamp",
    ] {
        assert!(
            service.as_object().unwrap().contains_key(key),
            "missing wire field {key}"
        );
    }
}
