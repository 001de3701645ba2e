//! Stress tests for the load driver itself
//!
//! These make sure the driver is not the bottleneck:
//! - Many virtual users against a slow service
//! - Voter uniqueness at high iteration counts
//! - Throughput against a real HTTP listener

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::*;
use poll_loadtest::metrics::RequestTag;
use poll_loadtest::{LoadTest, RunOptions};

fn options(vus: u32, iterations: u64) -> RunOptions {
    RunOptions {
        vus,
        iterations,
        ..RunOptions::default()
    }
}

/// Test: Virtual users overlap their requests
///
/// With 50 VUs and a 20ms service, 1000 iterations must finish far sooner
/// than the 20s a sequential driver would need.
#[tokio::test]
#[ignore] // Ignore by default as this is a slow test
async fn test_virtual_users_run_concurrently() {
    let stub = Arc::new(StubPollsApi::new(201, Duration::from_millis(20)));
    let load_test = LoadTest::new(stub.clone(), options(50, 1_000));

    let start = Instant::now();
    let summary = load_test
        .run_with(&subject(), &poll(), CancellationToken::new())
        .await
        .unwrap();
    let elapsed = start.elapsed();

    println!("1000 iterations over 50 VUs in {:?}", elapsed);
    assert_eq!(summary.iterations_completed, 1_000);
    assert!(
        elapsed < Duration::from_secs(5),
        "VUs did not overlap, took {:?}",
        elapsed
    );
}

/// Test: Voter uniqueness at volume
#[tokio::test]
#[ignore] // Ignore by default as this is a slow test
async fn test_voters_unique_over_many_iterations() {
    let stub = Arc::new(StubPollsApi::new(201, Duration::ZERO));
    let load_test = LoadTest::new(stub.clone(), options(32, 50_000));
    load_test
        .run_with(&subject(), &poll(), CancellationToken::new())
        .await
        .unwrap();

    let voters = stub.voters.lock();
    let unique: HashSet<_> = voters.iter().collect();
    assert_eq!(voters.len(), 50_000);
    assert_eq!(unique.len(), 50_000);
}

/// Benchmark: Throughput against a real HTTP listener
#[tokio::test]
#[ignore] // Ignore by default as this is a slow test
async fn test_http_throughput_benchmark() {
    let server = MockServer::start().await;
    mount_setup(&server).await;
    Mock::given(method("POST"))
        .and(path(votes_path()))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let load_test = LoadTest::new(Arc::new(http_api(&server)), options(20, 5_000));
    let summary = load_test
        .run_with(&subject(), &poll(), CancellationToken::new())
        .await
        .unwrap();

    let votes = summary
        .requests
        .iter()
        .find(|r| r.tag == RequestTag::Vote)
        .unwrap();
    println!(
        "Throughput: {:.0} votes/second (p95 {:.2}ms, max {:.2}ms)",
        summary.iterations_per_sec(),
        votes.p95_ms,
        votes.max_ms
    );

    assert_eq!(summary.iterations_completed, 5_000);
    assert_eq!(summary.check_rate, 1.0);
    assert!(
        summary.iterations_per_sec() > 100.0,
        "Throughput too low: {:.0} votes/s",
        summary.iterations_per_sec()
    );
}
