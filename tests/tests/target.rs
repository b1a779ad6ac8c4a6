#[allow(unused)]
use utils::*;

use loadsweep::prelude::*;
use mock_timeline::{Behavior, MockTimeline};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn target_for(mock: &MockTimeline, timeout: Duration) -> TimelineTarget {
    let mut config = TargetConfig::new(mock.timeline_url().parse().unwrap());
    config.request_timeout = timeout;
    TimelineTarget::new(config).unwrap()
}

/// Serves `200 OK` with the head sent right away and the two-byte body only
/// after `body_delay`, or never when `body_delay` is `None`.
async fn slow_body_endpoint(body_delay: Option<Duration>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let head =
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\n\r\n";
                let _ = socket.write_all(head).await;
                let Some(delay) = body_delay else {
                    // Keep the connection open with the body outstanding.
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    return;
                };
                tokio::time::sleep(delay).await;
                let _ = socket.write_all(b"[]").await;
            });
        }
    });
    format!("http://{addr}/api/timeline")
}

fn one_shot_config() -> SweepConfig {
    SweepConfig {
        name: "one-shot".to_string(),
        params: vec![2],
        runs: 1,
        total_requests: 4,
        axis: Axis::Concurrency {
            prefix: "conc".to_string(),
        },
        seeds: Vec::new(),
        max_workers: None,
        run_deadline: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn mock_speaks_the_endpoint_contract() {
    init();
    let mock = MockTimeline::spawn(Behavior::delay_ms(1)).await;

    let response = reqwest::get(format!("{}?user=conc1&limit=2", mock.timeline_url()))
        .await
        .unwrap();
    assert!(response.status().is_success());

    let posts: serde_json::Value = response.json().await.unwrap();
    assert_eq!(posts.as_array().unwrap().len(), 2);
    assert_eq!(mock.counters.hits_for("conc1"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_endpoint_marks_every_run() {
    init();
    let mock = MockTimeline::spawn(Behavior::failing()).await;
    let target = Arc::new(target_for(&mock, Duration::from_secs(5)));

    let mut sink = MemorySink::new();
    let report = Sweep::new(one_shot_config())
        .execute(target, &NoopSeeder, &mut sink)
        .await
        .unwrap();

    let summary = report.records[0].summary;
    assert!(summary.failed);
    assert_eq!(summary.samples, 4);
    // Failure latencies still count toward the mean.
    assert!(summary.mean_ms.is_finite());
    assert!(summary.mean_ms >= 0.);
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60000)]
async fn latency_spans_the_body_download() {
    init();
    let delay = Duration::from_millis(800);
    let url = slow_body_endpoint(Some(delay)).await;
    let target = TimelineTarget::new(TargetConfig::new(url.parse().unwrap())).unwrap();

    let identity = Identity::from("conc1");
    let sample = target.execute(&identity).await;

    assert!(!sample.failed, "a slow body is latency, not a failure");
    assert!(
        sample.elapsed >= delay,
        "elapsed {:?} must cover the {delay:?} body transfer",
        sample.elapsed
    );
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60000)]
async fn stalled_body_times_out_as_failure() {
    init();
    let url = slow_body_endpoint(None).await;
    let mut config = TargetConfig::new(url.parse().unwrap());
    config.request_timeout = Duration::from_millis(300);
    let target = TimelineTarget::new(config).unwrap();

    let identity = Identity::from("conc1");
    let sample = target.execute(&identity).await;

    assert!(sample.failed);
    assert!(
        sample.elapsed >= Duration::from_millis(250),
        "elapsed {:?}",
        sample.elapsed
    );
    assert!(sample.elapsed < Duration::from_secs(5), "elapsed {:?}", sample.elapsed);
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60000)]
async fn timeout_counts_as_failure_with_latency_kept() {
    init();
    let mock = MockTimeline::spawn(Behavior::delay_ms(400)).await;
    let target = Arc::new(target_for(&mock, Duration::from_millis(50)));

    let mut sink = MemorySink::new();
    let report = Sweep::new(one_shot_config())
        .execute(target, &NoopSeeder, &mut sink)
        .await
        .unwrap();

    let summary = report.records[0].summary;
    assert!(summary.failed);
    assert_eq!(summary.samples, 4);
    assert!(summary.mean_ms >= 45., "mean {}", summary.mean_ms);
    assert!(summary.mean_ms < 400., "mean {}", summary.mean_ms);
}
