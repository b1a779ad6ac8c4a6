#[allow(unused)]
use utils::*;

use loadsweep::prelude::*;
use mock_timeline::{Behavior, MockTimeline};
use std::sync::Arc;
use std::time::Duration;

fn sweep_config(params: Vec<u32>, runs: u32, total: u32) -> SweepConfig {
    SweepConfig {
        name: "e2e".to_string(),
        params,
        runs,
        total_requests: total,
        axis: Axis::Concurrency {
            prefix: "conc".to_string(),
        },
        seeds: Vec::new(),
        max_workers: None,
        run_deadline: None,
    }
}

fn target_for(mock: &MockTimeline, timeout: Duration) -> TimelineTarget {
    let mut config = TargetConfig::new(mock.timeline_url().parse().unwrap());
    config.request_timeout = timeout;
    TimelineTarget::new(config).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(60000)]
async fn fixed_latency_sweep_measures_sane_means() {
    init();
    let mock = MockTimeline::spawn(Behavior::delay_ms(25)).await;
    let target = Arc::new(target_for(&mock, Duration::from_secs(5)));

    let mut sink = MemorySink::new();
    let report = Sweep::new(sweep_config(vec![1, 5], 2, 40))
        .execute(target, &NoopSeeder, &mut sink)
        .await
        .unwrap();

    assert_eq!(report.records.len(), 4);
    for record in &report.records {
        assert!(!record.summary.failed);
        assert_eq!(record.summary.samples, 40);
        // Service time is 25ms; leave generous headroom for the stack.
        assert!(record.summary.mean_ms >= 25., "mean {}", record.summary.mean_ms);
        assert!(record.summary.mean_ms < 250., "mean {}", record.summary.mean_ms);
    }

    // Every assigned request arrived exactly once.
    assert_eq!(mock.counters.hits(), 4 * 40);

    assert_eq!(report.series.len(), 2);
    assert_eq!(report.series[0].param, 1);
    assert_eq!(report.series[1].param, 5);
    assert_eq!(report.series[0].runs, 2);
    assert_eq!(sink.records.len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn plan_counts_match_observed_traffic() {
    init();
    let mock = MockTimeline::spawn(Behavior::delay_ms(1)).await;
    let target = Arc::new(target_for(&mock, Duration::from_secs(5)));

    let mut sink = MemorySink::new();
    Sweep::new(sweep_config(vec![3], 1, 7))
        .execute(target, &NoopSeeder, &mut sink)
        .await
        .unwrap();

    // 7 requests across conc1..conc3 split 3/2/2, the first identity
    // carrying the remainder.
    assert_eq!(mock.counters.hits_for("conc1"), 3);
    assert_eq!(mock.counters.hits_for("conc2"), 2);
    assert_eq!(mock.counters.hits_for("conc3"), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_sweeps_spread_traffic_identically() {
    init();

    let mut distributions = Vec::new();
    for _ in 0..2 {
        let mock = MockTimeline::spawn(Behavior::delay_ms(1)).await;
        let target = Arc::new(target_for(&mock, Duration::from_secs(5)));

        let mut sink = MemorySink::new();
        Sweep::new(sweep_config(vec![4], 1, 10))
            .execute(target, &NoopSeeder, &mut sink)
            .await
            .unwrap();

        distributions.push(mock.counters.by_user());
    }

    assert_eq!(distributions[0], distributions[1]);
    assert_eq!(distributions[0].get("conc1"), Some(&3));
}

#[tokio::test(flavor = "multi_thread")]
async fn csv_report_from_a_real_sweep() -> anyhow::Result<()> {
    init();
    let mock = MockTimeline::spawn(Behavior::delay_ms(1)).await;
    let target = Arc::new(target_for(&mock, Duration::from_secs(5)));

    let path = std::env::temp_dir().join(format!("loadsweep-e2e-{}.csv", std::process::id()));
    let mut sink = CsvSink::create(&path)?;

    Sweep::new(sweep_config(vec![1, 2], 3, 6))
        .execute(target, &NoopSeeder, &mut sink)
        .await?;
    drop(sink);

    let report = std::fs::read_to_string(&path)?;
    std::fs::remove_file(&path)?;

    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "PARAM,AVG_TIME,RUN,FAILED");
    assert_eq!(lines.len(), 1 + 2 * 3);

    // Rows arrive in sweep order: all runs of param 1, then param 2.
    assert!(lines[1].starts_with("1,") && lines[1].ends_with(",1,0"));
    assert!(lines[4].starts_with("2,") && lines[4].ends_with(",1,0"));

    for row in &lines[1..] {
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields.len(), 4);
        assert!(fields[1].parse::<f64>()? > 0.);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn worker_cap_and_deadline_survive_the_full_stack() {
    init();
    let mock = MockTimeline::spawn(Behavior::delay_ms(20)).await;
    let target = Arc::new(target_for(&mock, Duration::from_secs(5)));

    let mut config = sweep_config(vec![10], 1, 400);
    config.max_workers = std::num::NonZeroUsize::new(4);
    config.run_deadline = Some(Duration::from_millis(300));

    let mut sink = MemorySink::new();
    let report = Sweep::new(config)
        .execute(target, &NoopSeeder, &mut sink)
        .await
        .unwrap();

    // The deadline fires long before 400 requests at 20ms through 4 workers
    // can finish; whatever completed is still summarized.
    let summary = report.records[0].summary;
    assert!(summary.samples < 400, "samples {}", summary.samples);
    assert!(summary.samples > 0);
    assert!(summary.mean_ms >= 20.);
}
