// /proc/stat parsing and live sampling tests

use statusq::metrics_repo::{MetricsRepo, parse_cpu_line};
use std::time::Duration;

#[test]
fn test_parse_aggregate_cpu_line_ignores_trailing_fields() {
    let sample = parse_cpu_line("cpu  4705 150 1120 16250 520 30 45 0 0 0").expect("parse");
    assert_eq!(sample.user, 4705);
    assert_eq!(sample.nice, 150);
    assert_eq!(sample.system, 1120);
    assert_eq!(sample.idle, 16250);
}

#[test]
fn test_parse_accepts_exactly_four_counters() {
    let sample = parse_cpu_line("cpu 1 2 3 4").expect("parse");
    assert_eq!(sample.total(), 10);
}

#[test]
fn test_parse_rejects_per_core_lines() {
    assert!(parse_cpu_line("cpu0 4705 150 1120 16250").is_err());
}

#[test]
fn test_parse_rejects_short_lines() {
    let err = parse_cpu_line("cpu 1 2 3").unwrap_err();
    assert!(err.to_string().contains("four"));
}

#[test]
fn test_parse_rejects_non_numeric_counters() {
    assert!(parse_cpu_line("cpu a b c d").is_err());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_build_report_samples_live_counters() {
    let repo = MetricsRepo::new(Duration::from_millis(20));
    let report = repo.build_report().await.expect("build_report");

    assert!(report.cpu_percent >= 0.0 && report.cpu_percent <= 100.0);
    assert!(report.free_percent >= 0.0 && report.free_percent <= 100.0);
    assert!(!report.host.is_empty());

    let text = report.render();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    let time = lines[0].strip_prefix("Time: ").expect("time line");
    assert_eq!(time.len(), 8);
    assert_eq!(time.as_bytes()[2], b':');
    assert_eq!(time.as_bytes()[5], b':');
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_reports_are_independent_between_calls() {
    let repo = MetricsRepo::new(Duration::from_millis(10));
    let first = repo.build_report().await.expect("first report");
    let second = repo.build_report().await.expect("second report");
    // No smoothing or state across calls; both stand alone.
    assert!(first.cpu_percent >= 0.0 && first.cpu_percent <= 100.0);
    assert!(second.cpu_percent >= 0.0 && second.cpu_percent <= 100.0);
}
