//! Timing math for checks: queue latency, runtime, final duration.
//!
//! Every function takes `now` explicitly and never returns a negative
//! duration; clock skew between the commit and the runner clamps to zero.

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, TimeDelta, Utc};

use checkwatch_types::{CheckRun, CheckStatus};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("µs", 1_000.0),
    ("us", 1_000.0),
    ("ms", 1_000_000.0),
    ("s", 1_000_000_000.0),
    ("m", 60_000_000_000.0),
    ("h", 3_600_000_000_000.0),
];

fn non_negative(delta: TimeDelta) -> TimeDelta {
    delta.max(TimeDelta::zero())
}

/// Time from the reference event (head commit) until the check started.
pub fn queue_latency(reference: Option<DateTime<Utc>>, check: &CheckRun) -> TimeDelta {
    match (reference, check.started_at) {
        (Some(reference), Some(started)) => non_negative(started - reference),
        _ => TimeDelta::zero(),
    }
}

/// Elapsed time of a running check.
pub fn runtime(check: &CheckRun, now: DateTime<Utc>) -> TimeDelta {
    match (&check.status, check.started_at) {
        (CheckStatus::InProgress, Some(started)) => non_negative(now - started),
        _ => TimeDelta::zero(),
    }
}

/// Total runtime of a finished check.
///
/// A check can briefly report `completed` before `completed_at` is filled in;
/// that case measures up to `now` instead.
pub fn final_duration(check: &CheckRun, now: DateTime<Utc>) -> TimeDelta {
    match (check.started_at, check.completed_at) {
        (Some(started), Some(completed)) => non_negative(completed - started),
        (Some(started), None) if check.status.is_completed() => non_negative(now - started),
        _ => TimeDelta::zero(),
    }
}

/// Format a duration compactly, e.g. `1h 30m`, `2m 5s`, `45s`.
///
/// Rounds to the nearest second and leaves out zero-valued units. Zero and
/// negative durations render as `0s`.
pub fn format_duration(d: TimeDelta) -> String {
    let millis = d.num_milliseconds();
    if millis <= 0 {
        return "0s".to_string();
    }

    let total = millis.saturating_add(500) / 1000;
    if total == 0 {
        return "0s".to_string();
    }

    let parts = [(total / 3600, "h"), ((total % 3600) / 60, "m"), (total % 60, "s")];
    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a monotonic elapsed time (e.g. `Instant::elapsed`).
pub fn format_std(d: Duration) -> String {
    format_duration(TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX))
}

/// Parse duration strings like "5s", "500ms", "2m", "1h", "1.5s"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Duration must be a non-negative number: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkwatch_types::Conclusion;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn secs(n: i64) -> TimeDelta {
        TimeDelta::seconds(n)
    }

    #[test]
    fn test_format_duration_examples() {
        assert_eq!(format_duration(secs(5400)), "1h 30m");
        assert_eq!(format_duration(secs(45)), "45s");
        assert_eq!(format_duration(secs(0)), "0s");
        assert_eq!(format_duration(secs(-5)), "0s");
        assert_eq!(format_duration(secs(90)), "1m 30s");
        assert_eq!(format_duration(secs(3600)), "1h");
        assert_eq!(format_duration(secs(3601)), "1h 1s");
        assert_eq!(format_duration(secs(3723)), "1h 2m 3s");
    }

    #[test]
    fn test_format_duration_rounds_to_nearest_second() {
        assert_eq!(format_duration(TimeDelta::milliseconds(1_499)), "1s");
        assert_eq!(format_duration(TimeDelta::milliseconds(1_500)), "2s");
        assert_eq!(format_duration(TimeDelta::milliseconds(59_700)), "1m");
        assert_eq!(format_duration(TimeDelta::milliseconds(400)), "0s");
    }

    #[test]
    fn test_format_duration_is_stable_under_resumming() {
        for total in [1, 59, 60, 61, 3599, 3600, 5400, 86_399] {
            let text = format_duration(secs(total));
            let resummed: i64 = text
                .split(' ')
                .map(|part| {
                    let (value, unit) = part.split_at(part.len() - 1);
                    let value: i64 = value.parse().unwrap();
                    match unit {
                        "h" => value * 3600,
                        "m" => value * 60,
                        _ => value,
                    }
                })
                .sum();
            assert_eq!(resummed, total);
            assert_eq!(format_duration(secs(resummed)), text);
        }
    }

    #[test]
    fn test_queue_latency() {
        let check = CheckRun::builder("build").started_at(t0() + secs(45)).build();
        assert_eq!(queue_latency(Some(t0()), &check), secs(45));
        assert_eq!(queue_latency(None, &check), TimeDelta::zero());

        let not_started = CheckRun::builder("build").build();
        assert_eq!(queue_latency(Some(t0()), &not_started), TimeDelta::zero());
    }

    #[test]
    fn test_queue_latency_clock_skew_is_zero() {
        let check = CheckRun::builder("build").started_at(t0() - secs(30)).build();
        assert_eq!(queue_latency(Some(t0()), &check), TimeDelta::zero());
    }

    #[test]
    fn test_runtime_only_for_in_progress() {
        let running = CheckRun::builder("build")
            .status(CheckStatus::InProgress)
            .started_at(t0())
            .build();
        assert_eq!(runtime(&running, t0() + secs(75)), secs(75));

        let queued = CheckRun::builder("build").started_at(t0()).build();
        assert_eq!(runtime(&queued, t0() + secs(75)), TimeDelta::zero());

        let done = CheckRun::builder("build")
            .completed(Conclusion::Success)
            .started_at(t0())
            .build();
        assert_eq!(runtime(&done, t0() + secs(75)), TimeDelta::zero());
    }

    #[test]
    fn test_runtime_future_start_is_zero() {
        let running = CheckRun::builder("build")
            .status(CheckStatus::InProgress)
            .started_at(t0() + secs(10))
            .build();
        assert_eq!(runtime(&running, t0()), TimeDelta::zero());
    }

    #[test]
    fn test_final_duration() {
        let done = CheckRun::builder("build")
            .completed(Conclusion::Failure)
            .started_at(t0())
            .completed_at(t0() + secs(210))
            .build();
        assert_eq!(final_duration(&done, t0() + secs(999)), secs(210));
    }

    #[test]
    fn test_final_duration_missing_completed_at_falls_back_to_now() {
        let done = CheckRun::builder("build")
            .completed(Conclusion::Success)
            .started_at(t0())
            .build();
        assert_eq!(final_duration(&done, t0() + secs(12)), secs(12));

        let running = CheckRun::builder("build")
            .status(CheckStatus::InProgress)
            .started_at(t0())
            .build();
        assert_eq!(final_duration(&running, t0() + secs(12)), TimeDelta::zero());
    }

    #[test]
    fn test_final_duration_never_negative() {
        let skewed = CheckRun::builder("build")
            .completed(Conclusion::Success)
            .started_at(t0())
            .completed_at(t0() - secs(3))
            .build();
        assert_eq!(final_duration(&skewed, t0()), TimeDelta::zero());

        let unstarted = CheckRun::builder("build").completed(Conclusion::Skipped).build();
        assert_eq!(final_duration(&unstarted, t0()), TimeDelta::zero());
    }

    #[test]
    fn test_format_std() {
        assert_eq!(format_std(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_std_saturates_on_huge_values() {
        let text = format_std(Duration::MAX);
        assert!(text.starts_with("2562047788015h"));
        assert!(text.ends_with('s'));
    }

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("29.992671083s").unwrap();
        assert!((d.as_secs_f64() - 29.992671083).abs() < 0.0001);
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("988.82775ms").unwrap();
        assert!((d.as_secs_f64() - 0.98882775).abs() < 0.0001);
    }

    #[test]
    fn test_parse_minutes_and_hours() {
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_duration("5 fortnights").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("").is_err());
    }
}
