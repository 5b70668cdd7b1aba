//! Reductions from raw samples to probe results.

use crate::results::{JitterResult, LatencyResult};
use crate::stats::{consecutive_differences, max, mean, min, std_dev};
use std::time::Duration;

/// Percentage of `attempts` that succeeded.
pub fn success_rate(successes: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }

    f64::from(successes) / f64::from(attempts) * 100.0
}

/// Reduce successful round-trip times (ms) to latency statistics.
///
/// Returns `None` when no sample succeeded.
pub fn latency(samples_ms: &[f64], failed: u32) -> Option<LatencyResult> {
    let samples = samples_ms.len() as u32;

    Some(LatencyResult {
        min_ms: min(samples_ms)?,
        avg_ms: mean(samples_ms)?,
        max_ms: max(samples_ms)?,
        samples,
        failed,
        success_rate_percent: success_rate(samples, samples + failed),
    })
}

/// Reduce successful round-trip times (ms, in request order) to jitter
/// statistics over their consecutive differences.
///
/// Returns `None` with fewer than two samples.
pub fn jitter(samples_ms: &[f64], failed: u32) -> Option<JitterResult> {
    if samples_ms.len() < 2 {
        return None;
    }

    let differences = consecutive_differences(samples_ms);
    let samples = samples_ms.len() as u32;

    Some(JitterResult {
        avg_jitter_ms: mean(&differences)?,
        min_jitter_ms: min(&differences)?,
        max_jitter_ms: max(&differences)?,
        std_dev_ms: std_dev(&differences),
        samples,
        failed,
        success_rate_percent: success_rate(samples, samples + failed),
    })
}

/// Megabits per second for `bytes` moved in `elapsed`.
///
/// Returns `None` for a zero duration.
pub fn throughput_mbps(bytes: u64, elapsed: Duration) -> Option<f64> {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return None;
    }

    Some(bytes as f64 * 8.0 / seconds / 1_000_000.0)
}

pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
