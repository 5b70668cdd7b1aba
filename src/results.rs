//! Result data structures for probe output.
//!
//! Every probe produces one of the value types below, and the aggregator
//! combines them into a [`CombinedResult`]. All structures implement
//! `Serialize` for JSON output; floating point figures are rounded to two
//! decimals on the way out.

use chrono::{DateTime, Local, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::errors::{exit_codes, ErrorKind, ProbeError};
use crate::probes::ProbeKind;

/// Round-trip time statistics from the latency probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyResult {
    /// Fastest successful round trip in milliseconds
    #[serde(serialize_with = "round2")]
    pub min_ms: f64,
    /// Mean of successful round trips in milliseconds
    #[serde(serialize_with = "round2")]
    pub avg_ms: f64,
    /// Slowest successful round trip in milliseconds
    #[serde(serialize_with = "round2")]
    pub max_ms: f64,
    /// Number of successful samples
    pub samples: u32,
    /// Number of failed samples
    pub failed: u32,
    /// `samples / (samples + failed) * 100`
    #[serde(serialize_with = "round2")]
    pub success_rate_percent: f64,
}

impl LatencyResult {
    pub fn attempts(&self) -> u32 {
        self.samples + self.failed
    }
}

/// Statistics over consecutive round-trip differences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JitterResult {
    /// Mean absolute difference between consecutive samples
    #[serde(rename = "avg_ms", serialize_with = "round2")]
    pub avg_jitter_ms: f64,
    /// Smallest consecutive difference
    #[serde(rename = "min_ms", serialize_with = "round2")]
    pub min_jitter_ms: f64,
    /// Largest consecutive difference
    #[serde(rename = "max_ms", serialize_with = "round2")]
    pub max_jitter_ms: f64,
    /// Sample standard deviation of the differences
    #[serde(serialize_with = "round2")]
    pub std_dev_ms: f64,
    /// Number of successful samples (always at least 2)
    pub samples: u32,
    /// Number of failed samples
    pub failed: u32,
    /// `samples / (samples + failed) * 100`
    #[serde(serialize_with = "round2")]
    pub success_rate_percent: f64,
}

impl JitterResult {
    pub fn attempts(&self) -> u32 {
        self.samples + self.failed
    }
}

/// Outcome of a download or upload probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferResult {
    /// Throughput in megabits per second
    #[serde(serialize_with = "round2")]
    pub speed_mbps: f64,
    /// Bytes received (download) or sent (upload)
    #[serde(rename = "bytes")]
    pub bytes_transferred: u64,
    /// Wall-clock duration of the transfer in seconds
    #[serde(serialize_with = "round2")]
    pub time_seconds: f64,
    /// Size that was asked for, in MB
    #[serde(rename = "size_mb")]
    pub requested_size_mb: u32,
}

impl TransferResult {
    /// Bytes transferred expressed in mebibytes.
    pub fn transferred_mb(&self) -> f64 {
        self.bytes_transferred as f64 / (1024.0 * 1024.0)
    }
}

/// A probe that did not produce a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeFailure {
    pub probe: ProbeKind,
    pub kind: ErrorKind,
    pub message: String,
}

impl ProbeFailure {
    pub fn new(probe: ProbeKind, error: &ProbeError) -> Self {
        Self { probe, kind: error.kind, message: error.to_string() }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} probe failed: {}", self.probe, self.message)
    }
}

/// Everything one aggregator run produced.
///
/// A probe's field is `Some` exactly when `errors` holds no entry for
/// that probe. `errors` is in probe execution order.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedResult {
    /// Completion time of the last probe
    #[serde(serialize_with = "local_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "ping", skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<JitterResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<TransferResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<TransferResult>,
    pub errors: Vec<ProbeFailure>,
}

impl CombinedResult {
    /// At least one probe produced a result.
    pub fn is_successful(&self) -> bool {
        self.latency.is_some()
            || self.jitter.is_some()
            || self.download.is_some()
            || self.upload.is_some()
    }

    /// Whether `probe` produced a result.
    pub fn has_result(&self, probe: ProbeKind) -> bool {
        match probe {
            ProbeKind::Latency => self.latency.is_some(),
            ProbeKind::Jitter => self.jitter.is_some(),
            ProbeKind::Download => self.download.is_some(),
            ProbeKind::Upload => self.upload.is_some(),
        }
    }

    pub fn failed_probes(&self) -> Vec<ProbeKind> {
        self.errors.iter().map(|failure| failure.probe).collect()
    }

    /// Human-readable failure lines, in execution order.
    pub fn failure_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// `%Y-%m-%d %H:%M:%S` in local time.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }

    /// Process exit code summarizing the run.
    pub fn exit_code(&self) -> i32 {
        match (self.errors.first(), self.is_successful()) {
            (None, _) => exit_codes::SUCCESS,
            (Some(_), true) => exit_codes::PARTIAL_FAILURE,
            (Some(first), false) => first.kind.exit_code(),
        }
    }
}

fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

fn local_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(
        &timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn latency() -> LatencyResult {
        LatencyResult {
            min_ms: 10.0,
            avg_ms: 20.0,
            max_ms: 30.0,
            samples: 5,
            failed: 0,
            success_rate_percent: 100.0,
        }
    }

    pub fn jitter() -> JitterResult {
        JitterResult {
            avg_jitter_ms: 3.5,
            min_jitter_ms: 2.0,
            max_jitter_ms: 5.0,
            std_dev_ms: 2.1213203435596424,
            samples: 3,
            failed: 1,
            success_rate_percent: 75.0,
        }
    }

    pub fn transfer(requested_size_mb: u32) -> TransferResult {
        TransferResult {
            speed_mbps: 20.97152,
            bytes_transferred: 5 * 1024 * 1024,
            time_seconds: 2.0,
            requested_size_mb,
        }
    }

    pub fn complete() -> CombinedResult {
        CombinedResult {
            timestamp: Utc::now(),
            latency: Some(latency()),
            jitter: Some(jitter()),
            download: Some(transfer(10)),
            upload: Some(transfer(5)),
            errors: vec![],
        }
    }

    pub fn all_failed() -> CombinedResult {
        let errors = ProbeKind::ALL
            .iter()
            .map(|probe| {
                ProbeFailure::new(
                    *probe,
                    &ProbeError::connectivity("connection refused"),
                )
            })
            .collect();

        CombinedResult {
            timestamp: Utc::now(),
            latency: None,
            jitter: None,
            download: None,
            upload: None,
            errors,
        }
    }
}
