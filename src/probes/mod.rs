//! The four measurement probes and the aggregator that sequences them.

pub mod download;
pub mod engine;
pub mod jitter;
pub mod latency;
pub mod upload;

pub use download::DownloadProbe;
pub use engine::Aggregator;
pub use jitter::JitterProbe;
pub use latency::LatencyProbe;
pub use upload::UploadProbe;

use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::http::{cache_buster, sample_url, Transport, TransportError};
use crate::measurements::duration_ms;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;
use tokio::time::sleep;

/// Names the four probes, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Latency,
    Jitter,
    Download,
    Upload,
}

impl ProbeKind {
    /// Every probe in the order the aggregator runs them.
    pub const ALL: [ProbeKind; 4] = [
        ProbeKind::Latency,
        ProbeKind::Jitter,
        ProbeKind::Download,
        ProbeKind::Upload,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::Latency => "Latency",
            ProbeKind::Jitter => "Jitter",
            ProbeKind::Download => "Download",
            ProbeKind::Upload => "Upload",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single self-contained network measurement.
#[allow(async_fn_in_trait)]
pub trait Probe {
    type Output;

    const KIND: ProbeKind;

    async fn run(&self, config: &ProbeConfig) -> Result<Self::Output, ProbeError>;
}

/// Successful round-trip times (ms, in request order) plus the number of
/// attempts that did not succeed.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Samples {
    pub round_trips_ms: Vec<f64>,
    pub failed: u32,
}

/// Issue `count` cache-busted GETs, pausing between them.
///
/// Any attempt that is not an HTTP 200 (timeout, other status, transport
/// error) counts as failed and the loop carries on.
pub(crate) async fn sample_round_trips<T: Transport>(
    transport: &T,
    config: &ProbeConfig,
    count: u32,
    kind: ProbeKind,
) -> Samples {
    let mut samples = Samples {
        round_trips_ms: Vec::with_capacity(count as usize),
        failed: 0,
    };

    for i in 0..count {
        let url = sample_url(config.url(), cache_buster());

        match transport.get(&url, config.timeout()).await {
            Ok(exchange) if exchange.status == StatusCode::OK => {
                let ms = duration_ms(exchange.elapsed);
                debug!("{} sample {}/{}: {:.2} ms", kind, i + 1, count, ms);
                samples.round_trips_ms.push(ms);
            }
            Ok(exchange) => {
                warn!(
                    "{} sample {}/{} failed with status code: {}",
                    kind,
                    i + 1,
                    count,
                    exchange.status
                );
                samples.failed += 1;
            }
            Err(TransportError::Timeout) => {
                warn!("{} sample {}/{} timed out", kind, i + 1, count);
                samples.failed += 1;
            }
            Err(e) => {
                warn!("{} sample {}/{} failed: {}", kind, i + 1, count, e);
                samples.failed += 1;
            }
        }

        if i + 1 < count && !config.sample_interval().is_zero() {
            sleep(config.sample_interval()).await;
        }
    }

    samples
}

/// Map a failed download/upload request onto the probe error taxonomy.
pub(crate) fn transfer_error(
    kind: ProbeKind,
    config: &ProbeConfig,
    error: TransportError,
) -> ProbeError {
    match error {
        TransportError::Timeout => ProbeError::timeout(format!(
            "{} timed out after {}s",
            kind,
            config.timeout().as_secs()
        )),
        TransportError::Failed(ref message) => {
            ProbeError::connectivity(format!("{} request failed: {}", kind, message))
                .with_source(error.clone())
        }
    }
}
