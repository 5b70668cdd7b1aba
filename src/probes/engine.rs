use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::http::Transport;
use crate::probes::{
    DownloadProbe, JitterProbe, LatencyProbe, Probe, ProbeKind, UploadProbe,
};
use crate::results::{CombinedResult, ProbeFailure};
use chrono::Utc;
use log::{error, info};
use std::future::Future;

/// Runs every probe once and combines the outcomes.
///
/// Probes run strictly one after another (latency, jitter, download,
/// upload) so no probe's traffic overlaps another's measurement. A failing
/// probe is recorded and the sequence continues.
///
/// # Example
/// ```no_run
/// use speed_probe::config::ProbeConfig;
/// use speed_probe::http::HttpTransport;
/// use speed_probe::probes::Aggregator;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let transport = HttpTransport::new().unwrap();
///     let result = Aggregator::new(&transport)
///         .run_all(&ProbeConfig::default())
///         .await;
///     for failure in &result.errors {
///         eprintln!("{}", failure);
///     }
/// }
/// ```
pub struct Aggregator<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> Aggregator<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Run all four probes in order. Never fails; probe failures end up
    /// in [`CombinedResult::errors`].
    pub async fn run_all(&self, config: &ProbeConfig) -> CombinedResult {
        info!("Starting probe sequence against {}", config.url());

        let mut errors = Vec::new();

        let latency =
            run_probe(LatencyProbe::new(self.transport), config, &mut errors)
                .await;
        let jitter =
            run_probe(JitterProbe::new(self.transport), config, &mut errors)
                .await;
        let download =
            run_probe(DownloadProbe::new(self.transport), config, &mut errors)
                .await;
        let upload =
            run_probe(UploadProbe::new(self.transport), config, &mut errors)
                .await;

        info!(
            "Probe sequence finished: {} of {} probes succeeded",
            ProbeKind::ALL.len() - errors.len(),
            ProbeKind::ALL.len()
        );

        CombinedResult {
            timestamp: Utc::now(),
            latency,
            jitter,
            download,
            upload,
            errors,
        }
    }

    /// Like [`run_all`](Self::run_all), but gives up as soon as `interrupt`
    /// completes. Returns `None` when interrupted.
    pub async fn run_until<F: Future>(
        &self,
        config: &ProbeConfig,
        interrupt: F,
    ) -> Option<CombinedResult> {
        tokio::select! {
            biased;
            _ = interrupt => {
                info!("Probe sequence interrupted");
                None
            }
            result = self.run_all(config) => Some(result),
        }
    }
}

async fn run_probe<P: Probe>(
    probe: P,
    config: &ProbeConfig,
    errors: &mut Vec<ProbeFailure>,
) -> Option<P::Output> {
    record(P::KIND, probe.run(config).await, errors)
}

fn record<O>(
    kind: ProbeKind,
    outcome: Result<O, ProbeError>,
    errors: &mut Vec<ProbeFailure>,
) -> Option<O> {
    match outcome {
        Ok(output) => Some(output),
        Err(e) => {
            error!("{} probe failed: {}", kind, e);
            errors.push(ProbeFailure::new(kind, &e));
            None
        }
    }
}
