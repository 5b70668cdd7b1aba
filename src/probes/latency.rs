use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::http::Transport;
use crate::measurements;
use crate::probes::{sample_round_trips, Probe, ProbeKind};
use crate::results::LatencyResult;
use log::info;

/// Round-trip time over `ping_count` small GETs.
///
/// Fails only when every attempt fails.
pub struct LatencyProbe<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> LatencyProbe<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Probe for LatencyProbe<'_, T> {
    type Output = LatencyResult;

    const KIND: ProbeKind = ProbeKind::Latency;

    async fn run(&self, config: &ProbeConfig) -> Result<LatencyResult, ProbeError> {
        let count = config.ping_count();
        info!("Starting latency probe ({} samples)...", count);

        let samples =
            sample_round_trips(self.transport, config, count, Self::KIND).await;

        let result = measurements::latency(&samples.round_trips_ms, samples.failed)
            .ok_or_else(|| {
                ProbeError::connectivity(format!(
                    "all {} latency samples failed",
                    count
                ))
            })?;

        info!(
            "Latency probe completed: min={:.2}ms, avg={:.2}ms, max={:.2}ms",
            result.min_ms, result.avg_ms, result.max_ms
        );

        Ok(result)
    }
}
