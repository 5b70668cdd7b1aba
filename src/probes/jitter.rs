use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::http::Transport;
use crate::measurements;
use crate::probes::{sample_round_trips, Probe, ProbeKind};
use crate::results::JitterResult;
use log::info;

/// Latency variation over `jitter_samples` small GETs.
///
/// Needs at least two successful samples to form one consecutive
/// difference.
pub struct JitterProbe<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> JitterProbe<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Probe for JitterProbe<'_, T> {
    type Output = JitterResult;

    const KIND: ProbeKind = ProbeKind::Jitter;

    async fn run(&self, config: &ProbeConfig) -> Result<JitterResult, ProbeError> {
        let count = config.jitter_samples();
        info!("Starting jitter probe ({} samples)...", count);

        let samples =
            sample_round_trips(self.transport, config, count, Self::KIND).await;

        let result = measurements::jitter(&samples.round_trips_ms, samples.failed)
            .ok_or_else(|| {
                ProbeError::connectivity(format!(
                    "not enough successful jitter samples ({} of {}, need 2)",
                    samples.round_trips_ms.len(),
                    count
                ))
            })?;

        info!(
            "Jitter probe completed: {:.2}ms avg jitter",
            result.avg_jitter_ms
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::http::testing::{ok, refused, status, timed_out, ScriptedTransport};
    use crate::probes::test_support::config;

    #[tokio::test]
    async fn test_three_samples() {
        let transport = ScriptedTransport::new([ok(10), ok(15), ok(13)]);

        let result =
            JitterProbe::new(&transport).run(&config(1, 3)).await.unwrap();

        assert_eq!(result.avg_jitter_ms, 3.5);
        assert_eq!(result.min_jitter_ms, 2.0);
        assert_eq!(result.max_jitter_ms, 5.0);
        assert!((result.std_dev_ms - 4.5_f64.sqrt()).abs() < 1e-9);
        assert_eq!(result.samples, 3);
        assert_eq!(result.failed, 0);
        assert_eq!(result.success_rate_percent, 100.0);
    }

    #[tokio::test]
    async fn test_failures_are_skipped_when_pairing() {
        // Differences come from successful samples only: [10, 30] -> 20.
        let transport =
            ScriptedTransport::new([ok(10), timed_out(), ok(30), status(500)]);

        let result =
            JitterProbe::new(&transport).run(&config(1, 4)).await.unwrap();

        assert_eq!(result.avg_jitter_ms, 20.0);
        assert_eq!(result.std_dev_ms, 0.0);
        assert_eq!(result.samples, 2);
        assert_eq!(result.failed, 2);
        assert_eq!(result.success_rate_percent, 50.0);
    }

    #[tokio::test]
    async fn test_single_success_is_connectivity_error() {
        let transport =
            ScriptedTransport::new([refused(), ok(12), timed_out()]);

        let error =
            JitterProbe::new(&transport).run(&config(1, 3)).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::Connectivity);
        assert!(error.message.contains("1 of 3"));
    }

    #[tokio::test]
    async fn test_no_success_is_connectivity_error() {
        let transport = ScriptedTransport::new([refused(), refused()]);

        let error =
            JitterProbe::new(&transport).run(&config(1, 2)).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::Connectivity);
    }
}
