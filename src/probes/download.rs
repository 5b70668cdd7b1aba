use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::http::{cache_buster, download_url, Transport};
use crate::measurements::throughput_mbps;
use crate::probes::{transfer_error, Probe, ProbeKind};
use crate::results::TransferResult;
use log::{info, warn};
use reqwest::StatusCode;

/// Download throughput from one streamed GET of `download_size_mb`.
pub struct DownloadProbe<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> DownloadProbe<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Probe for DownloadProbe<'_, T> {
    type Output = TransferResult;

    const KIND: ProbeKind = ProbeKind::Download;

    async fn run(&self, config: &ProbeConfig) -> Result<TransferResult, ProbeError> {
        let requested = config.download_size_bytes();
        let url = download_url(config.url(), requested, cache_buster());

        info!(
            "Starting download probe ({} MB)...",
            config.download_size_mb()
        );

        let exchange = self
            .transport
            .get(&url, config.timeout())
            .await
            .map_err(|e| transfer_error(Self::KIND, config, e))?;

        if exchange.status != StatusCode::OK {
            return Err(ProbeError::invalid_response(format!(
                "download failed with status code: {}",
                exchange.status
            )));
        }

        let speed_mbps = throughput_mbps(exchange.bytes, exchange.elapsed)
            .ok_or_else(|| {
                ProbeError::invalid_response(
                    "download completed too quickly to measure",
                )
            })?;

        if exchange.bytes != requested {
            warn!(
                "Server sent {} bytes, {} were requested",
                exchange.bytes, requested
            );
        }

        info!("Download probe completed: {:.2} Mbps", speed_mbps);

        Ok(TransferResult {
            speed_mbps,
            bytes_transferred: exchange.bytes,
            time_seconds: exchange.elapsed.as_secs_f64(),
            requested_size_mb: config.download_size_mb(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::http::testing::{
        exchange, refused, status, timed_out, Recorded, ScriptedTransport,
    };
    use crate::probes::test_support::config;
    use std::time::Duration;

    const MIB: u64 = 1024 * 1024;

    #[tokio::test]
    async fn test_short_body_reports_actual_bytes() {
        let transport = ScriptedTransport::new([exchange(
            StatusCode::OK,
            5 * MIB,
            Duration::from_secs(2),
        )]);

        let result =
            DownloadProbe::new(&transport).run(&config(1, 2)).await.unwrap();

        assert_eq!(result.bytes_transferred, 5 * MIB);
        assert_eq!(result.requested_size_mb, 10);
        assert_eq!(result.time_seconds, 2.0);
        let expected = (5 * MIB * 8) as f64 / 2.0 / 1e6;
        assert!(((result.speed_mbps - expected) / expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_requests_size_in_mebibytes() {
        let transport = ScriptedTransport::new([exchange(
            StatusCode::OK,
            10 * MIB,
            Duration::from_millis(800),
        )]);

        DownloadProbe::new(&transport).run(&config(1, 2)).await.unwrap();

        let requests = transport.requests();
        let Recorded::Get { url, timeout } = &requests[0] else {
            panic!("expected GET, got {:?}", requests[0]);
        };
        let bytes = url
            .query_pairs()
            .find(|(key, _)| key == "bytes")
            .map(|(_, value)| value.into_owned());
        assert_eq!(bytes.as_deref(), Some("10485760"));
        assert!(url.query_pairs().any(|(key, _)| key == "_"));
        assert_eq!(*timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_non_200_is_invalid_response() {
        for code in [201, 404, 503] {
            let transport = ScriptedTransport::new([status(code)]);

            let error = DownloadProbe::new(&transport)
                .run(&config(1, 2))
                .await
                .unwrap_err();

            assert_eq!(error.kind, ErrorKind::InvalidResponse);
            assert!(error.message.contains(&code.to_string()));
        }
    }

    #[tokio::test]
    async fn test_zero_duration_is_invalid_response() {
        let transport = ScriptedTransport::new([exchange(
            StatusCode::OK,
            10 * MIB,
            Duration::ZERO,
        )]);

        let error =
            DownloadProbe::new(&transport).run(&config(1, 2)).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::InvalidResponse);
        assert!(error.message.contains("too quickly"));
    }

    #[tokio::test]
    async fn test_timeout_is_fatal() {
        let transport = ScriptedTransport::new([timed_out()]);

        let error =
            DownloadProbe::new(&transport).run(&config(1, 2)).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_transport_error_is_connectivity() {
        let transport = ScriptedTransport::new([refused()]);

        let error =
            DownloadProbe::new(&transport).run(&config(1, 2)).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::Connectivity);
        assert!(error.message.contains("connection refused"));
    }
}
