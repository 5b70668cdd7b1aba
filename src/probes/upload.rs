use crate::config::ProbeConfig;
use crate::errors::ProbeError;
use crate::http::{RandomPayload, Transport};
use crate::measurements::throughput_mbps;
use crate::probes::{transfer_error, Probe, ProbeKind};
use crate::results::TransferResult;
use log::info;
use reqwest::StatusCode;

const ACCEPTED: [StatusCode; 4] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
];

/// Upload throughput from one streamed POST of `upload_size_mb` random
/// bytes.
///
/// Throughput is computed from the requested size; the server's
/// acknowledgement of how much it received is not consulted.
pub struct UploadProbe<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> UploadProbe<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> Probe for UploadProbe<'_, T> {
    type Output = TransferResult;

    const KIND: ProbeKind = ProbeKind::Upload;

    async fn run(&self, config: &ProbeConfig) -> Result<TransferResult, ProbeError> {
        let requested = config.upload_size_bytes();
        info!("Starting upload probe ({} MB)...", config.upload_size_mb());

        let exchange = self
            .transport
            .post(config.url(), RandomPayload::new(requested), config.timeout())
            .await
            .map_err(|e| transfer_error(Self::KIND, config, e))?;

        if !ACCEPTED.contains(&exchange.status) {
            return Err(ProbeError::invalid_response(format!(
                "upload failed with status code: {}",
                exchange.status
            )));
        }

        let speed_mbps =
            throughput_mbps(requested, exchange.elapsed).ok_or_else(|| {
                ProbeError::invalid_response(
                    "upload completed too quickly to measure",
                )
            })?;

        info!("Upload probe completed: {:.2} Mbps", speed_mbps);

        Ok(TransferResult {
            speed_mbps,
            bytes_transferred: requested,
            time_seconds: exchange.elapsed.as_secs_f64(),
            requested_size_mb: config.upload_size_mb(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::http::payload::MAX_CHUNK_SIZE;
    use crate::http::testing::{
        exchange, refused, status, timed_out, Recorded, ScriptedTransport,
    };
    use crate::probes::test_support::config;
    use std::time::Duration;

    const MIB: u64 = 1024 * 1024;

    #[tokio::test]
    async fn test_accepts_any_listed_2xx() {
        for code in [200, 201, 202, 204] {
            let status = StatusCode::from_u16(code).unwrap();
            let transport = ScriptedTransport::new([exchange(
                status,
                0,
                Duration::from_secs(4),
            )]);

            let result = UploadProbe::new(&transport)
                .run(&config(1, 2))
                .await
                .unwrap();

            assert_eq!(result.bytes_transferred, 5 * MIB);
            assert_eq!(result.requested_size_mb, 5);
            let expected = (5 * MIB * 8) as f64 / 4.0 / 1e6;
            assert!(((result.speed_mbps - expected) / expected).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_streams_requested_size_in_bounded_chunks() {
        let transport = ScriptedTransport::new([exchange(
            StatusCode::OK,
            0,
            Duration::from_secs(1),
        )]);

        UploadProbe::new(&transport).run(&config(1, 2)).await.unwrap();

        let requests = transport.requests();
        let Recorded::Post { url, timeout, bytes, max_chunk } = &requests[0]
        else {
            panic!("expected POST, got {:?}", requests[0]);
        };
        assert_eq!(url.as_str(), "https://speed.cloudflare.com/__down");
        assert_eq!(*timeout, Duration::from_secs(30));
        assert_eq!(*bytes, 5 * MIB);
        assert_eq!(*max_chunk, MAX_CHUNK_SIZE);
    }

    #[tokio::test]
    async fn test_other_status_is_invalid_response() {
        for code in [206, 301, 413, 500] {
            let transport = ScriptedTransport::new([status(code)]);

            let error = UploadProbe::new(&transport)
                .run(&config(1, 2))
                .await
                .unwrap_err();

            assert_eq!(error.kind, ErrorKind::InvalidResponse);
        }
    }

    #[tokio::test]
    async fn test_zero_duration_is_invalid_response() {
        let transport = ScriptedTransport::new([exchange(
            StatusCode::OK,
            0,
            Duration::ZERO,
        )]);

        let error =
            UploadProbe::new(&transport).run(&config(1, 2)).await.unwrap_err();

        assert_eq!(error.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_timeout_and_transport_errors() {
        let transport = ScriptedTransport::new([timed_out(), refused()]);
        let probe = UploadProbe::new(&transport);

        let error = probe.run(&config(1, 2)).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Timeout);

        let error = probe.run(&config(1, 2)).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Connectivity);
    }
}
