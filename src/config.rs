//! Probe configuration.

use crate::errors::ProbeError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_URL: &str = "https://speed.cloudflare.com/__down";
pub const DEFAULT_DOWNLOAD_SIZE_MB: u32 = 10;
pub const DEFAULT_UPLOAD_SIZE_MB: u32 = 5;
pub const DEFAULT_PING_COUNT: u32 = 10;
pub const DEFAULT_JITTER_SAMPLES: u32 = 20;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Pause between consecutive latency/jitter samples.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

// Exclusive upper bounds.
const MAX_TRANSFER_SIZE_MB: u32 = 1000;
const MAX_SAMPLE_COUNT: u32 = 100;
const MAX_TIMEOUT_SECONDS: u64 = 300;

const LARGE_DOWNLOAD_MB: u32 = 100;
const LARGE_UPLOAD_MB: u32 = 50;
const SHORT_TIMEOUT_SECONDS: u64 = 5;

/// Immutable settings shared read-only by every probe in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    url: Url,
    download_size_mb: u32,
    upload_size_mb: u32,
    ping_count: u32,
    jitter_samples: u32,
    timeout_seconds: u64,
    sample_interval: Duration,
}

impl ProbeConfig {
    /// Validate and build a configuration.
    ///
    /// The URL must use `https`, sizes must be in `1..1000` MB, sample
    /// counts in `1..100` and the timeout in `1..300` seconds.
    pub fn new(
        url: &str,
        download_size_mb: u32,
        upload_size_mb: u32,
        ping_count: u32,
        jitter_samples: u32,
        timeout_seconds: u64,
    ) -> Result<Self, ProbeError> {
        let url = Url::parse(url).map_err(|e| {
            ProbeError::config(format!("invalid URL '{}': {}", url, e))
                .with_source(e)
        })?;

        if url.scheme() != "https" {
            return Err(ProbeError::config(format!(
                "URL must use https, got '{}'",
                url.scheme()
            )));
        }

        check_range("download size (MB)", download_size_mb, MAX_TRANSFER_SIZE_MB)?;
        check_range("upload size (MB)", upload_size_mb, MAX_TRANSFER_SIZE_MB)?;
        check_range("ping count", ping_count, MAX_SAMPLE_COUNT)?;
        check_range("jitter samples", jitter_samples, MAX_SAMPLE_COUNT)?;
        check_range("timeout (seconds)", timeout_seconds, MAX_TIMEOUT_SECONDS)?;

        Ok(Self {
            url,
            download_size_mb,
            upload_size_mb,
            ping_count,
            jitter_samples,
            timeout_seconds,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        })
    }

    /// Override the pause between latency/jitter samples.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn download_size_mb(&self) -> u32 {
        self.download_size_mb
    }

    pub fn upload_size_mb(&self) -> u32 {
        self.upload_size_mb
    }

    pub fn ping_count(&self) -> u32 {
        self.ping_count
    }

    pub fn jitter_samples(&self) -> u32 {
        self.jitter_samples
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    pub fn download_size_bytes(&self) -> u64 {
        mb_to_bytes(self.download_size_mb)
    }

    pub fn upload_size_bytes(&self) -> u64 {
        mb_to_bytes(self.upload_size_mb)
    }

    /// Settings that are valid but likely to make probes fail.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.download_size_mb > LARGE_DOWNLOAD_MB {
            warnings.push(format!(
                "Large download size ({} MB) may cause timeouts",
                self.download_size_mb
            ));
        }

        if self.upload_size_mb > LARGE_UPLOAD_MB {
            warnings.push(format!(
                "Large upload size ({} MB) may cause timeouts",
                self.upload_size_mb
            ));
        }

        if self.timeout_seconds < SHORT_TIMEOUT_SECONDS {
            warnings.push(
                "Timeout is very short and may cause probes to fail prematurely"
                    .to_string(),
            );
        }

        warnings
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_URL).expect("default URL is valid"),
            download_size_mb: DEFAULT_DOWNLOAD_SIZE_MB,
            upload_size_mb: DEFAULT_UPLOAD_SIZE_MB,
            ping_count: DEFAULT_PING_COUNT,
            jitter_samples: DEFAULT_JITTER_SAMPLES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

/// Mebibytes, matching how the download and upload sizes are requested.
pub fn mb_to_bytes(mb: u32) -> u64 {
    u64::from(mb) * 1024 * 1024
}

fn check_range<T>(name: &str, value: T, max: T) -> Result<(), ProbeError>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() || value >= max {
        return Err(ProbeError::config(format!(
            "{} must be between 1 and {} (exclusive), got {}",
            name, max, value
        )));
    }

    Ok(())
}
