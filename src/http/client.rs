use crate::errors::ProbeError;
use crate::http::{Exchange, RandomPayload, TransportError, UA};
use futures::StreamExt;
use log::debug;
use reqwest::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client as ReqwestClient, Response};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Performs single timed requests for the probes.
///
/// Implementations report wall-clock time from sending the request to
/// receiving the last body byte, and never buffer a whole body.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// GET `url`, streaming and counting the body.
    ///
    /// A non-2xx response is returned as an [`Exchange`] without reading
    /// its body.
    async fn get(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<Exchange, TransportError>;

    /// POST `payload` to `url` as a streamed octet-stream body.
    async fn post(
        &self,
        url: &Url,
        payload: RandomPayload,
        timeout: Duration,
    ) -> Result<Exchange, TransportError>;
}

/// [`Transport`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ProbeError> {
        let client = ReqwestClient::builder().user_agent(UA).build().map_err(
            |e| {
                ProbeError::connectivity("could not initialise HTTP client")
                    .with_source(e)
            },
        )?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<Exchange, TransportError> {
        debug!("GET {}", url);
        let start = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Exchange { status, bytes: 0, elapsed: start.elapsed() });
        }

        let bytes = drain(response).await?;

        Ok(Exchange { status, bytes, elapsed: start.elapsed() })
    }

    async fn post(
        &self,
        url: &Url,
        payload: RandomPayload,
        timeout: Duration,
    ) -> Result<Exchange, TransportError> {
        let bytes = payload.len();
        debug!("POST {} ({} bytes)", url, bytes);

        let body = Body::wrap_stream(futures::stream::iter(
            payload.map(Ok::<_, std::io::Error>),
        ));

        let start = Instant::now();

        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CACHE_CONTROL, "no-cache")
            .header(CONTENT_LENGTH, bytes)
            .timeout(timeout)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        drain(response).await?;

        Ok(Exchange { status, bytes, elapsed: start.elapsed() })
    }
}

/// Read a response body to the end, counting but discarding it.
async fn drain(response: Response) -> Result<u64, TransportError> {
    let mut received = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        received += chunk?.len() as u64;
    }

    Ok(received)
}
