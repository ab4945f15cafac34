use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;

use crate::{FailureKind, FetchError, RequestHeaders, TransportSettings};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

/// An opened response whose body has not been read yet.
pub struct MediaStream {
    pub final_url: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("final_url", &self.final_url)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and return the streaming body of a successful response.
    async fn open(&self, url: &str, headers: &RequestHeaders) -> Result<MediaStream, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn open(&self, url: &str, headers: &RequestHeaders) -> Result<MediaStream, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let mut request = self.client.get(parsed);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let final_url = response.url().to_string();
        let content_length = response.content_length();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error));

        Ok(MediaStream {
            final_url,
            content_type,
            content_length,
            body: Box::pin(body),
        })
    }
}

/// Buffer a whole response body, failing once it grows past `max_bytes`.
pub async fn read_to_end(stream: MediaStream, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    if let Some(content_len) = stream.content_length {
        if content_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                },
                "response too large",
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut body = stream.body;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                },
                "response too large",
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
