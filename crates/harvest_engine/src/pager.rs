use std::sync::Arc;

use harvest_core::DiscoveryProgress;
use harvest_logging::{harvest_debug, harvest_warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{
    read_to_end, DiscoveryTrigger, FailureKind, FetchError, HarvestError, Payload, PayloadSender,
    Platform, RequestHeaders, Transport,
};

/// How successive pages of a source are addressed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pagination {
    /// One document, no further pages.
    #[default]
    Single,
    /// `?{param}=start, start+1, ...`
    Page { param: String, start: u64 },
    /// `?{param}=start, start+step, ...`
    Offset { param: String, start: u64, step: u64 },
    /// The next request carries the value found at `pointer` (a JSON pointer) in
    /// the previous response. A missing value or `end_marker` ends the source.
    Cursor {
        param: String,
        pointer: String,
        end_marker: Option<String>,
    },
}

/// A paginated HTTP source for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub platform: Platform,
    /// Request URL; `{username}` is replaced with the target handle.
    pub url: String,
    #[serde(default)]
    pub pagination: Pagination,
}

impl SourceSettings {
    pub fn url_for(&self, username: &str) -> String {
        self.url.replace("{username}", username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    Number(u64),
    Cursor(String),
    First,
}

/// Discovery trigger that fetches pages over the transport and pushes every
/// body into the payload channel.
pub struct HttpPager {
    transport: Arc<dyn Transport>,
    base_url: String,
    pagination: Pagination,
    headers: RequestHeaders,
    sender: PayloadSender,
    max_payload_bytes: u64,
    next: Position,
    last_digest: Option<Vec<u8>>,
    exhausted: bool,
}

impl HttpPager {
    pub fn new(
        transport: Arc<dyn Transport>,
        source: &SourceSettings,
        username: &str,
        headers: RequestHeaders,
        sender: PayloadSender,
        max_payload_bytes: u64,
    ) -> Self {
        let next = match &source.pagination {
            Pagination::Single | Pagination::Cursor { .. } => Position::First,
            Pagination::Page { start, .. } | Pagination::Offset { start, .. } => {
                Position::Number(*start)
            }
        };
        Self {
            transport,
            base_url: source.url_for(username),
            pagination: source.pagination.clone(),
            headers,
            sender,
            max_payload_bytes,
            next,
            last_digest: None,
            exhausted: false,
        }
    }

    fn request_url(&self) -> Result<String, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let param = match &self.pagination {
            Pagination::Single => None,
            Pagination::Page { param, .. }
            | Pagination::Offset { param, .. }
            | Pagination::Cursor { param, .. } => Some(param.as_str()),
        };
        let value = match &self.next {
            Position::First => None,
            Position::Number(n) => Some(n.to_string()),
            Position::Cursor(cursor) => Some(cursor.clone()),
        };
        if let (Some(param), Some(value)) = (param, value) {
            url.query_pairs_mut().append_pair(param, &value);
        }
        Ok(url.into())
    }

    async fn fetch(&self) -> Result<Payload, FetchError> {
        let url = self.request_url()?;
        harvest_debug!("Fetching page {}", url);
        let stream = self.transport.open(&url, &self.headers).await?;
        let source = stream.final_url.clone();
        let content_type = stream.content_type.clone();
        let body = read_to_end(stream, self.max_payload_bytes).await?;
        Ok(Payload::new(source, content_type, body))
    }

    /// Record a fetched page and work out where the next one is.
    fn accept(&mut self, payload: Payload) -> Result<DiscoveryProgress, HarvestError> {
        let digest = Sha256::digest(&payload.body).to_vec();
        let body_changed = self.last_digest.as_ref() != Some(&digest);
        self.last_digest = Some(digest);

        let progress = match &self.pagination {
            Pagination::Single => {
                self.exhausted = true;
                DiscoveryProgress::Exhausted
            }
            Pagination::Page { .. } => {
                self.step(1);
                changed(body_changed)
            }
            Pagination::Offset { step, .. } => {
                let step = *step;
                self.step(step);
                changed(body_changed)
            }
            Pagination::Cursor {
                pointer,
                end_marker,
                ..
            } => match next_cursor(&payload, pointer, end_marker.as_deref()) {
                Some(cursor) if Position::Cursor(cursor.clone()) == self.next => {
                    DiscoveryProgress::Unchanged
                }
                Some(cursor) => {
                    self.next = Position::Cursor(cursor);
                    DiscoveryProgress::Advanced
                }
                None => {
                    self.exhausted = true;
                    DiscoveryProgress::Exhausted
                }
            },
        };

        self.sender
            .send(payload)
            .map_err(|_| HarvestError::Discovery("response channel closed".to_string()))?;
        Ok(progress)
    }

    fn step(&mut self, by: u64) {
        if let Position::Number(n) = self.next {
            self.next = Position::Number(n.saturating_add(by.max(1)));
        }
    }
}

fn changed(body_changed: bool) -> DiscoveryProgress {
    if body_changed {
        DiscoveryProgress::Advanced
    } else {
        DiscoveryProgress::Unchanged
    }
}

fn next_cursor(payload: &Payload, pointer: &str, end_marker: Option<&str>) -> Option<String> {
    let doc = payload.json().ok()?;
    let cursor = match doc.pointer(pointer)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if cursor.is_empty() || end_marker == Some(cursor.as_str()) {
        return None;
    }
    Some(cursor)
}

fn is_gone(err: &FetchError) -> bool {
    matches!(err.kind, FailureKind::HttpStatus(404 | 410))
}

#[async_trait::async_trait]
impl DiscoveryTrigger for HttpPager {
    async fn load(&mut self) -> Result<(), HarvestError> {
        let payload = self.fetch().await.map_err(HarvestError::InitialLoad)?;
        let progress = self.accept(payload)?;
        harvest_debug!("Initial page loaded ({:?})", progress);
        Ok(())
    }

    async fn advance(&mut self) -> Result<DiscoveryProgress, HarvestError> {
        if self.exhausted {
            return Ok(DiscoveryProgress::Exhausted);
        }
        match self.fetch().await {
            Ok(payload) => self.accept(payload),
            Err(err) if is_gone(&err) => {
                harvest_debug!("Source ended: {}", err);
                self.exhausted = true;
                Ok(DiscoveryProgress::Exhausted)
            }
            Err(err) => {
                harvest_warn!("Page fetch failed, will retry: {}", err);
                Ok(DiscoveryProgress::Unchanged)
            }
        }
    }
}
