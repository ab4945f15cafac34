use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::HarvestError;

/// Ordered header list handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHeaders(Vec<(String, String)>);

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any previous value (names compare case-insensitively).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Discovery requests (pages, cursors).
    Discovery,
    /// Profile-level assets.
    Original,
    /// Harvested gallery media.
    Media,
}

/// Supplies per-request headers (cookies, user agent, referer).
pub trait SessionProvider: Send + Sync {
    fn headers(&self, kind: RequestKind) -> RequestHeaders;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub user_agent: Option<String>,
    pub cookie: Option<String>,
    pub referer: Option<String>,
    pub extra_headers: Vec<(String, String)>,
}

/// Session with fixed headers, e.g. cookies exported from a logged-in browser.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    base: RequestHeaders,
}

impl StaticSession {
    /// Fails with [`HarvestError::Session`] when a configured header could not
    /// be sent, e.g. a cookie pasted with a line break.
    pub fn new(settings: &SessionSettings) -> Result<Self, HarvestError> {
        let mut base = RequestHeaders::new();
        if let Some(ua) = settings.user_agent.as_deref().filter(|v| !v.is_empty()) {
            base.insert("User-Agent", ua);
        }
        if let Some(cookie) = settings.cookie.as_deref().filter(|v| !v.is_empty()) {
            base.insert("Cookie", cookie);
        }
        if let Some(referer) = settings.referer.as_deref().filter(|v| !v.is_empty()) {
            base.insert("Referer", referer);
        }
        for (name, value) in &settings.extra_headers {
            base.insert(name.as_str(), value.as_str());
        }
        for (name, value) in base.iter() {
            check_header(name, value)?;
        }
        Ok(Self { base })
    }
}

fn check_header(name: &str, value: &str) -> Result<(), HarvestError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| HarvestError::Session(format!("invalid header name {name:?}")))?;
    HeaderValue::from_str(value)
        .map_err(|_| HarvestError::Session(format!("invalid value for header {name}")))?;
    Ok(())
}

impl SessionProvider for StaticSession {
    fn headers(&self, kind: RequestKind) -> RequestHeaders {
        let headers = self.base.clone();
        match kind {
            RequestKind::Discovery => {
                headers.with("Accept", "application/json, text/html;q=0.9, */*;q=0.8")
            }
            RequestKind::Original => headers,
            RequestKind::Media => headers
                .with("Sec-Fetch-Dest", "image")
                .with("Sec-Fetch-Mode", "no-cors"),
        }
    }
}
