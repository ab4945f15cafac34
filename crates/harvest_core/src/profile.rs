use serde::{Deserialize, Serialize};

use crate::RawAuthor;

/// Author identity for one harvest run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub nickname: String,
    pub username: String,
    pub picture: String,
    pub header: String,
    pub url: String,
}

impl Profile {
    pub fn new(
        id: impl Into<String>,
        nickname: impl Into<String>,
        username: impl Into<String>,
        picture: impl Into<String>,
        header: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
            username: normalize_username(&username.into()),
            picture: picture.into(),
            header: header.into(),
            url: url.into(),
        }
    }

    /// Profile known only by its handle, as supplied by the caller of a run.
    pub fn for_username(username: &str, url: impl Into<String>) -> Self {
        let username = normalize_username(username);
        Self {
            nickname: username.clone(),
            username,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.username.is_empty() && !self.picture.is_empty()
    }

    /// Fill fields that are still empty from an adapter-reported author.
    ///
    /// Populated fields are authoritative and are never overwritten. Returns
    /// `true` when at least one field changed.
    pub fn enrich(&mut self, author: &RawAuthor) -> bool {
        let mut changed = false;
        changed |= fill(&mut self.id, author.id.as_deref());
        changed |= fill(
            &mut self.username,
            author.username.as_deref().map(normalize_username).as_deref(),
        );
        changed |= fill(&mut self.nickname, author.nickname.as_deref());
        changed |= fill(&mut self.picture, author.picture.as_deref());
        changed |= fill(&mut self.header, author.header.as_deref());
        changed
    }
}

/// Strip a single leading `@` from a handle.
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()
}

fn fill(slot: &mut String, value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(value) if slot.is_empty() && !value.is_empty() => {
            *slot = value.to_string();
            true
        }
        _ => false,
    }
}
