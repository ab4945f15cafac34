/// One candidate media reference reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawItem {
    pub id: String,
    pub url: String,
    /// Extension without the dot, e.g. `mp4`.
    pub extension_hint: Option<String>,
    /// Sub-bucket below the profile folder ("posts", "stories", a post folder, ...).
    pub collection: Option<String>,
    /// Explicit target name; overrides the id-derived filename.
    pub filename: Option<String>,
}

impl RawItem {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extension_hint = Some(ext.into());
        self
    }

    pub fn in_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn named(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Key used by the ledger: the id, or the URL for items without one.
    pub fn dedup_key(&self) -> &str {
        if self.id.trim().is_empty() {
            &self.url
        } else {
            &self.id
        }
    }
}

/// Author fields an adapter may expose; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAuthor {
    pub id: Option<String>,
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub picture: Option<String>,
    pub header: Option<String>,
}

impl RawAuthor {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.username.is_none()
            && self.nickname.is_none()
            && self.picture.is_none()
            && self.header.is_none()
    }
}

/// Result of running one adapter over one response payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub items: Vec<RawItem>,
    pub author: Option<RawAuthor>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.author.as_ref().is_none_or(RawAuthor::is_empty)
    }
}
