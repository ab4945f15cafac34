use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

use crate::{MediaKind, Profile, RawItem};

const MAX_SEGMENT_LEN: usize = 80;
const MAX_EXTENSION_LEN: usize = 5;

/// Concrete location for one harvested item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub folder: PathBuf,
    pub filename: String,
}

impl Destination {
    pub fn path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedKind {
    Picture,
    Header,
}

impl SeedKind {
    pub fn filename(self) -> &'static str {
        match self {
            SeedKind::Picture => "profile_picture.jpg",
            SeedKind::Header => "profile_header.jpg",
        }
    }
}

/// Maps items to `{root}/{platform}/{profile}/[collection]/{images|videos}/{file}`.
///
/// Resolution is pure: the same profile and item always land on the same path,
/// which is what lets a rerun skip files that already exist.
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    root: PathBuf,
    platform: String,
}

impl DestinationResolver {
    pub fn new(root: impl Into<PathBuf>, platform: &str) -> Self {
        Self {
            root: root.into(),
            platform: sanitize_segment(platform, "media"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding everything harvested for `profile`.
    pub fn profile_folder(&self, profile: &Profile) -> PathBuf {
        let owner = [profile.username.as_str(), profile.id.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("unknown");
        self.root
            .join(&self.platform)
            .join(sanitize_segment(owner, "unknown"))
    }

    pub fn resolve(&self, profile: &Profile, item: &RawItem, kind: MediaKind) -> Destination {
        let mut folder = self.profile_folder(profile);
        if let Some(collection) = item.collection.as_deref().filter(|c| !c.trim().is_empty()) {
            folder.push(sanitize_segment(collection, "misc"));
        }
        folder.push(kind.folder_name());

        let filename = match item.filename.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(explicit) => distinct_filename(explicit),
            None => {
                let ext = extension_for(item, kind);
                let stem = if item.id.trim().is_empty() {
                    format!("item-{}", short_hash(&item.url))
                } else {
                    distinct_segment(&item.id)
                };
                format!("{stem}.{ext}")
            }
        };

        Destination { folder, filename }
    }

    /// Location of a profile-level asset (picture or header).
    pub fn seed(&self, profile: &Profile, kind: SeedKind) -> Destination {
        Destination {
            folder: self.profile_folder(profile),
            filename: kind.filename().to_string(),
        }
    }
}

/// Extension for an item: adapter hint, then the URL path, then the kind default.
pub fn extension_for(item: &RawItem, kind: MediaKind) -> String {
    item.extension_hint
        .as_deref()
        .and_then(clean_extension)
        .or_else(|| extension_from_url(&item.url))
        .unwrap_or_else(|| kind.default_extension().to_string())
}

/// Kind for an item, judged from its hint or URL.
pub fn kind_for(item: &RawItem) -> MediaKind {
    item.extension_hint
        .as_deref()
        .and_then(clean_extension)
        .or_else(|| extension_from_url(&item.url))
        .map(|ext| MediaKind::from_extension(&ext))
        .unwrap_or(MediaKind::Image)
}

pub fn extension_from_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    clean_extension(ext)
}

fn clean_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Sanitized id, suffixed with `--{short_hash(id)}` whenever sanitizing altered it.
///
/// Ids that differ only in forbidden characters or past the length limit
/// would otherwise share a file.
fn distinct_segment(id: &str) -> String {
    let cleaned = sanitize_segment(id, "untitled");
    if cleaned == id {
        cleaned
    } else {
        format!("{cleaned}--{}", short_hash(id))
    }
}

/// Like [`distinct_segment`] but keeps the extension of an explicit name last.
fn distinct_filename(name: &str) -> String {
    let cleaned = sanitize_segment(name, "untitled");
    if cleaned == name {
        return cleaned;
    }
    let hash = short_hash(name);
    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && clean_extension(ext).is_some() => {
            format!("{stem}--{hash}.{ext}")
        }
        _ => format!("{cleaned}--{hash}"),
    }
}

/// Windows-safe single path segment.
pub fn sanitize_segment(input: &str, fallback: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return fallback.to_string();
    }

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    if compacted.len() > MAX_SEGMENT_LEN {
        let mut end = MAX_SEGMENT_LEN;
        while !compacted.is_char_boundary(end) {
            end -= 1;
        }
        compacted.truncate(end);
    }
    let stem = compacted.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        compacted.insert(stem.len(), '_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// First four bytes of the SHA-256 digest, hex encoded.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
