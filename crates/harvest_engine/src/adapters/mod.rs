//! Platform adapters: turn one response payload into candidate items and author fields.
mod pinterest;
mod threads;
mod tiktok;
mod walk;
mod x;

use std::fmt;
use std::str::FromStr;

use harvest_core::Extraction;
use serde::{Deserialize, Serialize};

use crate::{AdapterError, Payload};

pub use pinterest::PinterestAdapter;
pub use threads::ThreadsAdapter;
pub use tiktok::TikTokAdapter;
pub use x::XAdapter;

/// Extracts media references from a payload. Errors are per payload and never fatal.
pub trait Adapter: Send + Sync {
    fn extract(&self, payload: &Payload) -> Result<Extraction, AdapterError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X,
    Threads,
    Instagram,
    TikTok,
    Pinterest,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::X,
        Platform::Threads,
        Platform::Instagram,
        Platform::TikTok,
        Platform::Pinterest,
    ];

    pub fn adapter(self) -> Box<dyn Adapter> {
        match self {
            Platform::X => Box::new(XAdapter),
            // Same page and API payload shapes as Threads.
            Platform::Threads | Platform::Instagram => Box::new(ThreadsAdapter),
            Platform::TikTok => Box::new(TikTokAdapter),
            Platform::Pinterest => Box::new(PinterestAdapter),
        }
    }

    /// Folder below the storage root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Platform::X => "x",
            Platform::Threads => "threads",
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
            Platform::Pinterest => "pinterest",
        }
    }

    pub fn profile_url(self, username: &str) -> String {
        match self {
            Platform::X => format!("https://x.com/{username}"),
            Platform::Threads => format!("https://www.threads.net/@{username}"),
            Platform::Instagram => format!("https://www.instagram.com/{username}"),
            Platform::TikTok => format!("https://www.tiktok.com/@{username}"),
            Platform::Pinterest => format!("https://www.pinterest.com/{username}/"),
        }
    }

    pub fn referer(self) -> &'static str {
        match self {
            Platform::X => "https://x.com/",
            Platform::Threads => "https://www.threads.net/",
            Platform::Instagram => "https://www.instagram.com/",
            Platform::TikTok => "https://www.tiktok.com/",
            Platform::Pinterest => "https://www.pinterest.com/",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform `{0}` (expected x, threads, instagram, tiktok or pinterest)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "twitter" => Ok(Platform::X),
            "ig" => Ok(Platform::Instagram),
            _ => Platform::ALL
                .into_iter()
                .find(|p| p.dir_name() == wanted)
                .ok_or_else(|| UnknownPlatform(s.to_string())),
        }
    }
}
