//! Harvest core: media model, destination resolution, dedup ledger and the
//! pure discovery state machine.
mod effect;
mod item;
mod ledger;
mod msg;
mod profile;
mod resolver;
mod state;
mod summary;
mod task;
mod update;

pub use effect::Effect;
pub use item::{Extraction, RawAuthor, RawItem};
pub use ledger::{Admission, DedupLedger};
pub use msg::Msg;
pub use profile::{normalize_username, Profile};
pub use resolver::{
    extension_for, extension_from_url, kind_for, sanitize_segment, short_hash, Destination,
    DestinationResolver, SeedKind,
};
pub use state::{DiscoveryProgress, DriverSettings, DriverState, Phase, StopReason};
pub use summary::{RunFailure, RunSummary};
pub use task::{DownloadResult, DownloadStatus, MediaKind, MediaTask};
pub use update::update;
