//! Harvest engine: transport, persistence, bounded downloads, platform
//! adapters and the async discovery loop.
mod adapters;
mod coordinator;
mod error;
mod events;
mod harvest;
mod pager;
mod payload;
mod persist;
mod runner;
mod session;
mod settings;
mod transport;
mod trigger;

pub use adapters::{
    Adapter, PinterestAdapter, Platform, ThreadsAdapter, TikTokAdapter, UnknownPlatform, XAdapter,
};
pub use coordinator::{Coordinator, RunRequest};
pub use error::{AdapterError, FailureKind, FetchError, HarvestError, PersistError};
pub use events::{ChannelEventSink, EventSink, HarvestEvent, NullEventSink};
pub use harvest::{HarvestLoop, HarvestOutcome};
pub use pager::{HttpPager, Pagination, SourceSettings};
pub use payload::Payload;
pub use persist::{ensure_folder, MediaWriter};
pub use runner::{run_bounded, TaskFailure};
pub use session::{RequestHeaders, RequestKind, SessionProvider, SessionSettings, StaticSession};
pub use settings::{HarvestSettings, JitterRange, TransportSettings};
pub use transport::{read_to_end, ByteStream, MediaStream, ReqwestTransport, Transport};
pub use trigger::{payload_channel, DiscoveryTrigger, PayloadReceiver, PayloadSender};
