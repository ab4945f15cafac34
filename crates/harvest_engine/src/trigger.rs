use harvest_core::DiscoveryProgress;
use tokio::sync::mpsc;

use crate::{HarvestError, Payload};

pub type PayloadSender = mpsc::UnboundedSender<Payload>;
pub type PayloadReceiver = mpsc::UnboundedReceiver<Payload>;

/// Channel between whatever produces responses (a pager, a browser listener)
/// and the harvest loop that consumes them.
pub fn payload_channel() -> (PayloadSender, PayloadReceiver) {
    mpsc::unbounded_channel()
}

/// The collaborator that makes more content appear: scroll a page, fetch the
/// next cursor. Responses travel separately through the payload channel.
#[async_trait::async_trait]
pub trait DiscoveryTrigger: Send {
    /// Open the target (first page, profile document). Failure aborts the run.
    async fn load(&mut self) -> Result<(), HarvestError>;

    /// One discovery step. `Err` is reserved for failures that make further
    /// discovery impossible; a step that found nothing is `Unchanged`.
    async fn advance(&mut self) -> Result<DiscoveryProgress, HarvestError>;
}
