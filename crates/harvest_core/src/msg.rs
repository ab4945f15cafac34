use crate::DiscoveryProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// The run is ready to discover; `admitted` is the ledger size so far.
    Begin { admitted: usize },
    /// The discovery collaborator finished one step.
    Advanced(DiscoveryProgress),
    /// The bounded wait for responses ended; `admitted` is the ledger size now.
    WaitElapsed { admitted: usize },
}
