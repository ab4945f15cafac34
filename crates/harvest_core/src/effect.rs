use crate::StopReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ask the collaborator for more content (scroll, next page, next cursor).
    Advance,
    /// Wait for responses until new items settle or the cycle timeout elapses.
    AwaitResponses,
    /// Terminal: stop discovering.
    Finish(StopReason),
}
