use std::sync::mpsc::Sender;

use harvest_core::{DownloadResult, StopReason};

/// Progress notifications for front-ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    CycleEvaluated {
        cycle: u32,
        admitted: usize,
        stagnation: u32,
    },
    Stopped {
        reason: StopReason,
    },
    DownloadFinished {
        index: usize,
        result: DownloadResult,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Forwards events over a std channel; a dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: Sender<HarvestEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: Sender<HarvestEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: HarvestEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: HarvestEvent) {}
}
