use std::collections::VecDeque;
use std::sync::Arc;

use harvest_core::{
    kind_for, update, Admission, DedupLedger, DestinationResolver, DriverState, Effect,
    MediaTask, Msg, Profile, StopReason,
};
use harvest_logging::{harvest_debug, harvest_trace, harvest_warn};
use tokio::time::{timeout_at, Instant};

use crate::{
    Adapter, DiscoveryTrigger, EventSink, HarvestError, HarvestEvent, HarvestSettings,
    NullEventSink, Payload, PayloadReceiver,
};

/// What discovery produced for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub profile: Profile,
    /// Harvested items in admission order; profile seeds are not included.
    pub tasks: Vec<MediaTask>,
    pub stop_reason: StopReason,
    pub cycles: u32,
}

/// Async interpreter of the core driver state machine.
pub struct HarvestLoop {
    settings: HarvestSettings,
    adapter: Box<dyn Adapter>,
    resolver: DestinationResolver,
    ledger: DedupLedger,
    profile: Profile,
    tasks: Vec<MediaTask>,
    events: Arc<dyn EventSink>,
}

impl HarvestLoop {
    pub fn new(
        settings: HarvestSettings,
        adapter: Box<dyn Adapter>,
        resolver: DestinationResolver,
        profile: Profile,
    ) -> Self {
        Self {
            settings,
            adapter,
            resolver,
            ledger: DedupLedger::new(),
            profile,
            tasks: Vec::new(),
            events: Arc::new(NullEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn admitted(&self) -> usize {
        self.ledger.len()
    }

    pub fn tasks(&self) -> &[MediaTask] {
        &self.tasks
    }

    /// Run one payload through the adapter and the ledger; returns how many
    /// items were newly admitted. Unparseable payloads are skipped.
    pub fn ingest(&mut self, payload: &Payload) -> usize {
        let extraction = match self.adapter.extract(payload) {
            Ok(extraction) => extraction,
            Err(err) => {
                harvest_debug!("Skipping payload: {}", err);
                return 0;
            }
        };

        if let Some(author) = &extraction.author {
            if self.profile.enrich(author) {
                harvest_debug!("Profile enriched from {}", payload.source);
            }
        }

        let mut admitted = 0;
        for item in extraction.items {
            if item.url.trim().is_empty() {
                continue;
            }
            if !self.settings.allows_collection(item.collection.as_deref()) {
                harvest_trace!("Skipping {} outside the selected collections", item.id);
                continue;
            }
            match self
                .ledger
                .admit_within(item.dedup_key(), self.settings.max_items)
            {
                Admission::Admitted => {
                    let destination = self.resolver.resolve(&self.profile, &item, kind_for(&item));
                    self.tasks.push(MediaTask {
                        id: item.dedup_key().to_string(),
                        url: item.url,
                        filename: destination.filename,
                        destination: destination.folder,
                        is_original: false,
                    });
                    admitted += 1;
                }
                Admission::Duplicate => {}
                Admission::CapReached => {
                    harvest_trace!("Item cap reached, dropping the rest of {}", payload.source);
                    break;
                }
            }
        }
        admitted
    }

    /// Drive discovery until the state machine reaches a terminal phase.
    pub async fn run(
        mut self,
        trigger: &mut dyn DiscoveryTrigger,
        responses: &mut PayloadReceiver,
    ) -> Result<HarvestOutcome, HarvestError> {
        // Whatever the initial load produced counts before the first cycle.
        while let Ok(payload) = responses.try_recv() {
            self.ingest(&payload);
        }

        let mut state = DriverState::new(self.settings.driver());
        let mut pending = VecDeque::new();
        let (next, effects) = update(state, Msg::Begin { admitted: self.admitted() });
        state = next;
        pending.extend(effects);

        while let Some(effect) = pending.pop_front() {
            let msg = match effect {
                Effect::Advance => Msg::Advanced(trigger.advance().await?),
                Effect::AwaitResponses => {
                    self.await_responses(responses).await;
                    Msg::WaitElapsed {
                        admitted: self.admitted(),
                    }
                }
                Effect::Finish(_) => break,
            };
            let (next, effects) = update(state, msg);
            state = next;
            if let Msg::WaitElapsed { admitted } = msg {
                harvest_debug!(
                    "Cycle {}: {} admitted, stagnation {}",
                    state.cycles(),
                    admitted,
                    state.stagnation()
                );
                self.events.emit(HarvestEvent::CycleEvaluated {
                    cycle: state.cycles(),
                    admitted,
                    stagnation: state.stagnation(),
                });
            }
            pending.extend(effects);
        }

        let stop_reason = state.stop_reason().ok_or_else(|| {
            HarvestError::Discovery("discovery ended without a stop reason".to_string())
        })?;
        if stop_reason == StopReason::Stagnant {
            harvest_warn!(
                "No new content for {} cycles, stopping with {} items",
                state.stagnation(),
                self.admitted()
            );
        }
        self.events.emit(HarvestEvent::Stopped {
            reason: stop_reason,
        });

        Ok(HarvestOutcome {
            profile: self.profile,
            tasks: self.tasks,
            stop_reason,
            cycles: state.cycles(),
        })
    }

    /// Wait up to the cycle timeout; once a response admits something, only
    /// the settle delay remains so near-simultaneous responses are batched.
    async fn await_responses(&mut self, responses: &mut PayloadReceiver) {
        let before = self.admitted();
        let mut deadline = Instant::now() + self.settings.wait_timeout();
        let mut settling = false;

        loop {
            match timeout_at(deadline, responses.recv()).await {
                Ok(Some(payload)) => {
                    self.ingest(&payload);
                    if self.cap_reached() {
                        break;
                    }
                    if !settling && self.admitted() > before {
                        settling = true;
                        deadline = deadline.min(Instant::now() + self.settings.settle_delay());
                    }
                }
                // every producer is gone; nothing more can arrive this cycle
                Ok(None) => break,
                Err(_elapsed) => break,
            }
        }
    }

    fn cap_reached(&self) -> bool {
        self.settings
            .max_items
            .is_some_and(|cap| self.admitted() >= cap)
    }
}
