use std::fmt;

/// What one discovery step reported about the underlying cursor / page / height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryProgress {
    Advanced,
    Unchanged,
    /// Explicit end of content (no next cursor, terminal bookmark, missing page).
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    Stagnant,
    Exhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target reached"),
            StopReason::Stagnant => write!(f, "no new content"),
            StopReason::Exhausted => write!(f, "end of content"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Collecting,
    WaitingForResponse,
    Done(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    /// `None` means unbounded.
    pub max_items: Option<usize>,
    pub stagnation_threshold: u32,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            max_items: None,
            stagnation_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverState {
    settings: DriverSettings,
    phase: Phase,
    stagnation: u32,
    cycles: u32,
    admitted_before: usize,
    cursor_advanced: bool,
    exhausted: bool,
}

impl DriverState {
    pub fn new(settings: DriverSettings) -> Self {
        Self {
            settings: DriverSettings {
                stagnation_threshold: settings.stagnation_threshold.max(1),
                ..settings
            },
            phase: Phase::Idle,
            stagnation: 0,
            cycles: 0,
            admitted_before: 0,
            cursor_advanced: false,
            exhausted: false,
        }
    }

    pub fn settings(&self) -> DriverSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consecutive evaluated cycles without new items or cursor movement.
    pub fn stagnation(&self) -> u32 {
        self.stagnation
    }

    /// Evaluated discovery cycles so far.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.phase {
            Phase::Done(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stop_reason().is_some()
    }

    pub(crate) fn target_reached(&self, admitted: usize) -> bool {
        self.settings.max_items.is_some_and(|cap| admitted >= cap)
    }

    pub(crate) fn enter_collecting(&mut self, admitted: usize) {
        self.phase = Phase::Collecting;
        self.admitted_before = admitted;
        self.cursor_advanced = false;
    }

    pub(crate) fn enter_waiting(&mut self, progress: DiscoveryProgress) {
        self.phase = Phase::WaitingForResponse;
        self.cursor_advanced = progress == DiscoveryProgress::Advanced;
        self.exhausted = progress == DiscoveryProgress::Exhausted;
    }

    /// Count one finished cycle; returns the updated stagnation counter.
    pub(crate) fn record_cycle(&mut self, admitted: usize) -> u32 {
        self.cycles += 1;
        if admitted > self.admitted_before || self.cursor_advanced {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        self.stagnation
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn finish(&mut self, reason: StopReason) {
        self.phase = Phase::Done(reason);
    }
}
