use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Duplicate,
    CapReached,
}

/// Set of item ids seen during one harvest run.
///
/// Every check-and-insert happens under a single lock, so response handlers that
/// interleave with the discovery loop can share one ledger through an `Arc`.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: Mutex<HashSet<String>>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`; `true` only the first time it is offered.
    pub fn admit(&self, id: &str) -> bool {
        self.lock().insert(id.to_string())
    }

    /// Like [`admit`](Self::admit), but refuses new ids once `cap` ids are recorded.
    pub fn admit_within(&self, id: &str, cap: Option<usize>) -> Admission {
        let mut seen = self.lock();
        if seen.contains(id) {
            return Admission::Duplicate;
        }
        if cap.is_some_and(|cap| seen.len() >= cap) {
            return Admission::CapReached;
        }
        seen.insert(id.to_string());
        Admission::Admitted
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock cannot leave the set half-updated.
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
