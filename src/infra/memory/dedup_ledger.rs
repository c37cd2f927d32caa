use {
    crate::domain::{id::DedupKey, store::DedupLedger},
    std::{
        collections::HashSet,
        sync::{Mutex, MutexGuard, PoisonError},
    },
};

/// Process-lifetime ledger. Lost on restart, and not shared between
/// instances: a horizontally scaled deployment needs an external store.
#[derive(Debug, Default)]
pub struct InMemoryDedupLedger {
    keys: Mutex<HashSet<DedupKey>>,
}

impl InMemoryDedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<DedupKey>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DedupLedger for InMemoryDedupLedger {
    fn has_processed(&self, key: &DedupKey) -> bool {
        self.lock().contains(key)
    }

    fn mark_processed(&self, key: DedupKey) {
        self.lock().insert(key);
    }

    fn claim(&self, key: DedupKey) -> bool {
        self.lock().insert(key)
    }
}
