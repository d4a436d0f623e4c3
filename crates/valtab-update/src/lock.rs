//! Per-data-type mutual exclusion around the retrieval-through-persistence
//! span. Overlapping cycles never block: a cycle that finds a data type busy
//! fails that source and moves on.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use valtab_core::RecordKind;

/// One lock per [`RecordKind`]. Share one instance across all cycles.
#[derive(Debug, Clone)]
pub struct DataTypeLocks {
    locks: Arc<HashMap<RecordKind, Arc<Mutex<()>>>>,
}

impl Default for DataTypeLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl DataTypeLocks {
    /// A lock for each record kind.
    pub fn new() -> Self {
        let locks = RecordKind::ALL
            .into_iter()
            .map(|kind| (kind, Arc::new(Mutex::new(()))))
            .collect();
        Self {
            locks: Arc::new(locks),
        }
    }

    /// Take the lock for `kind` if it is free.
    pub fn try_acquire(&self, kind: RecordKind) -> Option<OwnedMutexGuard<()>> {
        self.locks.get(&kind)?.clone().try_lock_owned().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let locks = DataTypeLocks::new();
        let guard = locks.try_acquire(RecordKind::CompanySize).unwrap();
        assert!(locks.clone().try_acquire(RecordKind::CompanySize).is_none());
        assert!(locks.try_acquire(RecordKind::DividendReduction).is_some());
        drop(guard);
        assert!(locks.try_acquire(RecordKind::CompanySize).is_some());
    }
}
