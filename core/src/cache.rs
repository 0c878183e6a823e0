use crate::index::TfIdfIndex;
use std::sync::{Arc, OnceLock};

/// Write-once slot for the index of one immutable catalog.
///
/// `get_or_build` runs at most one build; concurrent callers block until it
/// completes, and every read after that is lock-free.
#[derive(Default)]
pub struct IndexCache {
    slot: OnceLock<Arc<TfIdfIndex>>,
}

impl IndexCache {
    pub fn new() -> Self { Self::default() }

    /// A cache that already holds `index`, e.g. one loaded from a snapshot.
    pub fn seeded(index: TfIdfIndex) -> Self {
        Self { slot: OnceLock::from(Arc::new(index)) }
    }

    pub fn get_or_build<F>(&self, build: F) -> Arc<TfIdfIndex>
    where
        F: FnOnce() -> TfIdfIndex,
    {
        Arc::clone(self.slot.get_or_init(|| Arc::new(build())))
    }

    pub fn is_built(&self) -> bool {
        self.slot.get().is_some()
    }
}
