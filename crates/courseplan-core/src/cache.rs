//! Plan-wide single-flight cache of catalog enrichment, keyed by
//! course identity.
//!
//! Each identity moves through three states: absent, pending, and
//! resolved. The pending state is a shared `OnceCell` handle that is
//! created-or-returned atomically in one synchronous step under the
//! map lock, so two tasks racing on the same identity always end up
//! awaiting the same underlying fetch. A resolved value is immutable
//! and reused for every subsequent lookup; entries are never evicted
//! for the lifetime of the process (a session's distinct courses keep
//! the map small and bounded).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use courseplan_remote::models::{CourseIdentity, Enrichment};

use crate::catalog::CatalogSource;

/// Single-flight map from course identity to catalog enrichment.
#[derive(Default)]
pub struct EnrichmentCache {
    entries: Mutex<HashMap<CourseIdentity, Arc<OnceCell<Enrichment>>>>,
}

impl EnrichmentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the resolved enrichment for an identity, or `None` when
    /// the identity is absent or still pending.
    pub fn get(&self, identity: &CourseIdentity) -> Option<Enrichment> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(identity).and_then(|cell| cell.get().cloned())
    }

    /// Return the resolved enrichment for an identity, fetching it
    /// from `catalog` at most once per identity.
    ///
    /// The first caller for an identity runs the fetch; concurrent
    /// callers for the same identity await that same fetch and share
    /// its result. Once resolved, the value is returned synchronously
    /// forever after and is never overwritten.
    pub async fn get_or_fetch(
        &self,
        identity: &CourseIdentity,
        catalog: &dyn CatalogSource,
    ) -> Enrichment {
        let cell = self.handle(identity);
        cell.get_or_init(|| catalog.fetch_details(identity))
            .await
            .clone()
    }

    /// Atomically create-or-return the shared fetch handle for an
    /// identity. No `await` happens between the state check and the
    /// handle creation.
    fn handle(&self, identity: &CourseIdentity) -> Arc<OnceCell<Enrichment>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(identity.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

impl std::fmt::Debug for EnrichmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("EnrichmentCache")
            .field("identities", &entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
