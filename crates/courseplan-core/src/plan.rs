//! The plan: an ordered list of semesters plus the resources they
//! share.
//!
//! A plan has no persisted identity of its own -- it is simply "all
//! semesters for this store instance". It is created once at
//! application start and lives for the session; semesters are created
//! through it and never locally removed.

use std::sync::Arc;

use courseplan_remote::models::SemesterRecord;

use crate::cache::EnrichmentCache;
use crate::catalog::CatalogSource;
use crate::semester::SemesterController;
use crate::store::PersistenceStore;

/// Name given to the semester created when the store is empty.
pub const DEFAULT_SEMESTER_NAME: &str = "Semester 1";

/// Owner of the semester list and the plan-wide enrichment cache.
pub struct PlanStore {
    store: Arc<dyn PersistenceStore>,
    catalog: Arc<dyn CatalogSource>,
    cache: Arc<EnrichmentCache>,
    semesters: Vec<Arc<SemesterController>>,
}

impl PlanStore {
    /// Build an empty plan over the given adapters.
    pub fn new(store: Arc<dyn PersistenceStore>, catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            store,
            catalog,
            cache: Arc::new(EnrichmentCache::new()),
            semesters: Vec::new(),
        }
    }

    /// The semester controllers, in display order.
    pub fn semesters(&self) -> &[Arc<SemesterController>] {
        &self.semesters
    }

    /// Find a semester controller by storage id.
    pub fn semester(&self, semester_id: &str) -> Option<&Arc<SemesterController>> {
        self.semesters
            .iter()
            .find(|s| s.semester_id() == semester_id)
    }

    /// The plan-wide enrichment cache shared by every controller.
    pub fn cache(&self) -> &Arc<EnrichmentCache> {
        &self.cache
    }

    /// Name for the next semester: "Semester {n+1}".
    pub fn next_semester_name(&self) -> String {
        format!("Semester {}", self.semesters.len() + 1)
    }

    /// One-time startup: load all semesters and their courses.
    ///
    /// When the store reports zero semesters, a single default
    /// semester is created so the plan is never empty after a
    /// successful bootstrap. When the initial fetch fails, the plan
    /// surfaces zero semesters and logs the condition; there is no
    /// automatic retry.
    pub async fn bootstrap(&mut self) {
        let records = match self.store.list_semesters().await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(
                    error = %format!("{err:#}"),
                    "failed to load semesters, starting with an empty plan"
                );
                return;
            }
        };

        if records.is_empty() {
            self.add_semester(DEFAULT_SEMESTER_NAME).await;
            return;
        }

        for record in records {
            self.semesters.push(self.controller_for(record));
        }

        // Each semester loads its own course list; loads are
        // independent and run concurrently.
        futures::future::join_all(self.semesters.iter().map(|s| s.load_courses())).await;
    }

    /// Create a semester remotely and append it to the plan.
    ///
    /// On success the new controller is returned with its course list
    /// loaded. On failure the semester list is left unchanged and the
    /// failure is logged -- the new semester is silently dropped.
    pub async fn add_semester(&mut self, name: &str) -> Option<Arc<SemesterController>> {
        let id = match self.store.create_semester(name).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    name = %name,
                    error = %format!("{err:#}"),
                    "failed to create semester"
                );
                return None;
            }
        };

        let controller = self.controller_for(SemesterRecord {
            id,
            name: name.to_owned(),
        });
        controller.load_courses().await;
        self.semesters.push(Arc::clone(&controller));
        Some(controller)
    }

    fn controller_for(&self, record: SemesterRecord) -> Arc<SemesterController> {
        Arc::new(SemesterController::new(
            record.id,
            record.name,
            Arc::clone(&self.store),
            Arc::clone(&self.catalog),
            Arc::clone(&self.cache),
        ))
    }
}

impl std::fmt::Debug for PlanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanStore")
            .field(
                "semesters",
                &self
                    .semesters
                    .iter()
                    .map(|s| s.semester_id().to_owned())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
