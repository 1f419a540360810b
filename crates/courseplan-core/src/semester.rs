//! Per-semester controller: owns one semester's course list and drives
//! every course mutation through the remote store and the enrichment
//! cache.
//!
//! The contract for every mutation is confirm-then-apply: local state
//! changes only after the remote call resolves successfully. A failed
//! call leaves the local list exactly as it was, with a log line as the
//! only trace. The course-list mutex is never held across an `await`;
//! suspension points are exactly the store and catalog calls, and
//! operations from different tasks interleave freely between them.

use std::sync::{Arc, Mutex};

use courseplan_remote::models::{Course, CourseIdentity, Enrichment};

use crate::cache::EnrichmentCache;
use crate::catalog::CatalogSource;
use crate::store::PersistenceStore;

/// Controller for one semester and its ordered course list.
pub struct SemesterController {
    semester_id: String,
    name: String,
    courses: Mutex<Vec<Course>>,
    store: Arc<dyn PersistenceStore>,
    catalog: Arc<dyn CatalogSource>,
    cache: Arc<EnrichmentCache>,
}

impl SemesterController {
    /// Build a controller for an already-persisted semester.
    ///
    /// The enrichment cache is shared plan-wide: the same identity
    /// added in two different semesters resolves from one fetch.
    pub fn new(
        semester_id: impl Into<String>,
        name: impl Into<String>,
        store: Arc<dyn PersistenceStore>,
        catalog: Arc<dyn CatalogSource>,
        cache: Arc<EnrichmentCache>,
    ) -> Self {
        Self {
            semester_id: semester_id.into(),
            name: name.into(),
            courses: Mutex::new(Vec::new()),
            store,
            catalog,
            cache,
        }
    }

    /// Storage id of this semester.
    pub fn semester_id(&self) -> &str {
        &self.semester_id
    }

    /// Display name of this semester.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the course list, in display order.
    pub fn courses(&self) -> Vec<Course> {
        self.courses.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Fetch this semester's course list from the remote store,
    /// replacing the local list wholesale. Runs once per semester
    /// mount; on failure the local list is left as it was.
    pub async fn load_courses(&self) {
        match self.store.list_courses(&self.semester_id).await {
            Ok(fetched) => {
                let mut courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
                *courses = fetched;
            }
            Err(err) => {
                tracing::error!(
                    semester_id = %self.semester_id,
                    error = %format!("{err:#}"),
                    "failed to load courses"
                );
            }
        }
    }

    /// Add a course: persist first, then append locally, then enrich.
    ///
    /// 1. Create the course remotely. On failure, abort -- the course
    ///    never becomes visible locally.
    /// 2. Append the stored course (now carrying its storage id) with
    ///    no enrichment fields yet.
    /// 3. Resolve enrichment through the shared cache. A concurrent
    ///    add of the same identity joins the in-flight fetch instead of
    ///    starting a second one; after resolution the cached fields are
    ///    merged into every course in the list sharing the identity.
    ///
    /// Returns whether the course was added.
    pub async fn add_course(&self, course: Course) -> bool {
        let identity = course.identity();

        let storage_id = match self.store.create_course(&self.semester_id, &course).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    semester_id = %self.semester_id,
                    identity = %identity,
                    error = %format!("{err:#}"),
                    "failed to create course"
                );
                return false;
            }
        };

        {
            let mut courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
            if courses
                .iter()
                .any(|c| c.storage_id.as_deref() == Some(storage_id.as_str()))
            {
                // The store is the id authority; a repeat here would
                // break the unique-storage-id invariant of the list.
                tracing::warn!(
                    semester_id = %self.semester_id,
                    course_id = %storage_id,
                    "store returned an id already present in the list, skipping append"
                );
                return false;
            }
            let mut stored = course;
            stored.storage_id = Some(storage_id);
            courses.push(stored);
        }

        let enrichment = self.cache.get_or_fetch(&identity, self.catalog.as_ref()).await;
        self.apply_enrichment(&identity, &enrichment);
        true
    }

    /// Persist a new detail-visibility value, then mirror it locally.
    ///
    /// `course` carries the desired new `show_details` value. A course
    /// without a storage id cannot be toggled persistently and is
    /// skipped. On remote failure the local course is left unchanged.
    ///
    /// Returns whether the new value was applied.
    pub async fn toggle_details(&self, course: &Course) -> bool {
        let Some(course_id) = course.storage_id.as_deref() else {
            tracing::warn!(
                semester_id = %self.semester_id,
                identity = %course.identity(),
                "cannot toggle details for an unpersisted course"
            );
            return false;
        };

        match self
            .store
            .update_details(&self.semester_id, course_id, course.show_details)
            .await
        {
            Ok(()) => {
                let mut courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(local) = courses
                    .iter_mut()
                    .find(|c| c.storage_id.as_deref() == Some(course_id))
                {
                    local.show_details = course.show_details;
                }
                true
            }
            Err(err) => {
                tracing::error!(
                    semester_id = %self.semester_id,
                    course_id = %course_id,
                    error = %format!("{err:#}"),
                    "failed to update details"
                );
                false
            }
        }
    }

    /// Delete a course by storage id. Only a confirmed remote delete
    /// removes the course locally; on failure it stays visible.
    ///
    /// Returns whether the course was removed.
    pub async fn delete_course(&self, storage_id: &str) -> bool {
        match self.store.delete_course(&self.semester_id, storage_id).await {
            Ok(()) => {
                let mut courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
                courses.retain(|c| c.storage_id.as_deref() != Some(storage_id));
                true
            }
            Err(err) => {
                tracing::error!(
                    semester_id = %self.semester_id,
                    course_id = %storage_id,
                    error = %format!("{err:#}"),
                    "failed to delete course"
                );
                false
            }
        }
    }

    /// Persist new notes text, then mirror it locally on success.
    ///
    /// Returns whether the call resolved successfully, so an editing
    /// surface can leave edit mode either way.
    pub async fn update_notes(&self, storage_id: &str, notes: &str) -> bool {
        match self
            .store
            .update_notes(&self.semester_id, storage_id, notes)
            .await
        {
            Ok(()) => {
                let mut courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(local) = courses
                    .iter_mut()
                    .find(|c| c.storage_id.as_deref() == Some(storage_id))
                {
                    local.notes = Some(notes.to_owned());
                }
                true
            }
            Err(err) => {
                tracing::error!(
                    semester_id = %self.semester_id,
                    course_id = %storage_id,
                    error = %format!("{err:#}"),
                    "failed to update notes"
                );
                false
            }
        }
    }

    /// Merge resolved enrichment into every course sharing `identity`.
    ///
    /// A resolution that arrives after the matching courses are gone
    /// (deleted, or the list was reloaded) simply matches nothing;
    /// late completions are tolerated as no-ops.
    fn apply_enrichment(&self, identity: &CourseIdentity, enrichment: &Enrichment) {
        let mut courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
        for course in courses.iter_mut().filter(|c| c.identity() == *identity) {
            course.apply_enrichment(enrichment);
        }
    }
}

impl std::fmt::Debug for SemesterController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemesterController")
            .field("semester_id", &self.semester_id)
            .field("name", &self.name)
            .field("courses", &self.courses.lock().unwrap_or_else(|e| e.into_inner()).len())
            .finish()
    }
}
