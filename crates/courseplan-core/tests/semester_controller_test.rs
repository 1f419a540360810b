//! Tests for semester-level course operations: add, toggle, delete,
//! notes, and the confirm-then-apply failure contract.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use courseplan_core::cache::EnrichmentCache;
use courseplan_core::catalog::CatalogSource;
use courseplan_core::semester::SemesterController;
use courseplan_core::store::PersistenceStore;
use courseplan_remote::models::{Course, CourseIdentity, Enrichment, Instructor, SemesterRecord};

// ===========================================================================
// Fakes
// ===========================================================================

/// In-memory store with per-operation failure switches and call
/// counters for the guarded operations.
#[derive(Default)]
struct FakeStore {
    courses: Mutex<HashMap<String, Vec<Course>>>,
    fail_create_course: AtomicBool,
    fail_delete_course: AtomicBool,
    fail_update_notes: AtomicBool,
    fail_update_details: AtomicBool,
    fail_list_courses: AtomicBool,
    /// When set, `create_course` keeps handing out the id "c1".
    reuse_course_id: AtomicBool,
    update_details_calls: AtomicUsize,
    delete_course_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeStore {
    fn seed_course(&self, semester_id: &str, course: Course) {
        self.courses
            .lock()
            .unwrap()
            .entry(semester_id.to_owned())
            .or_default()
            .push(course);
    }
}

#[async_trait]
impl PersistenceStore for FakeStore {
    async fn list_semesters(&self) -> Result<Vec<SemesterRecord>> {
        Ok(vec![])
    }

    async fn create_semester(&self, _name: &str) -> Result<String> {
        bail!("not exercised in these tests");
    }

    async fn list_courses(&self, semester_id: &str) -> Result<Vec<Course>> {
        if self.fail_list_courses.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        Ok(self
            .courses
            .lock()
            .unwrap()
            .get(semester_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_course(&self, semester_id: &str, course: &Course) -> Result<String> {
        if self.fail_create_course.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        let id = if self.reuse_course_id.load(Ordering::SeqCst) {
            "c1".to_owned()
        } else {
            format!("c{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        };
        let mut stored = course.clone();
        stored.storage_id = Some(id.clone());
        self.seed_course(semester_id, stored);
        Ok(id)
    }

    async fn delete_course(&self, semester_id: &str, course_id: &str) -> Result<()> {
        self.delete_course_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete_course.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        if let Some(list) = self.courses.lock().unwrap().get_mut(semester_id) {
            list.retain(|c| c.storage_id.as_deref() != Some(course_id));
        }
        Ok(())
    }

    async fn update_notes(&self, _s: &str, _c: &str, _notes: &str) -> Result<()> {
        if self.fail_update_notes.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        Ok(())
    }

    async fn update_details(&self, _s: &str, _c: &str, _show: bool) -> Result<()> {
        self.update_details_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update_details.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        Ok(())
    }
}

/// Catalog serving one canned enrichment for every identity.
struct CannedCatalog {
    result: Enrichment,
}

#[async_trait]
impl CatalogSource for CannedCatalog {
    async fn fetch_details(&self, _identity: &CourseIdentity) -> Enrichment {
        self.result.clone()
    }
}

/// Catalog whose lookups block until the test releases the gate, so a
/// fetch can be held in flight while the list changes underneath it.
struct GatedCatalog {
    gate: Semaphore,
    result: Enrichment,
}

impl GatedCatalog {
    fn new(result: Enrichment) -> Self {
        Self {
            gate: Semaphore::new(0),
            result,
        }
    }

    fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl CatalogSource for GatedCatalog {
    async fn fetch_details(&self, _identity: &CourseIdentity) -> Enrichment {
        let _permit = self.gate.acquire().await.unwrap();
        self.result.clone()
    }
}

fn cs1110_enrichment() -> Enrichment {
    Enrichment {
        credits: Some(4.0),
        instructors: Some(vec![Instructor {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            netid: None,
        }]),
        ..Enrichment::default()
    }
}

fn controller(store: Arc<FakeStore>, enrichment: Enrichment) -> SemesterController {
    SemesterController::new(
        "s1",
        "Fall 2025",
        store,
        Arc::new(CannedCatalog { result: enrichment }),
        Arc::new(EnrichmentCache::new()),
    )
}

// ===========================================================================
// add_course
// ===========================================================================

#[tokio::test]
async fn add_course_persists_then_enriches() {
    // Scenario: create succeeds with id "c1", the catalog reports
    // 4 credits taught by Jane Doe.
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), cs1110_enrichment());

    let added = semester
        .add_course(Course::new("CS", 1110, "Intro to Computing"))
        .await;
    assert!(added);

    let mut expected = Course::new("CS", 1110, "Intro to Computing");
    expected.storage_id = Some("c1".to_owned());
    expected.credits = Some(4.0);
    expected.instructors = Some(vec![Instructor {
        first_name: "Jane".to_owned(),
        last_name: "Doe".to_owned(),
        netid: None,
    }]);
    assert_eq!(semester.courses(), vec![expected]);
}

#[tokio::test]
async fn add_course_refuses_repeated_storage_id() {
    // A store that hands out an id already present in the list is
    // misbehaving; the append is refused rather than duplicating the id.
    let store = Arc::new(FakeStore::default());
    let semester = Arc::new(controller(Arc::clone(&store), Enrichment::default()));
    assert!(semester.add_course(Course::new("CS", 1110, "Intro")).await);

    store.reuse_course_id.store(true, Ordering::SeqCst);
    let added = semester
        .add_course(Course::new("CS", 2110, "OO Programming"))
        .await;

    assert!(!added);
    let courses = semester.courses();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].storage_id.as_deref(), Some("c1"));
    assert_eq!(courses[0].catalog_nbr, 1110);
}

#[tokio::test]
async fn late_enrichment_after_delete_is_a_no_op() {
    // Delete the course while its catalog fetch is still in flight; the
    // resolution arrives against a list that no longer holds the
    // identity and must merge into nothing.
    let store = Arc::new(FakeStore::default());
    let catalog = Arc::new(GatedCatalog::new(cs1110_enrichment()));
    let semester = Arc::new(SemesterController::new(
        "s1",
        "Fall 2025",
        Arc::clone(&store) as Arc<dyn PersistenceStore>,
        Arc::clone(&catalog) as Arc<dyn CatalogSource>,
        Arc::new(EnrichmentCache::new()),
    ));

    let add = tokio::spawn({
        let semester = Arc::clone(&semester);
        async move { semester.add_course(Course::new("CS", 1110, "Intro")).await }
    });

    // The unenriched course appears as soon as the create resolves.
    while semester.courses().is_empty() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(semester.delete_course("c1").await);
    assert!(semester.courses().is_empty());

    catalog.release();
    assert!(add.await.unwrap());

    // The late resolution found no matching course and changed nothing.
    assert!(semester.courses().is_empty());
}

#[tokio::test]
async fn add_course_create_failure_never_becomes_visible() {
    let store = Arc::new(FakeStore::default());
    store.fail_create_course.store(true, Ordering::SeqCst);
    let semester = controller(Arc::clone(&store), cs1110_enrichment());

    let added = semester
        .add_course(Course::new("CS", 1110, "Intro to Computing"))
        .await;

    assert!(!added);
    assert!(semester.courses().is_empty());
    assert!(store.courses.lock().unwrap().is_empty());
}

// ===========================================================================
// load_courses
// ===========================================================================

#[tokio::test]
async fn load_courses_replaces_list_wholesale() {
    let store = Arc::new(FakeStore::default());
    let mut seeded = Course::new("MATH", 1920, "Multivariable Calculus");
    seeded.storage_id = Some("c9".to_owned());
    store.seed_course("s1", seeded.clone());

    let semester = controller(store, Enrichment::default());
    semester.load_courses().await;

    assert_eq!(semester.courses(), vec![seeded]);
}

#[tokio::test]
async fn load_courses_failure_keeps_local_list() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;

    store.fail_list_courses.store(true, Ordering::SeqCst);
    semester.load_courses().await;

    assert_eq!(semester.courses().len(), 1);
}

// ===========================================================================
// toggle_details
// ===========================================================================

#[tokio::test]
async fn toggle_details_applies_after_confirmation() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;

    let mut desired = semester.courses()[0].clone();
    desired.show_details = true;

    assert!(semester.toggle_details(&desired).await);
    assert!(semester.courses()[0].show_details);
}

#[tokio::test]
async fn toggle_details_failure_leaves_value_unchanged() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;

    store.fail_update_details.store(true, Ordering::SeqCst);
    let mut desired = semester.courses()[0].clone();
    desired.show_details = true;

    assert!(!semester.toggle_details(&desired).await);
    assert!(!semester.courses()[0].show_details);
}

#[tokio::test]
async fn toggle_details_skips_unpersisted_course() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());

    let mut unpersisted = Course::new("CS", 1110, "Intro");
    unpersisted.show_details = true;

    assert!(!semester.toggle_details(&unpersisted).await);
    // The store never sees an update for a course without a storage id.
    assert_eq!(store.update_details_calls.load(Ordering::SeqCst), 0);
}

// ===========================================================================
// delete_course
// ===========================================================================

#[tokio::test]
async fn delete_course_removes_only_the_target() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;
    semester.add_course(Course::new("CS", 2110, "OO Programming")).await;
    semester.add_course(Course::new("MATH", 1920, "Calc")).await;

    assert!(semester.delete_course("c1").await);

    // Order of the survivors is preserved.
    let ids: Vec<String> = semester
        .courses()
        .iter()
        .filter_map(|c| c.storage_id.clone())
        .collect();
    assert_eq!(ids, vec!["c2".to_owned(), "c3".to_owned()]);
}

#[tokio::test]
async fn delete_course_failure_keeps_course_visible() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;

    store.fail_delete_course.store(true, Ordering::SeqCst);
    assert!(!semester.delete_course("c1").await);

    assert_eq!(semester.courses().len(), 1);
    assert_eq!(store.delete_course_calls.load(Ordering::SeqCst), 1);
}

// ===========================================================================
// update_notes
// ===========================================================================

#[tokio::test]
async fn update_notes_mirrors_locally_on_success() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;

    assert!(semester.update_notes("c1", "take with CS 1132").await);
    assert_eq!(
        semester.courses()[0].notes.as_deref(),
        Some("take with CS 1132")
    );
}

#[tokio::test]
async fn update_notes_failure_leaves_notes_unchanged() {
    let store = Arc::new(FakeStore::default());
    let semester = controller(Arc::clone(&store), Enrichment::default());
    semester.add_course(Course::new("CS", 1110, "Intro")).await;

    store.fail_update_notes.store(true, Ordering::SeqCst);
    assert!(!semester.update_notes("c1", "draft text").await);
    assert!(semester.courses()[0].notes.is_none());
}
