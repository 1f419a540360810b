//! Tests for plan bootstrap and semester creation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use courseplan_core::catalog::CatalogSource;
use courseplan_core::plan::{DEFAULT_SEMESTER_NAME, PlanStore};
use courseplan_core::store::PersistenceStore;
use courseplan_remote::models::{Course, CourseIdentity, Enrichment, SemesterRecord};

// ===========================================================================
// Fakes
// ===========================================================================

/// In-memory store with per-operation failure switches.
#[derive(Default)]
struct FakeStore {
    semesters: Mutex<Vec<SemesterRecord>>,
    courses: Mutex<HashMap<String, Vec<Course>>>,
    fail_list_semesters: AtomicBool,
    fail_create_semester: AtomicBool,
    create_semester_calls: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeStore {
    fn seed_semester(&self, id: &str, name: &str) {
        self.semesters
            .lock()
            .unwrap()
            .push(SemesterRecord {
                id: id.to_owned(),
                name: name.to_owned(),
            });
    }

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
        if self.fail_list_semesters.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        Ok(self.semesters.lock().unwrap().clone())
    }

    async fn create_semester(&self, name: &str) -> Result<String> {
        self.create_semester_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create_semester.load(Ordering::SeqCst) {
            bail!("remote store unavailable");
        }
        let id = format!("s{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.seed_semester(&id, name);
        Ok(id)
    }

    async fn list_courses(&self, semester_id: &str) -> Result<Vec<Course>> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .get(semester_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_course(&self, _semester_id: &str, _course: &Course) -> Result<String> {
        bail!("not exercised in these tests");
    }

    async fn delete_course(&self, _semester_id: &str, _course_id: &str) -> Result<()> {
        bail!("not exercised in these tests");
    }

    async fn update_notes(&self, _s: &str, _c: &str, _notes: &str) -> Result<()> {
        bail!("not exercised in these tests");
    }

    async fn update_details(&self, _s: &str, _c: &str, _show: bool) -> Result<()> {
        bail!("not exercised in these tests");
    }
}

/// Catalog that always reports no data.
struct NullCatalog;

#[async_trait]
impl CatalogSource for NullCatalog {
    async fn fetch_details(&self, _identity: &CourseIdentity) -> Enrichment {
        Enrichment::default()
    }
}

fn plan_over(store: Arc<FakeStore>) -> PlanStore {
    PlanStore::new(store, Arc::new(NullCatalog))
}

// ===========================================================================
// Bootstrap
// ===========================================================================

#[tokio::test]
async fn bootstrap_empty_store_creates_default_semester() {
    let store = Arc::new(FakeStore::default());
    let mut plan = plan_over(Arc::clone(&store));

    plan.bootstrap().await;

    assert_eq!(plan.semesters().len(), 1);
    assert_eq!(plan.semesters()[0].name(), DEFAULT_SEMESTER_NAME);
    assert_eq!(store.create_semester_calls.load(Ordering::SeqCst), 1);
    // The default semester was persisted, not just surfaced locally.
    assert_eq!(store.semesters.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn bootstrap_preserves_existing_semesters_verbatim() {
    let store = Arc::new(FakeStore::default());
    store.seed_semester("s1", "Fall 2025");
    store.seed_semester("s2", "Spring 2026");
    store.seed_semester("s3", "Fall 2026");

    let mut plan = plan_over(Arc::clone(&store));
    plan.bootstrap().await;

    let names: Vec<&str> = plan.semesters().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Fall 2025", "Spring 2026", "Fall 2026"]);
    assert_eq!(store.create_semester_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bootstrap_loads_each_semesters_courses() {
    let store = Arc::new(FakeStore::default());
    store.seed_semester("s1", "Fall 2025");
    let mut seeded = Course::new("CS", 1110, "Intro to Computing");
    seeded.storage_id = Some("c1".to_owned());
    store.seed_course("s1", seeded.clone());

    let mut plan = plan_over(store);
    plan.bootstrap().await;

    let courses = plan.semesters()[0].courses();
    assert_eq!(courses, vec![seeded]);
}

#[tokio::test]
async fn bootstrap_fetch_failure_surfaces_no_semesters() {
    let store = Arc::new(FakeStore::default());
    store.seed_semester("s1", "Fall 2025");
    store.fail_list_semesters.store(true, Ordering::SeqCst);

    let mut plan = plan_over(Arc::clone(&store));
    plan.bootstrap().await;

    assert!(plan.semesters().is_empty());
    // No automatic retry, no bootstrap semester creation.
    assert_eq!(store.create_semester_calls.load(Ordering::SeqCst), 0);
}

// ===========================================================================
// Adding semesters
// ===========================================================================

#[tokio::test]
async fn add_semester_appends_preserving_order() {
    let store = Arc::new(FakeStore::default());
    store.seed_semester("s1", "Fall 2025");

    let mut plan = plan_over(store);
    plan.bootstrap().await;

    let name = plan.next_semester_name();
    assert_eq!(name, "Semester 2");

    let added = plan.add_semester(&name).await;
    assert!(added.is_some());

    let names: Vec<&str> = plan.semesters().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["Fall 2025", "Semester 2"]);
}

#[tokio::test]
async fn add_semester_failure_leaves_plan_unchanged() {
    let store = Arc::new(FakeStore::default());
    store.seed_semester("s1", "Fall 2025");

    let mut plan = plan_over(Arc::clone(&store));
    plan.bootstrap().await;

    store.fail_create_semester.store(true, Ordering::SeqCst);
    let added = plan.add_semester("Semester 2").await;

    assert!(added.is_none());
    assert_eq!(plan.semesters().len(), 1);
    assert_eq!(plan.semesters()[0].name(), "Fall 2025");
}

#[tokio::test]
async fn semester_lookup_by_id() {
    let store = Arc::new(FakeStore::default());
    store.seed_semester("s1", "Fall 2025");
    store.seed_semester("s2", "Spring 2026");

    let mut plan = plan_over(store);
    plan.bootstrap().await;

    assert_eq!(plan.semester("s2").map(|s| s.name()), Some("Spring 2026"));
    assert!(plan.semester("nope").is_none());
}
