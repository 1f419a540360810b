//! The `PersistenceStore` trait -- the adapter interface for the
//! remote course-plan store.
//!
//! The trait is intentionally object-safe so controllers can hold an
//! `Arc<dyn PersistenceStore>` and tests can substitute in-memory
//! fakes.

use anyhow::Result;
use async_trait::async_trait;

use courseplan_remote::models::{Course, SemesterRecord};

/// CRUD interface for semesters and courses in the remote store.
///
/// Every operation is its own unit of work: no transaction or lock
/// spans multiple calls. Implementations report expected failure modes
/// (network/server errors) through `Err`; callers decide whether to
/// apply or discard the attempted local change and must not let the
/// error escape past the engine operation that produced it.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Fetch all semesters, in store order.
    async fn list_semesters(&self) -> Result<Vec<SemesterRecord>>;

    /// Create a semester. Returns the id assigned by the store.
    async fn create_semester(&self, name: &str) -> Result<String>;

    /// Fetch the course list for a semester.
    async fn list_courses(&self, semester_id: &str) -> Result<Vec<Course>>;

    /// Create a course within a semester. Any client-side id on the
    /// input is ignored; returns the id assigned by the store.
    async fn create_course(&self, semester_id: &str, course: &Course) -> Result<String>;

    /// Delete a course from a semester.
    async fn delete_course(&self, semester_id: &str, course_id: &str) -> Result<()>;

    /// Replace the notes of a course.
    async fn update_notes(&self, semester_id: &str, course_id: &str, notes: &str) -> Result<()>;

    /// Set the detail-visibility flag of a course.
    async fn update_details(
        &self,
        semester_id: &str,
        course_id: &str,
        show_details: bool,
    ) -> Result<()>;
}

// Compile-time assertion: PersistenceStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PersistenceStore) {}
};
