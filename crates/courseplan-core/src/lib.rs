//! Client-side synchronization engine for a multi-semester course plan.
//!
//! The engine maintains an in-memory hierarchical model (plan ->
//! semesters -> courses) mirroring a remote persisted store,
//! reconciles local mutations with asynchronous confirmation from that
//! store, and caches catalog enrichment per course identity with
//! single-flight semantics.
//!
//! Layering:
//! - [`store`] / [`catalog`] -- adapter traits over the remote store
//!   and the external catalog, plus their HTTP implementations.
//! - [`cache`] -- the plan-wide single-flight enrichment cache.
//! - [`semester`] -- one controller per semester, owning its course
//!   list and driving all course mutations.
//! - [`plan`] -- the semester list, bootstrap, and shared resources.

pub mod cache;
pub mod catalog;
pub mod plan;
pub mod semester;
pub mod store;

pub use cache::EnrichmentCache;
pub use catalog::{CatalogSource, HttpCatalog};
pub use plan::PlanStore;
pub use semester::SemesterController;
pub use store::{HttpStore, PersistenceStore};
