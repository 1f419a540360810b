//! Wire layer for the course plan engine.
//!
//! Holds the domain/wire models, endpoint configuration, and the raw
//! HTTP request functions against the remote course-plan store and the
//! external class catalog. Higher-level policy (what to do when a call
//! fails, caching, local state) lives in `courseplan-core`.

pub mod catalog;
pub mod config;
pub mod models;
pub mod store;
