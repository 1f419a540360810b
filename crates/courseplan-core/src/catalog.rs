//! Catalog adapter: the `CatalogSource` trait and its HTTP
//! implementation.
//!
//! A catalog source never surfaces an error to its caller. Network
//! failures, malformed responses, and unmatched lookups all degrade to
//! an empty [`Enrichment`] with a log line; the enrichment pipeline
//! treats "no data" and "lookup failed" identically.

use async_trait::async_trait;
use reqwest::Client;

use courseplan_remote::catalog;
use courseplan_remote::config::CatalogConfig;
use courseplan_remote::models::{CourseIdentity, Enrichment};

/// Read-only source of catalog enrichment for a course identity.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Look up enrichment metadata for one identity. Infallible by
    /// contract: degraded lookups return an empty value.
    async fn fetch_details(&self, identity: &CourseIdentity) -> Enrichment;
}

// Compile-time assertion: CatalogSource must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CatalogSource) {}
};

/// Catalog adapter backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    config: CatalogConfig,
}

impl HttpCatalog {
    /// Build an adapter for the given catalog configuration.
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch_details(&self, identity: &CourseIdentity) -> Enrichment {
        match catalog::fetch_details(&self.client, &self.config, identity).await {
            Ok(enrichment) => enrichment,
            Err(err) => {
                tracing::warn!(
                    identity = %identity,
                    error = %format!("{err:#}"),
                    "catalog lookup failed, continuing without enrichment"
                );
                Enrichment::default()
            }
        }
    }
}
