//! HTTP implementation of [`PersistenceStore`] over the remote store's
//! REST surface.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use courseplan_remote::config::RemoteConfig;
use courseplan_remote::models::{Course, SemesterRecord};
use courseplan_remote::store;

use super::trait_def::PersistenceStore;

/// Remote store adapter backed by `reqwest`.
///
/// Stateless per call; safe to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    config: RemoteConfig,
}

impl HttpStore {
    /// Build an adapter for the given endpoint configuration.
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// The endpoint configuration this adapter talks to.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

#[async_trait]
impl PersistenceStore for HttpStore {
    async fn list_semesters(&self) -> Result<Vec<SemesterRecord>> {
        store::list_semesters(&self.client, &self.config).await
    }

    async fn create_semester(&self, name: &str) -> Result<String> {
        store::create_semester(&self.client, &self.config, name).await
    }

    async fn list_courses(&self, semester_id: &str) -> Result<Vec<Course>> {
        store::list_courses(&self.client, &self.config, semester_id).await
    }

    async fn create_course(&self, semester_id: &str, course: &Course) -> Result<String> {
        store::create_course(&self.client, &self.config, semester_id, course).await
    }

    async fn delete_course(&self, semester_id: &str, course_id: &str) -> Result<()> {
        store::delete_course(&self.client, &self.config, semester_id, course_id).await
    }

    async fn update_notes(&self, semester_id: &str, course_id: &str, notes: &str) -> Result<()> {
        store::update_notes(&self.client, &self.config, semester_id, course_id, notes).await
    }

    async fn update_details(
        &self,
        semester_id: &str,
        course_id: &str,
        show_details: bool,
    ) -> Result<()> {
        store::update_details(
            &self.client,
            &self.config,
            semester_id,
            course_id,
            show_details,
        )
        .await
    }
}
