//! Raw HTTP requests against the remote course-plan store.
//!
//! One function per REST operation. Every function returns
//! `anyhow::Result`; converting failures into degraded local state is
//! the caller's job (`courseplan-core`), not this module's.

use anyhow::{Context, Result, bail};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use crate::config::RemoteConfig;
use crate::models::{Course, SemesterRecord};

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AckResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Attach the configured api key, if any.
fn with_key(builder: RequestBuilder, cfg: &RemoteConfig) -> RequestBuilder {
    match &cfg.api_key {
        Some(key) => builder.header("x-api-key", key),
        None => builder,
    }
}

/// Resolve a non-2xx response into an error carrying the server's
/// `{error}` message when one is present.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => "no error body".to_owned(),
    };
    bail!("remote store returned {status}: {message}");
}

/// Confirm a `{success: true}` acknowledgement body.
async fn check_ack(response: Response) -> Result<()> {
    let ack: AckResponse = check(response)
        .await?
        .json()
        .await
        .context("failed to parse acknowledgement body")?;
    if !ack.success {
        bail!("remote store did not acknowledge the operation");
    }
    Ok(())
}

/// Fetch all semesters.
pub async fn list_semesters(client: &Client, cfg: &RemoteConfig) -> Result<Vec<SemesterRecord>> {
    let url = format!("{}/api/semesters", cfg.base_url);
    let response = with_key(client.get(&url), cfg)
        .send()
        .await
        .context("failed to fetch semesters")?;
    let semesters = check(response)
        .await?
        .json()
        .await
        .context("failed to parse semester list")?;
    Ok(semesters)
}

/// Create a semester. Returns the id assigned by the store.
pub async fn create_semester(client: &Client, cfg: &RemoteConfig, name: &str) -> Result<String> {
    let url = format!("{}/api/semesters", cfg.base_url);
    let response = with_key(client.post(&url), cfg)
        .json(&json!({ "name": name }))
        .send()
        .await
        .with_context(|| format!("failed to create semester {name:?}"))?;
    let body: IdResponse = check(response)
        .await?
        .json()
        .await
        .context("failed to parse semester id")?;
    Ok(body.id)
}

/// Fetch the course list for a semester.
pub async fn list_courses(
    client: &Client,
    cfg: &RemoteConfig,
    semester_id: &str,
) -> Result<Vec<Course>> {
    let url = format!("{}/api/semesters/{semester_id}/courses", cfg.base_url);
    let response = with_key(client.get(&url), cfg)
        .send()
        .await
        .with_context(|| format!("failed to fetch courses for semester {semester_id}"))?;
    let courses = check(response)
        .await?
        .json()
        .await
        .context("failed to parse course list")?;
    Ok(courses)
}

/// Create a course within a semester. Returns the id assigned by the
/// store.
///
/// Any client-side `storage_id` on the input is stripped before
/// serialization; the store is the sole authority on document ids.
pub async fn create_course(
    client: &Client,
    cfg: &RemoteConfig,
    semester_id: &str,
    course: &Course,
) -> Result<String> {
    let url = format!("{}/api/semesters/{semester_id}/courses", cfg.base_url);
    let mut body = course.clone();
    body.storage_id = None;
    let response = with_key(client.post(&url), cfg)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("failed to create course {} in semester {semester_id}", course.identity()))?;
    let body: IdResponse = check(response)
        .await?
        .json()
        .await
        .context("failed to parse course id")?;
    Ok(body.id)
}

/// Delete a course from a semester.
pub async fn delete_course(
    client: &Client,
    cfg: &RemoteConfig,
    semester_id: &str,
    course_id: &str,
) -> Result<()> {
    let url = format!(
        "{}/api/semesters/{semester_id}/courses/{course_id}",
        cfg.base_url
    );
    let response = with_key(client.delete(&url), cfg)
        .send()
        .await
        .with_context(|| format!("failed to delete course {course_id}"))?;
    check_ack(response).await
}

/// Replace the notes of a course.
pub async fn update_notes(
    client: &Client,
    cfg: &RemoteConfig,
    semester_id: &str,
    course_id: &str,
    notes: &str,
) -> Result<()> {
    let url = format!(
        "{}/api/semesters/{semester_id}/courses/{course_id}/notes",
        cfg.base_url
    );
    let response = with_key(client.patch(&url), cfg)
        .json(&json!({ "notes": notes }))
        .send()
        .await
        .with_context(|| format!("failed to update notes for course {course_id}"))?;
    check_ack(response).await
}

/// Set the detail-visibility flag of a course.
pub async fn update_details(
    client: &Client,
    cfg: &RemoteConfig,
    semester_id: &str,
    course_id: &str,
    show_details: bool,
) -> Result<()> {
    let url = format!(
        "{}/api/semesters/{semester_id}/courses/{course_id}/details",
        cfg.base_url
    );
    let response = with_key(client.patch(&url), cfg)
        .json(&json!({ "showDetails": show_details }))
        .send()
        .await
        .with_context(|| format!("failed to update details for course {course_id}"))?;
    check_ack(response).await
}
