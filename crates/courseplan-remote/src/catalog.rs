//! Raw HTTP request and response extraction for the external class
//! catalog.
//!
//! The catalog search endpoint returns, per subject, a list of class
//! records with deeply nested enrollment data. Extraction is
//! deliberately forgiving: every level of the nesting is optional, and
//! a missing link anywhere yields less data rather than an error.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::config::CatalogConfig;
use crate::models::{CourseIdentity, Enrichment, Instructor};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    classes: Vec<ClassRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassRecord {
    catalog_nbr: CatalogNbr,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    catalog_when_offered: Option<String>,
    #[serde(default)]
    enroll_groups: Vec<EnrollGroup>,
}

/// The catalog reports catalog numbers sometimes as strings and
/// sometimes as numbers; matching is numeric either way.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogNbr {
    Number(i64),
    Text(String),
}

impl CatalogNbr {
    fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Number(n) => i32::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollGroup {
    #[serde(default)]
    units_minimum: Option<f64>,
    #[serde(default)]
    class_sections: Vec<ClassSection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassSection {
    #[serde(default)]
    meetings: Vec<Meeting>,
}

#[derive(Debug, Deserialize)]
struct Meeting {
    #[serde(default)]
    instructors: Vec<Instructor>,
}

/// Fetch enrichment metadata for one course identity.
///
/// Issues a subject-wide search and selects the record whose catalog
/// number matches numerically. Returns an empty [`Enrichment`] when
/// the subject has no matching record; network and parse failures are
/// returned as errors for the caller to degrade.
pub async fn fetch_details(
    client: &Client,
    cfg: &CatalogConfig,
    identity: &CourseIdentity,
) -> Result<Enrichment> {
    let url = format!(
        "{}/search/classes.json?roster={}&subject={}",
        cfg.base_url, cfg.roster, identity.subject
    );
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await
        .with_context(|| format!("catalog request for {identity} failed"))?
        .error_for_status()
        .with_context(|| format!("catalog request for {identity} rejected"))?;
    let body: SearchResponse = response
        .json()
        .await
        .with_context(|| format!("failed to parse catalog response for {identity}"))?;

    Ok(extract_enrichment(&body.data.classes, identity))
}

/// Pick the matching class record and pull out the enrichment fields.
fn extract_enrichment(classes: &[ClassRecord], identity: &CourseIdentity) -> Enrichment {
    let Some(record) = classes
        .iter()
        .find(|c| c.catalog_nbr.as_i32() == Some(identity.catalog_nbr))
    else {
        tracing::warn!(identity = %identity, "course not found in catalog response");
        return Enrichment::default();
    };

    let mut enrichment = Enrichment {
        description: record.description.clone(),
        when_offered: record.catalog_when_offered.clone(),
        ..Enrichment::default()
    };

    // Credits come from the first enrollment group's minimum units.
    if let Some(group) = record.enroll_groups.first() {
        enrichment.credits = group.units_minimum;
    }

    // Instructors come from the first meeting of the first section of
    // the first group; any missing link means no instructors.
    if let Some(instructors) = record
        .enroll_groups
        .first()
        .and_then(|g| g.class_sections.first())
        .and_then(|s| s.meetings.first())
        .map(|m| m.instructors.clone())
    {
        enrichment.instructors = Some(instructors);
    }

    enrichment
}
