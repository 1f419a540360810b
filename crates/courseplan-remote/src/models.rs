use std::fmt;

use serde::{Deserialize, Serialize};

/// The (subject, catalog number) pair that semantically names a course,
/// independent of any storage identifier.
///
/// Two courses with the same identity share catalog metadata even when
/// their titles differ; equality and hashing deliberately ignore
/// everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CourseIdentity {
    pub subject: String,
    pub catalog_nbr: i32,
}

impl CourseIdentity {
    pub fn new(subject: impl Into<String>, catalog_nbr: i32) -> Self {
        Self {
            subject: subject.into(),
            catalog_nbr,
        }
    }
}

impl fmt::Display for CourseIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.subject, self.catalog_nbr)
    }
}

/// An instructor as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub netid: Option<String>,
}

/// A course as held locally and persisted in the remote store.
///
/// The identity fields plus `title_short` are the user-entered stub;
/// the optional fields are catalog enrichment and user annotations.
/// `storage_id` is assigned by the remote store on creation -- `None`
/// means "not yet persisted", and such a course must never be targeted
/// by update or delete operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub subject: String,
    pub catalog_nbr: i32,
    pub title_short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_offered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructors: Option<Vec<Instructor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub show_details: bool,
    /// Remote store document id.
    #[serde(default, rename = "id", skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
}

impl Course {
    /// Build a bare, unpersisted course stub.
    pub fn new(subject: impl Into<String>, catalog_nbr: i32, title_short: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            catalog_nbr,
            title_short: title_short.into(),
            description: None,
            credits: None,
            when_offered: None,
            instructors: None,
            notes: None,
            show_details: false,
            storage_id: None,
        }
    }

    /// The catalog identity of this course.
    pub fn identity(&self) -> CourseIdentity {
        CourseIdentity::new(self.subject.clone(), self.catalog_nbr)
    }

    /// Overlay enrichment fields onto this course.
    ///
    /// Only fields the enrichment actually carries are written; absent
    /// fields leave the existing values untouched.
    pub fn apply_enrichment(&mut self, enrichment: &Enrichment) {
        if let Some(description) = &enrichment.description {
            self.description = Some(description.clone());
        }
        if let Some(credits) = enrichment.credits {
            self.credits = Some(credits);
        }
        if let Some(when_offered) = &enrichment.when_offered {
            self.when_offered = Some(when_offered.clone());
        }
        if let Some(instructors) = &enrichment.instructors {
            self.instructors = Some(instructors.clone());
        }
    }
}

/// Catalog metadata for one course identity: the enrichment subset of
/// [`Course`]. A fully-empty value is the degraded result of a failed
/// or unmatched catalog lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_offered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructors: Option<Vec<Instructor>>,
}

impl Enrichment {
    /// True when no catalog data was found.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.credits.is_none()
            && self.when_offered.is_none()
            && self.instructors.is_none()
    }
}

/// A semester as stored remotely: id plus display name. The course
/// list is fetched separately per semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterRecord {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ignores_title() {
        let a = Course::new("CS", 1110, "Intro to Computing");
        let b = Course::new("CS", 1110, "Completely Different Title");
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn identity_distinguishes_subject_and_number() {
        assert_ne!(
            CourseIdentity::new("CS", 1110),
            CourseIdentity::new("CS", 2110)
        );
        assert_ne!(
            CourseIdentity::new("CS", 1110),
            CourseIdentity::new("MATH", 1110)
        );
    }

    #[test]
    fn apply_enrichment_overlays_present_fields_only() {
        let mut course = Course::new("CS", 1110, "Intro");
        course.description = Some("old".to_owned());

        let enrichment = Enrichment {
            credits: Some(4.0),
            ..Enrichment::default()
        };
        course.apply_enrichment(&enrichment);

        assert_eq!(course.credits, Some(4.0));
        // Absent enrichment fields do not clobber existing values.
        assert_eq!(course.description.as_deref(), Some("old"));
    }

    #[test]
    fn course_wire_format_is_camel_case() {
        let mut course = Course::new("CS", 1110, "Intro to Computing");
        course.storage_id = Some("c1".to_owned());
        course.show_details = true;

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["subject"], "CS");
        assert_eq!(json["catalogNbr"], 1110);
        assert_eq!(json["titleShort"], "Intro to Computing");
        assert_eq!(json["showDetails"], true);
        assert_eq!(json["id"], "c1");
        // Unset options are omitted entirely.
        assert!(json.get("description").is_none());
    }

    #[test]
    fn course_deserializes_remote_document() {
        let json = r#"{
            "subject": "CS",
            "catalogNbr": 1110,
            "titleShort": "Intro to Computing",
            "credits": 4,
            "notes": "take with 1132",
            "id": "abc123"
        }"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.catalog_nbr, 1110);
        assert_eq!(course.credits, Some(4.0));
        assert_eq!(course.notes.as_deref(), Some("take with 1132"));
        assert_eq!(course.storage_id.as_deref(), Some("abc123"));
        assert!(!course.show_details);
    }

    #[test]
    fn empty_enrichment() {
        assert!(Enrichment::default().is_empty());
        let e = Enrichment {
            when_offered: Some("Fall, Spring".to_owned()),
            ..Enrichment::default()
        };
        assert!(!e.is_empty());
    }
}
