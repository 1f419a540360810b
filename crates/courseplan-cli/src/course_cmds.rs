//! `courseplan course` commands: add, rm, toggle, notes.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use courseplan_core::plan::PlanStore;
use courseplan_core::semester::SemesterController;
use courseplan_remote::models::Course;

fn find_semester<'a>(
    plan: &'a PlanStore,
    semester_id: &str,
) -> Result<&'a Arc<SemesterController>> {
    plan.semester(semester_id)
        .with_context(|| format!("semester {semester_id} not found"))
}

pub async fn run_add(
    plan: &PlanStore,
    semester_id: &str,
    subject: &str,
    number: i32,
    title: &str,
) -> Result<()> {
    let semester = find_semester(plan, semester_id)?;
    let course = Course::new(subject.to_uppercase(), number, title);
    let identity = course.identity();

    if !semester.add_course(course).await {
        bail!("failed to add {identity} to {}", semester.name());
    }

    // The add appended the course last; report what the store and the
    // catalog produced for it.
    let courses = semester.courses();
    let added = courses
        .iter()
        .rev()
        .find(|c| c.identity() == identity)
        .with_context(|| format!("{identity} missing after add"))?;
    let id = added.storage_id.as_deref().unwrap_or("-");
    println!("Added {identity} to {} as {id}", semester.name());
    match added.credits {
        Some(credits) => println!("  {credits} credits"),
        None => println!("  no catalog data found"),
    }

    Ok(())
}

pub async fn run_rm(plan: &PlanStore, semester_id: &str, course_id: &str) -> Result<()> {
    let semester = find_semester(plan, semester_id)?;
    if !semester.delete_course(course_id).await {
        bail!("failed to delete course {course_id}");
    }
    println!("Deleted course {course_id} from {}", semester.name());
    Ok(())
}

/// Flip a course's detail visibility.
pub async fn run_toggle(plan: &PlanStore, semester_id: &str, course_id: &str) -> Result<()> {
    let semester = find_semester(plan, semester_id)?;
    let mut course = semester
        .courses()
        .into_iter()
        .find(|c| c.storage_id.as_deref() == Some(course_id))
        .with_context(|| format!("course {course_id} not found in {semester_id}"))?;

    course.show_details = !course.show_details;
    let desired = course.show_details;

    if !semester.toggle_details(&course).await {
        bail!("failed to update details for course {course_id}");
    }
    println!(
        "Details for {} now {}",
        course.identity(),
        if desired { "shown" } else { "hidden" }
    );
    Ok(())
}

pub async fn run_notes(
    plan: &PlanStore,
    semester_id: &str,
    course_id: &str,
    text: &str,
) -> Result<()> {
    let semester = find_semester(plan, semester_id)?;
    if !semester.update_notes(course_id, text).await {
        bail!("failed to update notes for course {course_id}");
    }
    println!("Notes updated for course {course_id}");
    Ok(())
}
