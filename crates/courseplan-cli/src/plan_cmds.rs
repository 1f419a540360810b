//! `courseplan show` and `courseplan semester` commands.

use anyhow::{Result, bail};

use courseplan_core::plan::PlanStore;
use courseplan_remote::models::Course;

/// Print the whole plan: every semester and its courses.
pub fn run_show(plan: &PlanStore) -> Result<()> {
    if plan.semesters().is_empty() {
        println!("No semesters found (is the store reachable?).");
        return Ok(());
    }

    for semester in plan.semesters() {
        let courses = semester.courses();
        println!("{} ({})", semester.name(), semester.semester_id());
        if courses.is_empty() {
            println!("  (no courses)");
        }
        for course in &courses {
            print_course(course);
        }
        println!();
    }

    Ok(())
}

fn print_course(course: &Course) {
    let credits = course
        .credits
        .map(|c| format!("{c} cr"))
        .unwrap_or_else(|| "? cr".to_owned());
    let id = course.storage_id.as_deref().unwrap_or("-");
    println!(
        "  [{id}] {} {}: {} ({credits})",
        course.subject, course.catalog_nbr, course.title_short
    );
    if let Some(instructors) = &course.instructors {
        let names: Vec<String> = instructors
            .iter()
            .map(|i| format!("{} {}", i.first_name, i.last_name))
            .collect();
        if !names.is_empty() {
            println!("      taught by {}", names.join(", "));
        }
    }
    if let Some(notes) = &course.notes {
        if !notes.is_empty() {
            println!("      notes: {notes}");
        }
    }
}

/// Create a semester. When `name` is omitted the next sequential name
/// ("Semester {n+1}") is used.
pub async fn run_semester_add(plan: &mut PlanStore, name: Option<&str>) -> Result<()> {
    let name = match name {
        Some(name) => name.to_owned(),
        None => plan.next_semester_name(),
    };

    match plan.add_semester(&name).await {
        Some(semester) => {
            println!("Created semester {} ({})", semester.name(), semester.semester_id());
            Ok(())
        }
        None => bail!("failed to create semester {name:?}"),
    }
}
