mod config;
mod course_cmds;
mod plan_cmds;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use courseplan_core::catalog::HttpCatalog;
use courseplan_core::plan::PlanStore;
use courseplan_core::store::HttpStore;
use courseplan_remote::config::RemoteConfig;

use config::PlanConfig;

#[derive(Parser)]
#[command(name = "courseplan", about = "Semester course planner backed by a remote store")]
struct Cli {
    /// Store URL (overrides COURSEPLAN_API_URL env var)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Catalog URL (overrides COURSEPLAN_CATALOG_URL env var)
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a courseplan config file
    Init {
        /// Remote store URL
        #[arg(long, default_value = RemoteConfig::DEFAULT_URL)]
        store_url: String,
        /// Api key sent as the x-api-key header
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show every semester and its courses
    Show,
    /// Semester management
    Semester {
        #[command(subcommand)]
        command: SemesterCommands,
    },
    /// Course management
    Course {
        #[command(subcommand)]
        command: CourseCommands,
    },
}

#[derive(Subcommand)]
enum SemesterCommands {
    /// Create a semester (defaults to the next "Semester {n}" name)
    Add {
        /// Semester display name
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum CourseCommands {
    /// Add a course to a semester and enrich it from the catalog
    Add {
        /// Semester ID to add into
        semester_id: String,
        /// Subject code (e.g. CS)
        subject: String,
        /// Catalog number (e.g. 1110)
        number: i32,
        /// Short course title
        title: String,
    },
    /// Remove a course from a semester
    Rm {
        /// Semester ID the course lives in
        semester_id: String,
        /// Course ID to remove
        course_id: String,
    },
    /// Flip a course's detail visibility
    Toggle {
        /// Semester ID the course lives in
        semester_id: String,
        /// Course ID to toggle
        course_id: String,
    },
    /// Replace a course's notes text
    Notes {
        /// Semester ID the course lives in
        semester_id: String,
        /// Course ID to annotate
        course_id: String,
        /// New notes text
        text: String,
    },
}

/// Execute the `courseplan init` command: write config file.
fn cmd_init(store_url: &str, api_key: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        store: config::StoreSection {
            url: store_url.to_owned(),
            api_key: api_key.map(str::to_owned),
        },
        catalog: config::CatalogSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  store.url = {store_url}");
    if api_key.is_some() {
        println!("  store.api_key = (set)");
    }

    Ok(())
}

/// Build the engine over HTTP adapters and load the whole plan.
async fn bootstrapped_plan(cfg: PlanConfig) -> PlanStore {
    let store = Arc::new(HttpStore::new(cfg.remote));
    let catalog = Arc::new(HttpCatalog::new(cfg.catalog));
    let mut plan = PlanStore::new(store, catalog);
    plan.bootstrap().await;
    plan
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            store_url,
            api_key,
            force,
        } => {
            cmd_init(&store_url, api_key.as_deref(), force)?;
        }
        Commands::Show => {
            let cfg = PlanConfig::resolve(cli.api_url.as_deref(), cli.catalog_url.as_deref());
            let plan = bootstrapped_plan(cfg).await;
            plan_cmds::run_show(&plan)?;
        }
        Commands::Semester { command } => {
            let cfg = PlanConfig::resolve(cli.api_url.as_deref(), cli.catalog_url.as_deref());
            let mut plan = bootstrapped_plan(cfg).await;
            match command {
                SemesterCommands::Add { name } => {
                    plan_cmds::run_semester_add(&mut plan, name.as_deref()).await?;
                }
            }
        }
        Commands::Course { command } => {
            let cfg = PlanConfig::resolve(cli.api_url.as_deref(), cli.catalog_url.as_deref());
            let plan = bootstrapped_plan(cfg).await;
            match command {
                CourseCommands::Add {
                    semester_id,
                    subject,
                    number,
                    title,
                } => {
                    course_cmds::run_add(&plan, &semester_id, &subject, number, &title).await?;
                }
                CourseCommands::Rm {
                    semester_id,
                    course_id,
                } => {
                    course_cmds::run_rm(&plan, &semester_id, &course_id).await?;
                }
                CourseCommands::Toggle {
                    semester_id,
                    course_id,
                } => {
                    course_cmds::run_toggle(&plan, &semester_id, &course_id).await?;
                }
                CourseCommands::Notes {
                    semester_id,
                    course_id,
                    text,
                } => {
                    course_cmds::run_notes(&plan, &semester_id, &course_id, &text).await?;
                }
            }
        }
    }

    Ok(())
}
