use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

use jobtrackr::config::Config;
use jobtrackr::error::ParseError;
use jobtrackr::models::{parse_date, ApplicationStatus, JobApplication, WorkType};
use jobtrackr::store::{ApplicationPatch, ApplicationStore, NewApplication};
use jobtrackr::tui::{self, truncate};
use jobtrackr::view::{compute_visible_applications, paginate, FilterCriteria, SortDirection, SortKey};
use jobtrackr::telemetry;

#[derive(Parser)]
#[command(name = "jobtrackr")]
#[command(about = "Track and manage your job applications in one place")]
struct Cli {
    /// Applications file (defaults to $JOBTRACKR_DATA or the user data directory)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List applications, filtered and sorted
    List {
        /// Case-insensitive text to find in company or position
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Only these work types (remote, hybrid, on-site); repeatable
        #[arg(short, long = "work-type")]
        work_type: Vec<WorkType>,

        /// Only these statuses (applied, interview, rejected, offer); repeatable
        #[arg(short, long)]
        status: Vec<ApplicationStatus>,

        /// Sort by date, company or status
        #[arg(long, default_value = "date")]
        sort: SortKey,

        /// Ascending order (default is descending)
        #[arg(long, conflicts_with = "desc")]
        asc: bool,

        /// Descending order
        #[arg(long)]
        desc: bool,

        /// Page to show, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page (defaults to $JOBTRACKR_PAGE_SIZE or 10)
        #[arg(long)]
        per_page: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one application
    Show {
        /// Application ID
        id: String,
    },

    /// Record a new application
    Add {
        #[arg(short, long)]
        company: String,

        #[arg(long)]
        position: String,

        /// Date applied (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long = "work-type", default_value = "remote")]
        work_type: WorkType,

        #[arg(short, long, default_value = "applied")]
        status: ApplicationStatus,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Change fields of an application
    Edit {
        /// Application ID
        id: String,

        #[arg(short, long)]
        company: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long = "work-type")]
        work_type: Option<WorkType>,

        #[arg(short, long)]
        status: Option<ApplicationStatus>,

        /// New notes; pass an empty string to clear them
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,
    },

    /// Load the sample applications
    Seed {
        /// Replace existing applications
        #[arg(long)]
        force: bool,
    },

    /// Interactive browser with live filters
    Browse,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.data)?;
    telemetry::init(&config)?;
    debug!(data_file = %config.data_file.display(), "resolved configuration");

    let mut store = ApplicationStore::load(&config.data_file)
        .with_context(|| format!("Failed to load {}", config.data_file.display()))?;

    match cli.command {
        Commands::List {
            search,
            work_type,
            status,
            sort,
            asc,
            desc: _,
            page,
            per_page,
            json,
        } => {
            let criteria = FilterCriteria {
                search_text: search.unwrap_or_default(),
                work_types: work_type.into_iter().collect::<BTreeSet<_>>(),
                statuses: status.into_iter().collect::<BTreeSet<_>>(),
                sort_key: sort,
                sort_direction: if asc {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                },
            };
            let visible = compute_visible_applications(store.all(), &criteria);
            let page = paginate(&visible, page, per_page.unwrap_or(config.page_size));

            if json {
                println!("{}", serde_json::to_string_pretty(&page.items)?);
            } else if page.items.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<6} {:<12} {:<22} {:<24} {:<9} {:<10}",
                    "ID", "APPLIED", "COMPANY", "POSITION", "WORK", "STATUS"
                );
                println!("{}", "-".repeat(88));
                for app in &page.items {
                    println!(
                        "{:<6} {:<12} {:<22} {:<24} {:<9} {:<10}",
                        truncate(&app.id, 6),
                        truncate(&app.date_applied, 12),
                        truncate(&app.company, 20),
                        truncate(&app.position, 22),
                        app.work_type.label(),
                        app.status.label()
                    );
                }
                println!(
                    "\nPage {} of {} ({} matching of {})",
                    page.page,
                    page.total_pages,
                    page.total_items,
                    store.len()
                );
            }
        }

        Commands::Show { id } => match store.get(&id) {
            Some(app) => print_application(app),
            None => println!("Application '{}' not found.", id),
        },

        Commands::Add {
            company,
            position,
            date,
            work_type,
            status,
            notes,
        } => {
            let date_applied = match date {
                Some(raw) => checked_date(&raw)?,
                None => chrono::Local::now().date_naive().format("%Y-%m-%d").to_string(),
            };
            let id = store.add(NewApplication {
                company,
                position,
                date_applied,
                work_type,
                status,
                notes,
            })?;
            save(&store, &config)?;
            println!("Added application #{}", id);
        }

        Commands::Edit {
            id,
            company,
            position,
            date,
            work_type,
            status,
            notes,
        } => {
            let patch = ApplicationPatch {
                company,
                position,
                date_applied: date.as_deref().map(checked_date).transpose()?,
                work_type,
                status,
                notes: notes.map(Some),
            };
            let updated = store.update(&id, patch)?.clone();
            save(&store, &config)?;
            print_application(&updated);
        }

        Commands::Delete { id } => {
            let removed = store.remove(&id)?;
            save(&store, &config)?;
            println!("Deleted #{} ({} at {})", removed.id, removed.position, removed.company);
        }

        Commands::Seed { force } => {
            if !store.is_empty() && !force {
                return Err(anyhow!(
                    "{} already holds {} application(s). Use --force to replace them.",
                    config.data_file.display(),
                    store.len()
                ));
            }
            let seeded = ApplicationStore::seed_demo();
            save(&seeded, &config)?;
            println!("Seeded {} applications into {}", seeded.len(), config.data_file.display());
        }

        Commands::Browse => {
            if store.is_empty() {
                println!("No applications yet. Add one or run 'jobtrackr seed'.");
                return Ok(());
            }
            tui::run_browse(store, &config.data_file, config.page_size)?;
        }
    }

    Ok(())
}

fn checked_date(raw: &str) -> Result<String, ParseError> {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ParseError::Date(raw.to_string()))
}

fn save(store: &ApplicationStore, config: &Config) -> Result<()> {
    store
        .save(&config.data_file)
        .with_context(|| format!("Failed to write {}", config.data_file.display()))
}

fn print_application(app: &JobApplication) {
    println!("Application #{}", app.id);
    println!("Company:   {}", app.company);
    println!("Position:  {}", app.position);
    match app.applied_on() {
        Some(date) => println!("Applied:   {}", date.format("%Y-%m-%d")),
        None => println!("Applied:   {} (unreadable date)", app.date_applied),
    }
    println!("Work type: {}", app.work_type);
    println!("Status:    {}", app.status);
    if let Some(notes) = &app.notes {
        println!("\n--- Notes ---\n{}", notes);
    }
}
