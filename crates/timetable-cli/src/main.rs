//! `timetable` CLI: book, check and list class schedules from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Book a class from a JSON file (or stdin when -i is omitted)
//! timetable create -i booking.json
//! echo '{"room":"101","faculty":"F-001",...}' | timetable create
//!
//! # Move booking 3, checking against everything but itself
//! timetable update --id 3 -i booking.json
//!
//! # Dry run: report the conflict a booking would hit, write nothing
//! timetable check -i booking.json
//!
//! # Remove booking 3
//! timetable delete --id 3
//!
//! # List bookings as JSON, or as a weekly timetable
//! timetable list --room 101 --term 2024-2025
//! timetable show --faculty F-001 --semester first
//!
//! # Resolve (or create) an academic year
//! timetable term 2025-2026
//!
//! # Name a resource for conflict messages
//! timetable label --axis faculty --ref F-001 "Ada Lovelace"
//!
//! # Use another store file and verbose logging
//! timetable --store /tmp/tt.json --log-level debug list
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use timetable_engine::{
    Axis, Config, Day, EntryId, MemoryRepository, ResourceRef, ScheduleFilter, ScheduleInput,
    Scheduler, Semester, StoreLock,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "timetable",
    version,
    about = "Conflict-checked university timetable booking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Schedule store (JSON snapshot); overrides the config file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file (defaults to ./timetable.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "timetable_engine=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Book a new class
    Create {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Replace an existing booking
    Update {
        /// Id of the booking to replace
        #[arg(long)]
        id: u64,
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Check a booking for conflicts without saving it
    Check {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Booking to leave out of the check (the one being edited)
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// Remove a booking
    Delete {
        #[arg(long)]
        id: u64,
    },
    /// List bookings as JSON
    List(FilterArgs),
    /// Print a weekly timetable
    Show(FilterArgs),
    /// Resolve an academic year label, creating it if needed
    Term { label: String },
    /// Register a display name for a room, faculty member or section
    Label {
        /// room, faculty or section
        #[arg(long)]
        axis: Axis,
        /// Resource reference as used in bookings
        #[arg(long = "ref")]
        resource: String,
        /// Display name
        name: String,
    },
}

impl Commands {
    /// Whether the command saves the store.
    fn writes(&self) -> bool {
        !matches!(
            self,
            Commands::Check { .. } | Commands::List(_) | Commands::Show(_)
        )
    }
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    faculty: Option<String>,
    #[arg(long)]
    room: Option<String>,
    #[arg(long)]
    section: Option<String>,
    /// Academic year label
    #[arg(long)]
    term: Option<String>,
    #[arg(long)]
    semester: Option<Semester>,
    /// Day code (SUN..SAT)
    #[arg(long)]
    day: Option<Day>,
}

impl FilterArgs {
    fn into_filter(self) -> ScheduleFilter {
        ScheduleFilter {
            faculty: self.faculty.map(ResourceRef::new),
            room: self.room.map(ResourceRef::new),
            section: self.section.map(ResourceRef::new),
            term_label: self.term,
            semester: self.semester,
            day: self.day,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::from_default_location().context("Failed to load timetable.toml")?,
    };
    init_logging(cli.log_level.as_deref(), &config.log.level)?;

    let store_path = cli.store.unwrap_or_else(|| config.store.path.clone());
    // Held until main returns: load, operate and save all run under the lock.
    let _lock = if cli.command.writes() {
        StoreLock::exclusive(&store_path)
    } else {
        StoreLock::shared(&store_path)
    }
    .with_context(|| format!("Failed to lock store: {}", store_path.display()))?;
    let repo = MemoryRepository::open(&store_path)
        .with_context(|| format!("Failed to open store: {}", store_path.display()))?;
    debug!(store = %store_path.display(), entries = repo.len(), "store opened");
    let scheduler = Scheduler::with_config(repo, config.engine);

    match cli.command {
        Commands::Create { input } => {
            let input = read_schedule_input(input.as_deref())?;
            let entry = scheduler.create_schedule(&input)?;
            save(&scheduler, &store_path)?;
            print_json(&entry)?;
        }
        Commands::Update { id, input } => {
            let input = read_schedule_input(input.as_deref())?;
            let entry = scheduler.update_schedule(EntryId(id), &input)?;
            save(&scheduler, &store_path)?;
            print_json(&entry)?;
        }
        Commands::Check { input, exclude } => {
            let input = read_schedule_input(input.as_deref())?;
            match scheduler.check_schedule(&input, exclude.map(EntryId))? {
                None => println!("No conflicts."),
                Some(conflict) => bail!(
                    "{}\nConflicts with entry {} ({} {} - {}).",
                    conflict,
                    conflict.existing.id,
                    conflict.existing.day,
                    conflict.existing.time_start,
                    conflict.existing.time_end
                ),
            }
        }
        Commands::Delete { id } => {
            let entry = scheduler.delete_schedule(EntryId(id))?;
            save(&scheduler, &store_path)?;
            print_json(&entry)?;
        }
        Commands::List(filter) => {
            let entries = scheduler.list_schedules(&filter.into_filter())?;
            print_json(&entries)?;
        }
        Commands::Show(filter) => {
            let week = scheduler.weekly_timetable(&filter.into_filter())?;
            if week.is_empty() {
                println!("No bookings.");
            } else {
                print!("{}", week.render());
            }
        }
        Commands::Term { label } => {
            let term = scheduler.resolve_term(&label)?;
            save(&scheduler, &store_path)?;
            print_json(&json!({ "id": term.id, "label": term.label }))?;
        }
        Commands::Label {
            axis,
            resource,
            name,
        } => {
            scheduler
                .repository()
                .register_label(axis, resource.as_str(), name.as_str());
            save(&scheduler, &store_path)?;
            println!("{} {} is now shown as \"{}\".", axis.title(), resource, name);
        }
    }

    Ok(())
}

/// `--log-level` wins over `RUST_LOG`, which wins over the config file.
fn init_logging(flag: Option<&str>, configured: &str) -> Result<()> {
    let filter = match flag {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log level: {}", directive))?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(configured)
                .with_context(|| format!("Invalid log level in config: {}", configured))?,
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn read_schedule_input(path: Option<&str>) -> Result<ScheduleInput> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse schedule input JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn save(scheduler: &Scheduler<MemoryRepository>, path: &Path) -> Result<()> {
    scheduler
        .repository()
        .save(path)
        .with_context(|| format!("Failed to save store: {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
