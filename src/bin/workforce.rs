//! workforce CLI: operator interface to a ledger snapshot file.
//!
//! Every invocation loads the snapshot, runs one command, and saves the
//! snapshot back if the command changed anything.

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use workforce_ledger::config::Config;
use workforce_ledger::model::{DateRange, NewWorker, Session, Worker, WorkerPatch};
use workforce_ledger::query::ReportFilter;
use workforce_ledger::roster::Roster;
use workforce_ledger::storage::Storage;
use workforce_ledger::telemetry::{TelemetryConfig, init_telemetry};
use workforce_ledger::{Ledger, SystemClock};

#[derive(Parser)]
#[command(name = "workforce", about = "Track workers and their shifts")]
struct Cli {
    /// Snapshot file (overrides WORKFORCE_LEDGER_PATH)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Worker registry operations
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
    /// Clock a worker in or out
    Clock {
        #[command(subcommand)]
        action: ClockAction,
    },
    /// List sessions, most recent first
    Sessions {
        /// Only this worker's sessions
        worker: Option<String>,
        /// Only open sessions
        #[arg(long)]
        open: bool,
    },
    /// Workers grouped by location
    Locations,
    /// Total closed-session hours for one worker
    Hours {
        worker: String,
        /// First clock-in date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last clock-in date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Hours and session counts per worker
    Report {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Only this worker
        #[arg(long)]
        worker: Option<String>,
    },
    /// Register workers from a TOML roster
    Import {
        /// Roster file with [[worker]] tables
        #[arg(required_unless_present = "sample")]
        path: Option<PathBuf>,
        /// Import the built-in sample roster instead
        #[arg(long, conflicts_with = "path")]
        sample: bool,
    },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// Register a new worker
    Register {
        /// Unique id (e.g. TRN)
        id: String,
        name: String,
        company: String,
        location: String,
    },
    /// Change a worker's details
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete a worker and all of their sessions
    Delete { id: String },
    /// Show one worker with status and totals
    Show { id: String },
    /// List all workers
    List,
    /// Search id, name, company and location
    Search { query: String },
}

#[derive(Subcommand)]
enum ClockAction {
    /// Start a shift
    In {
        worker: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// End the open shift
    Out {
        worker: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show whether a worker is clocked in
    Status { worker: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "workforce".to_string(),
        level: config.log_level.clone(),
    })?;

    let storage = Storage::new(cli.ledger.unwrap_or(config.ledger_path));
    let snapshot = storage
        .load()
        .with_context(|| format!("loading {}", storage.path().display()))?;
    let mut ledger = Ledger::from_snapshot(snapshot, SystemClock)?;

    let changed = run(&mut ledger, cli.command)?;
    if changed {
        storage
            .save(&ledger.snapshot())
            .with_context(|| format!("saving {}", storage.path().display()))?;
    }
    Ok(())
}

/// Run one command. Returns whether the ledger changed.
fn run(ledger: &mut Ledger, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Worker { action } => run_worker(ledger, action),
        Command::Clock { action } => run_clock(ledger, action),
        Command::Sessions { worker, open } => {
            let sessions: Vec<Session> = match (worker, open) {
                (Some(id), true) => ledger.open_session(&id).into_iter().collect(),
                (Some(id), false) => ledger.sessions_of(&id),
                (None, true) => ledger.open_sessions(),
                (None, false) => ledger.all_sessions(),
            };
            print_sessions(&sessions);
            Ok(false)
        }
        Command::Locations => {
            let groups = ledger.group_by_location();
            if groups.is_empty() {
                println!("No workers registered.");
            }
            for (location, workers) in groups {
                println!("{location} ({})", workers.len());
                for w in workers {
                    println!("  {:<12}  {:<24}  {}", w.id, w.name, ledger.status_of(&w.id));
                }
            }
            Ok(false)
        }
        Command::Hours { worker, from, to } => {
            if !ledger.contains(&worker) {
                anyhow::bail!("no worker with id '{worker}'");
            }
            let hours = ledger.aggregate_hours(&worker, Some(DateRange::new(from, to)));
            println!("{hours:.2}");
            Ok(false)
        }
        Command::Report { from, to, worker } => {
            let report = ledger.report(&ReportFilter {
                range: DateRange::new(from, to),
                worker,
            })?;
            println!(
                "{:<12}  {:<24}  {:>8}  {:>9}  {:>6}  STATUS",
                "ID", "NAME", "HOURS", "COMPLETED", "ACTIVE"
            );
            println!("{}", "-".repeat(80));
            for row in &report.rows {
                println!(
                    "{:<12}  {:<24}  {:>8.1}  {:>9}  {:>6}  {}",
                    row.worker.id,
                    row.worker.name,
                    row.total_hours,
                    row.completed_sessions,
                    row.active_sessions,
                    row.status
                );
            }
            println!(
                "\nTotal: {:.1}h over {} completed session(s), {} active",
                report.total_hours, report.completed_sessions, report.active_sessions
            );
            Ok(false)
        }
        Command::Import { path, sample } => {
            let roster = match path {
                Some(path) if !sample => Roster::from_path(&path)?,
                _ => Roster::sample(),
            };
            let workers = roster.import_into(ledger)?;
            println!("Imported {} worker(s).", workers.len());
            Ok(!workers.is_empty())
        }
    }
}

fn run_worker(ledger: &mut Ledger, action: WorkerAction) -> anyhow::Result<bool> {
    match action {
        WorkerAction::Register {
            id,
            name,
            company,
            location,
        } => {
            let worker = ledger.register(NewWorker::new(id, name, company, location))?;
            println!("Registered {} ({})", worker.name, worker.id);
            Ok(true)
        }
        WorkerAction::Update {
            id,
            name,
            company,
            location,
        } => {
            let mut patch = WorkerPatch::new();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(company) = company {
                patch = patch.company(company);
            }
            if let Some(location) = location {
                patch = patch.location(location);
            }
            if patch.is_empty() {
                anyhow::bail!("nothing to update: pass --name, --company or --location");
            }
            let worker = ledger.update(&id, patch)?;
            println!("Updated {} ({})", worker.name, worker.id);
            Ok(true)
        }
        WorkerAction::Delete { id } => {
            if !ledger.delete(&id) {
                anyhow::bail!("no worker with id '{id}'");
            }
            println!("Deleted {id}");
            Ok(true)
        }
        WorkerAction::Show { id } => {
            let o = ledger.overview(&id)?;
            println!("ID:          {}", o.worker.id);
            println!("Name:        {}", o.worker.name);
            println!("Company:     {}", o.worker.company);
            println!("Location:    {}", o.worker.location);
            println!("Status:      {}", o.status);
            if let Some(since) = o.clocked_in_since {
                println!("Since:       {}", fmt_time(since));
            }
            println!(
                "Last Out:    {}",
                o.last_clock_out.map(fmt_time).unwrap_or_else(|| "-".into())
            );
            println!("Total Hours: {:.2}", o.total_hours);
            println!("Completed:   {}", o.completed_sessions);
            println!("Registered:  {}", fmt_time(o.worker.created_at));
            println!("Updated:     {}", fmt_time(o.worker.updated_at));
            Ok(false)
        }
        WorkerAction::List => {
            let workers = ledger.list_all();
            print_workers(ledger, &workers);
            Ok(false)
        }
        WorkerAction::Search { query } => {
            let workers = ledger.search(&query);
            print_workers(ledger, &workers);
            Ok(false)
        }
    }
}

fn run_clock(ledger: &mut Ledger, action: ClockAction) -> anyhow::Result<bool> {
    match action {
        ClockAction::In { worker, notes } => {
            let session = ledger.clock_in(&worker, notes.as_deref())?;
            println!("{worker} clocked in at {}", fmt_time(session.clock_in));
            Ok(true)
        }
        ClockAction::Out { worker, notes } => {
            let session = ledger.clock_out(&worker, notes.as_deref())?;
            let worked = session
                .duration()
                .map(|d| d.to_string())
                .unwrap_or_default();
            println!("{worker} clocked out ({worked})");
            Ok(true)
        }
        ClockAction::Status { worker } => {
            if !ledger.contains(&worker) {
                anyhow::bail!("no worker with id '{worker}'");
            }
            println!("{}", ledger.status_of(&worker));
            Ok(false)
        }
    }
}

fn print_workers(ledger: &Ledger, workers: &[Worker]) {
    if workers.is_empty() {
        println!("No workers found.");
        return;
    }

    println!(
        "{:<12}  {:<24}  {:<24}  {:<16}  STATUS",
        "ID", "NAME", "COMPANY", "LOCATION"
    );
    println!("{}", "-".repeat(96));
    for w in workers {
        println!(
            "{:<12}  {:<24}  {:<24}  {:<16}  {}",
            w.id,
            w.name,
            w.company,
            w.location,
            ledger.status_of(&w.id)
        );
    }
    println!("\n{} worker(s)", workers.len());
}

fn print_sessions(sessions: &[Session]) {
    if sessions.is_empty() {
        println!("No sessions found.");
        return;
    }

    println!(
        "{:<8}  {:<12}  {:<16}  {:<16}  {:<9}  NOTES",
        "ID", "WORKER", "IN", "OUT", "DURATION"
    );
    println!("{}", "-".repeat(96));
    for s in sessions {
        println!(
            "{:<8}  {:<12}  {:<16}  {:<16}  {:<9}  {}",
            s.id.to_string(),
            s.worker_id,
            fmt_time(s.clock_in),
            s.clock_out.map(fmt_time).unwrap_or_else(|| "-".into()),
            s.duration()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "active".into()),
            s.notes.as_deref().unwrap_or("")
        );
    }
}

fn fmt_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}
