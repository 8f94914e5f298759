use anyhow::{bail, Context, Result};
use blockplan_core::time::parse_local_to_utc;
use blockplan_core::{
    ceil_to_quarter_hour, entries_to_ics, slots_between, sort_by_start, FixedEnergy,
    PlanOptions, PlanningKernel, ScheduleEntry, ScheduleInsights, Scheduler, Task,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

mod config;
mod import;
mod render;
mod state;

use crate::config::{load_config, Config};
use crate::state::JsonFileStore;

#[derive(Parser, Debug)]
#[command(name = "blockplan", version, about = "Greedy time-block planner")]
struct Cli {
    /// Config file (default: ~/.blockplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Ics,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign tasks to free slots
    Plan {
        /// Tasks file (.json or .csv)
        #[arg(long)]
        tasks: PathBuf,

        /// Slots file (.json)
        #[arg(long)]
        slots: PathBuf,

        /// Current energy 1-10 (default: planning.default_energy)
        #[arg(long)]
        energy: Option<i32>,

        /// Insert breaks into gaps (default: planning.insert_breaks)
        #[arg(long)]
        breaks: bool,

        /// Minimum gap/break length in minutes (default: scheduler.min_break_minutes)
        #[arg(long)]
        min_break: Option<i64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the schedule as JSON to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the score of every task in every slot
    Score {
        #[arg(long)]
        tasks: PathBuf,

        #[arg(long)]
        slots: PathBuf,

        #[arg(long)]
        energy: Option<i32>,
    },

    /// Re-run assignment over a saved schedule at a new energy level
    Optimize {
        /// Schedule file (.json)
        #[arg(long)]
        schedule: PathBuf,

        #[arg(long)]
        energy: Option<i32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Insert breaks into a saved schedule
    Breaks {
        #[arg(long)]
        schedule: PathBuf,

        /// Minimum gap/break length in minutes
        #[arg(long)]
        min: Option<i64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Summarize a saved schedule
    Insights {
        #[arg(long)]
        schedule: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Generate back-to-back slots for a window (JSON on stdout)
    Slots {
        /// Local start, "YYYY-MM-DD HH:MM"; rounded up to the quarter hour
        #[arg(long)]
        start: String,

        /// Local end, "YYYY-MM-DD HH:MM"
        #[arg(long)]
        end: String,

        /// Slot length (default: planning.slot_minutes)
        #[arg(long)]
        minutes: Option<i64>,

        #[arg(long, default_value_t = 5)]
        energy: i32,

        /// IANA zone (default: planning.timezone)
        #[arg(long)]
        tz: Option<String>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Plan against the per-user file store in ~/.blockplan/users
    Store {
        #[command(subcommand)]
        command: StoreCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Plan from users/<user>/{tasks,slots}.json and save schedule.json
    Plan {
        #[arg(long)]
        user: String,

        #[arg(long)]
        energy: Option<i32>,

        #[arg(long)]
        breaks: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// JSON shape for `plan --format json`.
#[derive(Serialize)]
struct PlanReport<'a> {
    energy_level: i32,
    entries: &'a [ScheduleEntry],
    unscheduled: &'a [Task],
    insights: &'a ScheduleInsights,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let display_tz = parse_tz(&cfg.planning.timezone)?;
    let scheduler = Scheduler::new(cfg.scheduler.clone());

    match cli.command {
        Command::Plan {
            tasks,
            slots,
            energy,
            breaks,
            min_break,
            format,
            out,
        } => {
            exists_or_bail(&tasks)?;
            exists_or_bail(&slots)?;
            let tasks = import::load_tasks(&tasks, &cfg.planning.timezone)?;
            let slots = import::load_slots(&slots)?;
            let energy = resolve_energy(energy, &cfg)?;
            info!(tasks = tasks.len(), slots = slots.len(), energy, "planning");

            let plan = scheduler.schedule_tasks_detailed(&tasks, &slots, energy);
            let mut entries = plan.entries;
            sort_by_start(&mut entries);
            if breaks || cfg.planning.insert_breaks {
                entries = scheduler.add_breaks(&entries, min_break);
            }
            let insights = scheduler.get_schedule_insights(&entries);

            if let Some(path) = out {
                state::write_json(&path, &entries)?;
                info!(path = %path.display(), "wrote schedule");
            }

            let report = PlanReport {
                energy_level: energy,
                entries: &entries,
                unscheduled: &plan.unscheduled,
                insights: &insights,
            };
            emit(format, &cfg, display_tz, &report)?;
        }

        Command::Score {
            tasks,
            slots,
            energy,
        } => {
            let tasks = import::load_tasks(&tasks, &cfg.planning.timezone)?;
            let mut slots = import::load_slots(&slots)?;
            slots.sort_by_key(|s| s.start_time);
            let energy = resolve_energy(energy, &cfg)?;
            print!(
                "{}",
                render::score_matrix_text(&scheduler, &tasks, &slots, energy, display_tz)
            );
        }

        Command::Optimize {
            schedule,
            energy,
            format,
        } => {
            let current = import::load_schedule(&schedule)?;
            let energy = resolve_energy(energy, &cfg)?;
            let mut entries = scheduler.optimize_schedule(&current, energy);
            sort_by_start(&mut entries);

            let dropped = blockplan_core::unscheduled_tasks(
                &current
                    .iter()
                    .filter(|e| !e.is_break())
                    .map(|e| e.task.clone())
                    .collect::<Vec<_>>(),
                &entries,
            );
            let insights = scheduler.get_schedule_insights(&entries);
            let report = PlanReport {
                energy_level: energy,
                entries: &entries,
                unscheduled: &dropped,
                insights: &insights,
            };
            emit(format, &cfg, display_tz, &report)?;
        }

        Command::Breaks {
            schedule,
            min,
            format,
        } => {
            let current = import::load_schedule(&schedule)?;
            let entries = scheduler.add_breaks(&current, min);
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
                OutputFormat::Ics => print!("{}", entries_to_ics(&entries, &cfg.planning.ics_prefix)),
                OutputFormat::Text => print!("{}", render::schedule_text(&entries, display_tz)),
            }
        }

        Command::Insights { schedule, json } => {
            let current = import::load_schedule(&schedule)?;
            let insights = scheduler.get_schedule_insights(&current);
            if json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
            } else {
                print!("{}", render::insights_text(&insights));
            }
        }

        Command::Slots {
            start,
            end,
            minutes,
            energy,
            tz,
        } => {
            let tz = tz.unwrap_or_else(|| cfg.planning.timezone.clone());
            let (start, end) = slot_window(&start, &end, &tz)?;
            let minutes = minutes.unwrap_or(cfg.planning.slot_minutes);
            if minutes <= 0 {
                bail!("slot length must be positive (got {minutes})");
            }
            let slots = slots_between(start, end, minutes, energy);
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => print!("{}", toml::to_string_pretty(&cfg)?),
        },

        Command::Store { command } => match command {
            StoreCommand::Plan {
                user,
                energy,
                breaks,
                format,
            } => {
                let energy = resolve_energy(energy, &cfg)?;
                let store = JsonFileStore::open_default()?;
                let schedule_path = store.schedule_path(&user);
                let mut kernel = PlanningKernel::new(scheduler, store, FixedEnergy(energy));

                let options = PlanOptions {
                    insert_breaks: breaks || cfg.planning.insert_breaks,
                    min_break_minutes: None,
                };
                let out = kernel.plan(&user, Utc::now(), options)?;

                let report = PlanReport {
                    energy_level: out.energy_level,
                    entries: &out.entries,
                    unscheduled: &out.unscheduled,
                    insights: &out.insights,
                };
                emit(format, &cfg, display_tz, &report)?;
                if format == OutputFormat::Text {
                    println!("\nSaved {}", schedule_path.display());
                }
            }
        },
    }

    Ok(())
}

fn emit(format: OutputFormat, cfg: &Config, tz: Tz, report: &PlanReport<'_>) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Ics => print!("{}", entries_to_ics(report.entries, &cfg.planning.ics_prefix)),
        OutputFormat::Text => {
            println!("# Schedule (energy {})\n", report.energy_level);
            print!("{}", render::schedule_text(report.entries, tz));
            print!("{}", render::unscheduled_text(report.unscheduled));
            println!();
            print!("{}", render::insights_text(report.insights));
        }
    }
    Ok(())
}

fn resolve_energy(flag: Option<i32>, cfg: &Config) -> Result<i32> {
    let energy = flag.unwrap_or(cfg.planning.default_energy);
    if !(1..=10).contains(&energy) {
        bail!("energy must be 1..=10 (got {energy})");
    }
    Ok(energy)
}

fn parse_tz(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone in config: {name}"))
}

/// Parse a local window, snapping the start up to the next quarter hour.
fn slot_window(start: &str, end: &str, tz: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = ceil_to_quarter_hour(parse_local_to_utc(start, tz)?);
    let end = parse_local_to_utc(end, tz)?;
    if end <= start {
        bail!("--end must be after --start (start rounds up to the quarter hour)");
    }
    Ok((start, end))
}

fn exists_or_bail(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("file not found: {} (pass a path to an existing file)", path.display());
    }
    Ok(())
}
