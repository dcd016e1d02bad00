//! Operator CLI for the lab dashboard store.
//!
//! Opens the configured store, bootstraps schema and seed rows, and prints
//! query results as JSON envelopes.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dashboard_core::model::work::WorkStatus;
use dashboard_core::repo::alert_repo::{AlertListQuery, AlertSort};
use dashboard_core::repo::note_repo::{NoteListQuery, NoteSort};
use dashboard_core::repo::planning_repo::{PlanningListQuery, PlanningSort};
use dashboard_core::repo::query::{SortColumn, SortOrder};
use dashboard_core::repo::user_repo::UserListQuery;
use dashboard_core::repo::warehouse_repo::{WarehouseListQuery, WarehouseSort};
use dashboard_core::repo::work_repo::{WorkListQuery, WorkSort};
use dashboard_core::{
    init_logging, ApiEnvelope, DashboardConfig, DashboardService, FileBrowser, LoggingConfig,
    Store, ValidationError,
};
use log::info;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(version)]
#[command(about = "Lab dashboard store maintenance and queries", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database file (overrides config and environment)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Root directory for `files` (overrides config and environment)
    #[arg(long)]
    files_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create tables, seed empty ones and print row counts
    Init,

    /// List alerts
    Alerts {
        #[arg(long)]
        unread: bool,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
        /// Sort as `<column> [asc|desc]`
        #[arg(long)]
        sort: Option<String>,
    },

    /// List works
    Works {
        /// pending, in_progress or completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        assigned_to: Option<String>,
        #[arg(long)]
        overdue: bool,
        #[arg(long)]
        sort: Option<String>,
    },

    /// List notes
    Notes {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        alerts: bool,
        #[arg(long)]
        planning: bool,
        #[arg(long)]
        sort: Option<String>,
    },

    /// List planning items
    Planning {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
    },

    /// List warehouse items
    Warehouse {
        #[arg(long)]
        search: Option<String>,
        /// Only items at or below this quantity
        #[arg(long)]
        max_quantity: Option<i64>,
        #[arg(long)]
        sort: Option<String>,
    },

    /// List users
    Users {
        /// Include inactive accounts
        #[arg(long)]
        all: bool,
    },

    /// Read or write key/value configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List a directory below the files root
    Files {
        #[arg(long)]
        dir: Option<String>,
        /// Comma separated extensions, e.g. `jpg,png`
        #[arg(long = "type")]
        file_types: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Get { key: String },
    Set { key: String, value: String },
    List,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Falls back to plain text only if the envelope itself cannot be encoded.
            if print_json(&ApiEnvelope::<()>::error(format!("{err:#}"))).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = DashboardConfig::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(files_root) = args.files_root {
        config.files_root = files_root;
    }

    init_logging(&LoggingConfig {
        level: config.log_level.clone(),
        log_dir: config.log_dir.clone(),
    })?;

    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open store `{}`", config.db_path.display()))?;
    let service = DashboardService::new(store);
    let report = service.initialize().context("failed to initialize store")?;

    match args.command {
        Commands::Init => {
            let counts = service
                .table_counts()?
                .into_iter()
                .map(|(table, count)| (table.to_string(), json!(count)))
                .collect::<serde_json::Map<_, _>>();
            info!(
                "event=cli_init module=cli status=ok db_path={}",
                config.db_path.display()
            );
            print_json(&ApiEnvelope::ok(json!({
                "db_path": config.db_path.display().to_string(),
                "seeded": report.seeded_tables(),
                "failed": report.failed_tables(),
                "counts": counts,
            })))
        }
        Commands::Alerts {
            unread,
            priority,
            limit,
            sort,
        } => {
            let mut query = AlertListQuery {
                unread_only: unread,
                priority,
                limit,
                ..AlertListQuery::default()
            };
            query.order = parse_sort::<AlertSort>(sort.as_deref(), query.order)?;
            print_list(service.list_alerts(&query))
        }
        Commands::Works {
            status,
            priority,
            assigned_to,
            overdue,
            sort,
        } => {
            let mut query = WorkListQuery {
                status: status.as_deref().map(str::parse::<WorkStatus>).transpose()?,
                priority,
                assigned_to,
                overdue_only: overdue,
                ..WorkListQuery::default()
            };
            query.order = parse_sort::<WorkSort>(sort.as_deref(), query.order)?;
            print_list(service.list_works(&query))
        }
        Commands::Notes {
            search,
            alerts,
            planning,
            sort,
        } => {
            let mut query = NoteListQuery {
                search,
                alerts_only: alerts,
                planning_only: planning,
                ..NoteListQuery::default()
            };
            query.order = parse_sort::<NoteSort>(sort.as_deref(), query.order)?;
            print_list(service.list_notes(&query))
        }
        Commands::Planning { search, sort } => {
            let mut query = PlanningListQuery {
                search,
                ..PlanningListQuery::default()
            };
            query.order = parse_sort::<PlanningSort>(sort.as_deref(), query.order)?;
            print_list(service.list_planning(&query))
        }
        Commands::Warehouse {
            search,
            max_quantity,
            sort,
        } => {
            let mut query = WarehouseListQuery {
                search,
                max_quantity,
                ..WarehouseListQuery::default()
            };
            query.order = parse_sort::<WarehouseSort>(sort.as_deref(), query.order)?;
            print_list(service.list_warehouse(&query))
        }
        Commands::Users { all } => print_list(service.list_users(&UserListQuery {
            active_only: !all,
        })),
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => match service.get_config(&key)? {
                Some(value) => print_json(&ApiEnvelope::ok(json!({ "key": key, "value": value }))),
                None => bail!("config key `{key}` not found"),
            },
            ConfigAction::Set { key, value } => {
                service.set_config(&key, &value)?;
                print_json(&ApiEnvelope::ok(json!({ "key": key, "value": value })))
            }
            ConfigAction::List => print_list(service.list_config_entries()),
        },
        Commands::Files { dir, file_types } => {
            let browser = FileBrowser::new(&config.files_root)?;
            let listing = browser.list(dir.as_deref(), file_types.as_deref())?;
            print_json(&ApiEnvelope::ok(listing))
        }
    }
}

fn parse_sort<C>(raw: Option<&str>, default: SortOrder<C>) -> Result<SortOrder<C>>
where
    C: SortColumn + FromStr<Err = ValidationError>,
{
    match raw {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(default),
    }
}

fn print_list<T: Serialize>(items: Vec<T>) -> Result<()> {
    print_json(&ApiEnvelope::list(items))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
