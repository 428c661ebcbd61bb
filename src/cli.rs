use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::clock::{Clock, SystemClock};
use crate::commands::{self, CommandCtx, CommandResult};
use crate::engine::ReminderEngine;
use crate::events::{StatePayload, EVENT_STATE_UPDATED};
use crate::models::{Priority, Timestamp};
use crate::notify::{DesktopNotifier, LogNotifier, Notifier};
use crate::scheduler::{start_scheduler, TokioScheduler};
use crate::state::TaskDraft;
use crate::storage::{load_or_seed_settings, FileStore, KeyValueStore, StorageError};
use crate::summary::{focus, group_by_period, progress, TaskFilter};
use crate::time::format_display;

pub const DATA_DIR_ENV_VAR: &str = "DAILY_CHECKLIST_DATA_DIR";
const APP_NAME: &str = "Daily Checklist";

#[derive(Parser)]
#[command(name = "daily-checklist", about = "Daily checklists with timed reminders", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the data slots and log files
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the reminder engine until interrupted
    Run,
    /// Show checklists and their tasks
    List,
    /// Create a checklist and make it active
    AddChecklist { name: String },
    /// Add a task to a checklist
    AddTask(AddTaskArgs),
    /// Toggle a task between pending and completed
    Toggle { checklist: String, task: String },
    /// Write a checklist to a JSON export file
    Export { checklist: String, path: PathBuf },
    /// Import a checklist from a JSON export file
    Import { path: PathBuf },
}

#[derive(Args)]
pub struct AddTaskArgs {
    /// Checklist id or name
    pub checklist: String,
    pub name: String,
    /// Scheduled time, HH:mm
    #[arg(long = "at")]
    pub at: Option<String>,
    #[arg(long, value_enum, default_value_t = PriorityArg::Normal)]
    pub priority: PriorityArg,
    /// Category id
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Minutes
    #[arg(long = "time-limit")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Normal,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Normal => Priority::Normal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no data directory; pass --data-dir or set {DATA_DIR_ENV_VAR}")]
    NoDataDir,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("logger: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
    #[error("runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("checklist not found: {0}")]
    UnknownChecklist(String),
    #[error("task not found: {0}")]
    UnknownTask(String),
    #[error("{0}")]
    Command(String),
}

/// `--data-dir`, then `DAILY_CHECKLIST_DATA_DIR`, then the platform data dir.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("daily-checklist"))
        .ok_or(CliError::NoDataDir)
}

struct CliCtx<'a> {
    engine: &'a ReminderEngine,
    data_dir: &'a Path,
}

impl CommandCtx for CliCtx<'_> {
    fn store(&self) -> &dyn KeyValueStore {
        self.engine.store()
    }

    fn now(&self) -> Timestamp {
        self.engine.clock().now_utc()
    }

    fn exports_dir(&self) -> Result<PathBuf, StorageError> {
        Ok(self.data_dir.join("exports"))
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        log::debug!(
            "{EVENT_STATE_UPDATED}: checklists={} active={:?}",
            payload.checklists.len(),
            payload.active_checklist_id
        );
        if let Some(line) = state_line(&payload) {
            println!("{line}");
        }
    }
}

/// One-line progress of the active checklist after a change.
fn state_line(payload: &StatePayload) -> Option<String> {
    let active = payload.active_checklist_id.as_deref()?;
    let checklist = payload.checklists.iter().find(|c| c.id == active)?;
    let summary = progress(checklist);
    Some(format!(
        "{}: {}/{} done ({}%)",
        checklist.name, summary.completed, summary.total, summary.percent
    ))
}

fn into_result<T>(result: CommandResult<T>) -> Result<T, CliError> {
    match (result.ok, result.data) {
        (true, Some(data)) => Ok(data),
        _ => Err(CliError::Command(
            result.error.unwrap_or_else(|| "command failed".to_string()),
        )),
    }
}

pub fn execute(cli: Cli) -> Result<(), CliError> {
    let data_dir = resolve_data_dir(cli.data_dir)?;
    let store = FileStore::new(data_dir.clone());
    store.ensure_dirs()?;
    #[cfg(not(test))]
    let _logger = crate::logging::init_logging(&data_dir)?;

    let notifier: Arc<dyn Notifier> = match cli.command {
        Commands::Run => Arc::new(DesktopNotifier::new(APP_NAME)),
        _ => Arc::new(LogNotifier),
    };
    let settings = load_or_seed_settings(&store)?;
    let engine = ReminderEngine::bootstrap(Arc::new(store), notifier, Arc::new(SystemClock));
    let ctx = CliCtx {
        engine: &engine,
        data_dir: &data_dir,
    };
    let state = engine.state();

    match cli.command {
        Commands::Run => run_engine(&engine, &settings),
        Commands::List => {
            print_checklists(&engine);
            Ok(())
        }
        Commands::AddChecklist { name } => {
            let checklist = into_result(commands::add_checklist(&ctx, state, &name))?;
            println!("{} {}", checklist.id, checklist.name);
            Ok(())
        }
        Commands::AddTask(args) => {
            let checklist_id = commands::resolve_checklist(state, &args.checklist)
                .ok_or_else(|| CliError::UnknownChecklist(args.checklist.clone()))?;
            let draft = TaskDraft {
                name: args.name,
                scheduled_time: args.at,
                category_id: args.category,
                priority: args.priority.into(),
                notes: args.notes,
                time_limit: args.time_limit,
            };
            let task = into_result(commands::add_task(&ctx, state, &checklist_id, draft))?;
            println!("{} {}", task.id, task.name);
            Ok(())
        }
        Commands::Toggle { checklist, task } => {
            let checklist_id = commands::resolve_checklist(state, &checklist)
                .ok_or(CliError::UnknownChecklist(checklist))?;
            let task_id = commands::resolve_task(state, &checklist_id, &task)
                .ok_or(CliError::UnknownTask(task))?;
            let task = into_result(commands::toggle_task_status(&ctx, state, &checklist_id, &task_id))?;
            let mark = if task.is_completed() { "x" } else { " " };
            println!("[{mark}] {}", task.name);
            Ok(())
        }
        Commands::Export { checklist, path } => {
            let checklist_id = commands::resolve_checklist(state, &checklist)
                .ok_or(CliError::UnknownChecklist(checklist))?;
            let written = into_result(commands::export_checklist(&ctx, state, &checklist_id, Some(path)))?;
            println!("{written}");
            Ok(())
        }
        Commands::Import { path } => {
            into_result(commands::import_checklist_file(&ctx, state, path))?;
            if let Some(checklist) = state.active_checklist() {
                println!("{} {}", checklist.id, checklist.name);
            }
            Ok(())
        }
    }
}

fn run_engine(engine: &ReminderEngine, settings: &crate::models::Settings) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        if !engine.notifier().request_permission() {
            log::warn!("cli: notifications unavailable, reminders will be skipped");
        }
        let mut scheduler = TokioScheduler::current()?;
        let timers = start_scheduler(engine, &mut scheduler, settings);
        tokio::signal::ctrl_c().await?;
        log::info!("cli: interrupted, shutting down");
        timers.stop(&mut scheduler);
        Ok::<(), CliError>(())
    })
}

fn print_checklists(engine: &ReminderEngine) {
    let state = engine.state();
    let active = state.active_checklist_id();
    let now = engine.clock().now();
    for checklist in state.checklists() {
        let summary = progress(&checklist);
        let marker = if active.as_deref() == Some(checklist.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {} ({}/{} done, {}%) {}",
            checklist.name, summary.completed, summary.total, summary.percent, checklist.id
        );
        let focused = focus(&checklist.tasks, now);
        let view = group_by_period(&checklist.tasks, &TaskFilter::default());
        for group in &view.groups {
            println!("    {}", group.period.label());
            for task in &group.tasks {
                let time = task.scheduled_time.as_deref().map(format_display);
                print_task(task, time.as_deref(), &focused);
            }
        }
        if !view.untimed.is_empty() {
            println!("    Anytime");
            for task in &view.untimed {
                print_task(task, None, &focused);
            }
        }
    }
}

fn print_task(task: &crate::models::Task, time: Option<&str>, focused: &crate::summary::Focus) {
    let mark = if task.is_completed() { "x" } else { " " };
    let hint = if focused.current.as_deref() == Some(task.id.as_str()) {
        " <- now"
    } else if focused.upcoming.contains(&task.id) {
        " <- next"
    } else {
        ""
    };
    let priority = match task.priority {
        Priority::Normal => String::new(),
        other => format!(" !{}", other.label()),
    };
    println!(
        "      [{mark}] {:>8} {}{priority}{hint}",
        time.unwrap_or(""),
        task.name
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_task_with_options() {
        let cli = Cli::try_parse_from([
            "daily-checklist",
            "--data-dir",
            "/tmp/dc",
            "add-task",
            "Work",
            "Standup",
            "--at",
            "09:00",
            "--priority",
            "high",
            "--time-limit",
            "15",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/dc")));
        let Commands::AddTask(args) = cli.command else {
            panic!("expected add-task");
        };
        assert_eq!(args.checklist, "Work");
        assert_eq!(args.at.as_deref(), Some("09:00"));
        assert_eq!(Priority::from(args.priority), Priority::High);
        assert_eq!(args.time_limit, Some(15));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/srv/checklists"))).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/checklists"));
    }

    #[test]
    fn state_line_reports_active_checklist_progress() {
        let state = crate::state::AppState::empty();
        let now = SystemClock.now_utc();
        assert_eq!(state_line(&commands::state_payload(&state)), None);

        let checklist = state.add_checklist("Work", now);
        for name in ["Standup", "Review"] {
            let draft = TaskDraft {
                name: name.to_string(),
                ..TaskDraft::default()
            };
            state.add_task(&checklist.id, draft, now).unwrap();
        }
        let first = state.checklist(&checklist.id).unwrap().tasks[0].id.clone();
        state.toggle_task_status(&checklist.id, &first, now).unwrap();

        assert_eq!(
            state_line(&commands::state_payload(&state)).as_deref(),
            Some("Work: 1/2 done (50%)")
        );
    }

    #[test]
    fn rejects_unknown_priority() {
        assert!(Cli::try_parse_from(["daily-checklist", "add-task", "a", "b", "--priority", "urgent"]).is_err());
    }
}
