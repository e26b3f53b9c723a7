//! Command-line interface for gt
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::config::{Config, CONFIG_FILE};
use crate::engine::{Engine, TaskDefaults};
use crate::error::{Error, Result};
use crate::events::{EventDestination, EventSink};
use crate::output::OutputOptions;
use crate::storage::Storage;
use crate::store::FileStore;

mod daily;
mod goal;
mod init;
mod task;

/// gt - goals, nested tasks, dependencies and daily streaks
#[derive(Parser, Debug)]
#[command(name = "gt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Path to the store snapshot (overrides config)
    #[arg(long, global = true, env = "GOALTRACK_STORE")]
    pub store: Option<PathBuf>,

    /// Path to the config file (defaults to ./.goaltrack.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the per-user store instead of the working directory
    #[arg(long, global = true)]
    pub global: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit domain events as JSON lines ("-" for stdout, or a file path)
    #[arg(long, global = true, value_name = "DEST")]
    pub events: Option<String>,
}

impl GlobalOptions {
    pub fn events_to_stdout(&self) -> bool {
        matches!(
            EventDestination::parse(self.events.as_deref()),
            Some(EventDestination::Stdout)
        )
    }

    /// Output settings; event lines on stdout take over the channel.
    pub fn output(&self) -> OutputOptions {
        let events_to_stdout = self.events_to_stdout();
        OutputOptions {
            json: self.json && !events_to_stdout,
            quiet: self.quiet || events_to_stdout,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the store and a default config file
    Init,

    /// Goal management
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Daily completion tracking
    #[command(subcommand)]
    Daily(DailyCommands),
}

#[derive(Subcommand, Debug)]
pub enum GoalCommands {
    /// Create a goal
    New {
        title: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<String>,

        /// active, completed, paused or abandoned
        #[arg(long)]
        status: Option<String>,
    },

    /// List goals with progress
    #[command(alias = "ls")]
    List,

    /// Show a goal and its task tree
    Show {
        id: String,

        /// Hide done tasks in the tree
        #[arg(long)]
        hide_completed: bool,
    },

    /// Update goal fields
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,

        #[arg(long)]
        clear_category: bool,

        /// Target date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_target")]
        target: Option<String>,

        #[arg(long)]
        clear_target: bool,

        /// active, completed, paused or abandoned
        #[arg(long)]
        status: Option<String>,

        /// Override progress (0-100) until the next task change
        #[arg(long)]
        progress: Option<u8>,
    },

    /// Delete a goal and all of its tasks
    #[command(alias = "delete")]
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    New {
        title: String,

        /// Owning goal (omit for a standalone task)
        #[arg(long)]
        goal: Option<String>,

        /// Parent task in the same goal
        #[arg(long)]
        parent: Option<String>,

        /// Task that must be done first (repeatable)
        #[arg(long = "depends-on", value_name = "TASK")]
        depends_on: Vec<String>,

        #[arg(long)]
        description: Option<String>,

        /// todo, in_progress or done
        #[arg(long)]
        status: Option<String>,

        /// low, medium, high, critical or 0-3
        #[arg(long)]
        priority: Option<String>,

        /// easy, medium, hard or 1-3
        #[arg(long)]
        difficulty: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        sessions: Option<u32>,

        /// Position among siblings (defaults to last)
        #[arg(long)]
        order: Option<i64>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List the task tree of a goal (or standalone tasks)
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        goal: Option<String>,

        /// Include done tasks
        #[arg(long, conflicts_with = "hide_completed")]
        include_completed: bool,

        /// Hide done tasks
        #[arg(long)]
        hide_completed: bool,
    },

    /// Show a task with its blockers and subtasks
    Show { id: String },

    /// Update task fields
    Update {
        id: String,

        /// Require the task to belong to this goal
        #[arg(long)]
        goal: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        #[arg(long)]
        clear_description: bool,

        /// todo, in_progress or done
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        difficulty: Option<String>,

        /// Move under this parent
        #[arg(long, conflicts_with = "root")]
        parent: Option<String>,

        /// Move to the top level
        #[arg(long)]
        root: bool,

        /// Replace dependencies (repeatable)
        #[arg(long = "depends-on", value_name = "TASK", conflicts_with = "no_deps")]
        depends_on: Vec<String>,

        /// Remove all dependencies
        #[arg(long)]
        no_deps: bool,

        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        #[arg(long)]
        clear_due: bool,

        #[arg(long)]
        sessions: Option<u32>,

        #[arg(long)]
        order: Option<i64>,

        /// Replace tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Forget the first completion time
        #[arg(long)]
        clear_completed_at: bool,
    },

    /// Mark a task done
    Done {
        id: String,

        #[arg(long)]
        goal: Option<String>,
    },

    /// Move a done task back to todo (or in_progress)
    Reopen {
        id: String,

        #[arg(long)]
        goal: Option<String>,

        #[arg(long)]
        in_progress: bool,

        /// Forget the first completion time
        #[arg(long)]
        clear_completed_at: bool,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        id: String,

        #[arg(long)]
        goal: Option<String>,

        /// Delete the whole subtree instead of promoting children
        #[arg(long)]
        cascade: bool,
    },

    /// Set sibling order, optionally moving tasks
    Reorder {
        /// TASK=ORDER, TASK=ORDER@PARENT or TASK=ORDER@root
        #[arg(required = true)]
        entries: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DailyCommands {
    /// Show today's and yesterday's tasks
    View {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Day to treat as today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Completion rate per day and the current streak
    History {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Number of days (defaults to daily.history_days)
        #[arg(long)]
        days: Option<u32>,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Mark a task complete for a day
    Done {
        id: String,

        /// Completion day (YYYY-MM-DD, defaults to today)
        #[arg(long, conflicts_with = "undo")]
        date: Option<String>,

        /// Clear the completion date instead
        #[arg(long)]
        undo: bool,
    },
}

/// Which tasks daily commands look at (standalone by default)
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Only tasks of this goal
    #[arg(long, conflicts_with = "all")]
    pub goal: Option<String>,

    /// Every task, with or without a goal
    #[arg(long)]
    pub all: bool,
}

impl Cli {
    /// Label used in JSON envelopes, e.g. `task done`.
    pub fn command_name(&self) -> &'static str {
        match &self.command {
            Commands::Init => "init",
            Commands::Goal(cmd) => match cmd {
                GoalCommands::New { .. } => "goal new",
                GoalCommands::List => "goal list",
                GoalCommands::Show { .. } => "goal show",
                GoalCommands::Update { .. } => "goal update",
                GoalCommands::Rm { .. } => "goal rm",
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::New { .. } => "task new",
                TaskCommands::List { .. } => "task list",
                TaskCommands::Show { .. } => "task show",
                TaskCommands::Update { .. } => "task update",
                TaskCommands::Done { .. } => "task done",
                TaskCommands::Reopen { .. } => "task reopen",
                TaskCommands::Rm { .. } => "task rm",
                TaskCommands::Reorder { .. } => "task reorder",
            },
            Commands::Daily(cmd) => match cmd {
                DailyCommands::View { .. } => "daily view",
                DailyCommands::History { .. } => "daily history",
                DailyCommands::Done { .. } => "daily done",
            },
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = self.global;
        match self.command {
            Commands::Init => init::run(init::InitOptions { global }),
            Commands::Goal(cmd) => goal::run(cmd, global),
            Commands::Task(cmd) => task::run(cmd, global),
            Commands::Daily(cmd) => daily::run(cmd, global),
        }
    }
}

/// Resolved config, engine and event sink for one invocation
pub(crate) struct Context {
    pub config: Config,
    pub engine: Engine<FileStore>,
    sink: Option<EventSink>,
}

impl Context {
    pub fn open(global: &GlobalOptions) -> Result<Self> {
        let (config, storage) = resolve_storage(global)?;
        tracing::debug!(store = %storage.store_path().display(), "opening store");
        let store = FileStore::open_with_timeout(storage, config.store.lock_timeout_ms)?;
        let engine = Engine::with_defaults(store, TaskDefaults::from(&config.tasks));
        let sink = EventDestination::parse(global.events.as_deref())
            .map(|dest| dest.open())
            .transpose()?;
        Ok(Self {
            config,
            engine,
            sink,
        })
    }

    /// Write pending engine events; a failure becomes a warning.
    pub fn flush_events(&mut self) -> Option<String> {
        let events = self.engine.take_events();
        let sink = self.sink.as_mut()?;
        match sink.emit_all(&events) {
            Ok(()) => None,
            Err(err) => Some(format!("event output failed: {err}")),
        }
    }
}

/// Load config and decide where the store lives.
///
/// Precedence: `--store`/`GOALTRACK_STORE`, then `--global`, then
/// `store.path` from config, relative to the config file's directory.
pub(crate) fn resolve_storage(global: &GlobalOptions) -> Result<(Config, Storage)> {
    let cwd = std::env::current_dir()?;
    let (config, base) = match &global.config {
        Some(path) => {
            let config = Config::load(path)?;
            let base = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.clone());
            (config, base)
        }
        None => (Config::load_from_dir(&cwd)?, cwd.clone()),
    };

    let storage = if let Some(path) = &global.store {
        Storage::new(absolutize(&cwd, path))
    } else if global.global {
        Storage::global()?
    } else {
        Storage::new(absolutize(&base, &config.store.path))
    };
    Ok((config, storage))
}

pub(crate) fn config_path(global: &GlobalOptions) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Ok(std::env::current_dir()?.join(CONFIG_FILE)),
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
    })
}

/// `raw` as a date, or the local calendar day.
pub(crate) fn date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "gt", "--json", "task", "new", "Write", "--goal", "g-1", "--depends-on", "a",
            "--depends-on", "b",
        ])
        .expect("parse");
        assert!(cli.global.json);
        match cli.command {
            Commands::Task(TaskCommands::New {
                title, depends_on, ..
            }) => {
                assert_eq!(title, "Write");
                assert_eq!(depends_on, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn command_name_uses_canonical_subcommand() {
        let cli = Cli::try_parse_from(["gt", "task", "delete", "t-1", "--cascade"]).expect("parse");
        assert_eq!(cli.command_name(), "task rm");
        let cli = Cli::try_parse_from(["gt", "goal", "ls"]).expect("parse");
        assert_eq!(cli.command_name(), "goal list");
    }

    #[test]
    fn conflicting_flags_rejected() {
        let err = Cli::try_parse_from(["gt", "daily", "view", "--goal", "g", "--all"]);
        assert!(err.is_err());
        let err = Cli::try_parse_from(["gt", "task", "update", "t", "--parent", "p", "--root"]);
        assert!(err.is_err());
    }

    #[test]
    fn events_on_stdout_silence_normal_output() {
        let global = GlobalOptions {
            json: true,
            events: Some("-".to_string()),
            ..GlobalOptions::default()
        };
        let output = global.output();
        assert!(!output.json);
        assert!(output.quiet);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(
            parse_date("2024-02-29").expect("leap day"),
            NaiveDate::from_ymd_opt(2024, 2, 29).expect("date")
        );
        assert!(matches!(parse_date("yesterday"), Err(Error::Validation(_))));
    }

    #[test]
    fn store_flag_wins_over_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let global = GlobalOptions {
            store: Some(dir.path().join("custom.json")),
            ..GlobalOptions::default()
        };
        let (_, storage) = resolve_storage(&global).expect("resolve");
        assert_eq!(storage.store_path(), dir.path().join("custom.json"));
    }
}
