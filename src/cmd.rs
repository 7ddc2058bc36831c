//! Command implementations for the CLI interface.
//!
//! This module contains the command handlers for every subcommand, from the
//! basic CRUD operations through the notification toggle and the AI
//! workload analysis.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::ai::{self, AnalyzeConfig};
use crate::config::Config;
use crate::fields::{DateRange, Priority, SortOrder, Status};
use crate::notify::{ConsoleNotifier, Notifier, NotifyState, Permission};
use crate::store::{TaskDraft, TaskStore};
use crate::task::{SubTask, Task};
use crate::view::{self, TaskQuery};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Who assigned the task.
        #[arg(long)]
        assigner: Option<String>,
        /// Date the task was assigned (defaults to today).
        #[arg(long)]
        assigned: Option<String>,
        /// Due date ("2024-05-25", "tomorrow", "in 3d", "friday").
        #[arg(long)]
        due: String,
        /// Importance level.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Initial status.
        #[arg(long, value_enum, default_value_t = Status::NotStarted)]
        status: Status,
        /// Checklist item; repeat for several.
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },

    /// List tasks with filtering and sorting.
    List {
        /// Only tasks with this status.
        #[arg(long)]
        status: Option<Status>,
        /// Only tasks with this priority.
        #[arg(long)]
        priority: Option<Priority>,
        /// Due-date window.
        #[arg(long, value_enum, default_value_t)]
        range: DateRange,
        /// Case-insensitive substring match on title or description.
        #[arg(long, default_value = "")]
        search: String,
        /// Sort order.
        #[arg(long, value_enum, default_value_t)]
        sort: SortOrder,
    },

    /// Show one task in full, including its checklist.
    View {
        /// Task id or title.
        id: String,
    },

    /// Edit a task; fields not given keep their current value.
    Edit {
        /// Task id or title.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        assigner: Option<String>,
        #[arg(long)]
        assigned: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Change a task's status.
    Status {
        /// Task id or title.
        id: String,
        #[arg(value_enum)]
        status: Status,
    },

    /// Toggle one checklist item of a task.
    Toggle {
        /// Task id or title.
        id: String,
        /// Checklist position, starting at 1.
        number: usize,
    },

    /// Delete a task (asks for confirmation).
    Delete {
        /// Task id or title.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Show aggregate task statistics.
    Stats,

    /// Manage due-date notifications.
    Notify {
        #[command(subcommand)]
        action: NotifyAction,
    },

    /// Analyse the workload with the AI collaborator.
    Analyze {
        /// Model identifier override.
        #[arg(long)]
        model: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Request permission and enable notifications.
    On,
    /// Disable notifications.
    Off,
    /// Run a notification scan now.
    Run,
}

/// Locations of the persisted slots.
pub struct DataPaths {
    pub tasks: PathBuf,
    pub notified: PathBuf,
    pub config: PathBuf,
}

/// Save the collection, then scan for notifications when enabled.
fn save_and_scan(store: &TaskStore, paths: &DataPaths, config: &Config) {
    if let Err(e) = store.save(&paths.tasks) {
        eprintln!("Failed to save task database: {e}");
        std::process::exit(1);
    }
    if config.notifications_enabled() {
        run_scan(store, paths);
    }
}

fn run_scan(store: &TaskStore, paths: &DataPaths) {
    let mut state = NotifyState::load(&paths.notified);
    let mut notifier = ConsoleNotifier;
    state.scan(&store.tasks, Local::now().date_naive(), &mut notifier);
    if let Err(e) = state.save(&paths.notified) {
        eprintln!("Failed to save notification state: {e}");
        std::process::exit(1);
    }
}

/// Resolve a task identifier (id or title, case-insensitive) to an id.
fn resolve_task(identifier: &str, store: &TaskStore) -> Result<String, String> {
    if store.get(identifier).is_some() {
        return Ok(identifier.to_string());
    }

    let matches: Vec<&Task> = store
        .tasks
        .iter()
        .filter(|t| t.title.eq_ignore_ascii_case(identifier))
        .collect();

    match matches.len() {
        0 => Err(format!("No task found matching '{identifier}'")),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let mut msg = format!("Multiple tasks titled '{identifier}':\n");
            for t in matches {
                msg.push_str(&format!("  {}  {}\n", t.id, t.title));
            }
            msg.push_str("Please use the specific id instead.");
            Err(msg)
        }
    }
}

fn resolve_or_exit(identifier: &str, store: &TaskStore) -> String {
    match resolve_task(identifier, store) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn parse_date_or_exit(input: &str, what: &str) -> NaiveDate {
    match view::parse_date_input(input) {
        Some(d) => d,
        None => {
            eprintln!("Could not parse {what} date '{input}'.");
            std::process::exit(1);
        }
    }
}

pub fn cmd_add(
    store: &mut TaskStore,
    paths: &DataPaths,
    config: &Config,
    title: String,
    desc: Option<String>,
    assigner: Option<String>,
    assigned: Option<String>,
    due: String,
    priority: Priority,
    status: Status,
    subtasks: Vec<String>,
) {
    let today = Local::now().date_naive();
    let assigned_date = assigned
        .as_deref()
        .map(|s| parse_date_or_exit(s, "assigned"))
        .unwrap_or(today);
    let due_date = parse_date_or_exit(&due, "due");

    let draft = TaskDraft {
        title,
        description: desc.unwrap_or_default(),
        assigned_date,
        due_date,
        assigner: assigner.unwrap_or_default(),
        priority,
        status,
        sub_tasks: subtasks.into_iter().map(SubTask::new).collect(),
    };
    let task = store.add(draft);
    println!("Added task {} ({})", short_id(&task.id), task.title);
    save_and_scan(store, paths, config);
}

pub fn cmd_list(
    store: &TaskStore,
    status: Option<Status>,
    priority: Option<Priority>,
    range: DateRange,
    search: String,
    sort: SortOrder,
) {
    let query = TaskQuery { status, priority, range, search, sort };
    let today = Local::now().date_naive();
    let visible = view::view(&store.tasks, &query, today);

    if visible.is_empty() {
        println!("No tasks found.");
        return;
    }
    print_table(&visible, today);
}

pub fn cmd_view(store: &TaskStore, id: String) {
    let task_id = resolve_or_exit(&id, store);
    let task = store.get(&task_id).expect("resolved id exists");
    let today = Local::now().date_naive();

    println!("{}", task.title);
    println!("  Id:        {}", task.id);
    if !task.description.is_empty() {
        println!("  Details:   {}", task.description);
    }
    if !task.assigner.is_empty() {
        println!("  Assigner:  {}", task.assigner);
    }
    println!("  Assigned:  {}", task.assigned_date);
    println!("  Due:       {} ({})", task.due_date, format_due_relative(task.due_date, today));
    println!("  Priority:  {}", format_priority(task.priority));
    println!("  Status:    {}", format_status(task.status));
    if !task.sub_tasks.is_empty() {
        println!("  Progress:  {}%", task.progress_percent());
        for (i, st) in task.sub_tasks.iter().enumerate() {
            let mark = if st.is_completed { "x" } else { " " };
            println!("    {}. [{}] {}", i + 1, mark, st.title);
        }
    }
}

pub fn cmd_edit(
    store: &mut TaskStore,
    paths: &DataPaths,
    config: &Config,
    id: String,
    title: Option<String>,
    desc: Option<String>,
    assigner: Option<String>,
    assigned: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
    status: Option<Status>,
) {
    let task_id = resolve_or_exit(&id, store);
    let mut task = store.get(&task_id).expect("resolved id exists").clone();

    if let Some(t) = title {
        task.title = t;
    }
    if let Some(d) = desc {
        task.description = d;
    }
    if let Some(a) = assigner {
        task.assigner = a;
    }
    if let Some(a) = assigned {
        task.assigned_date = parse_date_or_exit(&a, "assigned");
    }
    if let Some(d) = due {
        task.due_date = parse_date_or_exit(&d, "due");
    }
    if let Some(p) = priority {
        task.priority = p;
    }
    if let Some(s) = status {
        task.status = s;
    }

    store.update(task);
    println!("Updated {}", short_id(&task_id));
    save_and_scan(store, paths, config);
}

pub fn cmd_status(
    store: &mut TaskStore,
    paths: &DataPaths,
    config: &Config,
    id: String,
    status: Status,
) {
    let task_id = resolve_or_exit(&id, store);
    let task = store.get_mut(&task_id).expect("resolved id exists");
    task.status = status;
    println!("{} is now {}", short_id(&task_id), format_status(status));
    save_and_scan(store, paths, config);
}

pub fn cmd_toggle(
    store: &mut TaskStore,
    paths: &DataPaths,
    config: &Config,
    id: String,
    number: usize,
) {
    let task_id = resolve_or_exit(&id, store);
    let task = store.get_mut(&task_id).expect("resolved id exists");

    if number == 0 || number > task.sub_tasks.len() {
        eprintln!(
            "Checklist position {number} is out of range (task has {} item(s)).",
            task.sub_tasks.len()
        );
        std::process::exit(1);
    }
    let sub_id = task.sub_tasks[number - 1].id.clone();
    task.toggle_subtask(&sub_id);

    let st = &task.sub_tasks[number - 1];
    let state = if st.is_completed { "done" } else { "not done" };
    println!("\"{}\" is now {state} ({}%)", st.title, task.progress_percent());
    save_and_scan(store, paths, config);
}

pub fn cmd_delete(
    store: &mut TaskStore,
    paths: &DataPaths,
    config: &Config,
    id: String,
    yes: bool,
) {
    let task_id = resolve_or_exit(&id, store);
    let title = store.get(&task_id).expect("resolved id exists").title.clone();

    if !yes && !confirm(&format!("Delete task \"{title}\"? This cannot be undone.")) {
        println!("Cancelled.");
        return;
    }

    store.remove(&task_id);
    println!("Deleted \"{title}\".");
    save_and_scan(store, paths, config);
}

pub fn cmd_stats(store: &TaskStore) {
    let s = view::stats(&store.tasks);
    println!("{:<13} {}", "Total", s.total);
    println!("{:<13} {}", "Completed", s.completed);
    println!("{:<13} {}", "In progress", s.in_progress);
    println!("{:<13} {}", "Urgent", s.urgent);
}

pub fn cmd_notify(
    store: &TaskStore,
    paths: &DataPaths,
    config: &mut Config,
    action: NotifyAction,
) {
    match action {
        NotifyAction::On => {
            let mut notifier = ConsoleNotifier;
            config.notifications = notifier.request_permission();
            if let Err(e) = config.save(&paths.config) {
                eprintln!("Failed to save config: {e}");
                std::process::exit(1);
            }
            if config.notifications_enabled() {
                println!("Notifications enabled.");
                run_scan(store, paths);
            } else {
                println!("Notifications stay off.");
            }
        }
        NotifyAction::Off => {
            config.notifications = Permission::Default;
            if let Err(e) = config.save(&paths.config) {
                eprintln!("Failed to save config: {e}");
                std::process::exit(1);
            }
            println!("Notifications disabled.");
        }
        NotifyAction::Run => {
            if !config.notifications_enabled() {
                println!("Notifications are off. Enable them with `zt notify on`.");
                return;
            }
            run_scan(store, paths);
        }
    }
}

pub fn cmd_analyze(store: &TaskStore, config: &Config, model: Option<String>) {
    let analyze_config = AnalyzeConfig::from_env(model.or_else(|| config.model.clone()));

    match ai::analyze(&store.tasks, &analyze_config) {
        Ok(result) => {
            println!("{}", result.summary);
            println!();
            println!("Workload score: {:.1}/10", result.workload_score);
            if !result.priority_tasks.is_empty() {
                println!();
                println!("Start with:");
                for title in &result.priority_tasks {
                    println!("  - {title}");
                }
            }
            if !result.suggested_schedule.is_empty() {
                println!();
                println!("Suggested order:");
                for (i, item) in result.suggested_schedule.iter().enumerate() {
                    println!("  {}. {} - {}", i + 1, item.task_title, item.reason);
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "analysis failed");
            eprintln!("Unable to analyse your workload right now. Please try again later.");
        }
    }
}

pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Ask a yes/no question on the terminal; anything but an explicit "y" is no.
fn confirm(prompt: &str) -> bool {
    use std::io::Write;

    print!("{prompt} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

/// Print tasks in a formatted table.
fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!(
        "{:<10} {:<8} {:<13} {:<12} {:<6} {}",
        "ID", "Pri", "Status", "Due", "Prog", "Title"
    );
    for t in tasks {
        let progress = if t.sub_tasks.is_empty() {
            "-".to_string()
        } else {
            format!("{}%", t.progress_percent())
        };
        println!(
            "{:<10} {:<8} {:<13} {:<12} {:<6} {}",
            short_id(&t.id),
            format_priority(t.priority),
            format_status(t.status),
            format_due_relative(t.due_date, today),
            progress,
            t.title
        );
    }
}

/// First segment of a UUID, enough to address a task on the command line.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d",
/// "2d late").
fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

fn format_status(s: Status) -> &'static str {
    match s {
        Status::NotStarted => "Not started",
        Status::InProgress => "In progress",
        Status::Completed => "Completed",
    }
}
