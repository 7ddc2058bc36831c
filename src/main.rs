//! # zt - personal task tracker
//!
//! A file-backed task tracker for day-to-day work: due dates, priorities,
//! statuses and per-task checklists, with due-date notifications and an
//! optional AI workload analysis.
//!
//! ## Quick start
//!
//! ```bash
//! # Add a task
//! zt add "Maths homework" --due friday --priority high --subtask "Ex 1-10"
//!
//! # List what's due this week, most urgent first
//! zt list --range week --sort priority-desc
//!
//! # Tick off the first checklist item
//! zt toggle "Maths homework" 1
//!
//! # Turn on due-date notifications
//! zt notify on
//!
//! # Ask the AI collaborator for a schedule (needs $GEMINI_API_KEY)
//! zt analyze
//! ```
//!
//! Data lives in `~/.zentask/`: the task collection in `tasks.json`, the
//! notification dedup state in `notified.json` and settings in
//! `config.toml`. Each file is a full snapshot rewritten on every change.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod ai;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod fields;
pub mod notify;
pub mod store;
pub mod task;
pub mod view;

use cli::Cli;
use cmd::{Commands, DataPaths};
use config::Config;
use store::TaskStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Completions need no storage at all.
    if let Commands::Completions { shell } = &cli.command {
        cmd::cmd_completions(*shell);
        return;
    }

    let tasks_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".zentask");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        data_dir.join("tasks.json")
    });
    let data_dir = tasks_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .to_path_buf();
    let paths = DataPaths {
        tasks: tasks_path,
        notified: data_dir.join("notified.json"),
        config: data_dir.join("config.toml"),
    };

    let mut config = Config::load(&paths.config);
    let mut store = TaskStore::load(&paths.tasks);

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Add { title, desc, assigner, assigned, due, priority, status, subtasks } => {
            cmd::cmd_add(
                &mut store, &paths, &config, title, desc, assigner, assigned, due, priority,
                status, subtasks,
            )
        }

        Commands::List { status, priority, range, search, sort } => {
            cmd::cmd_list(&store, status, priority, range, search, sort)
        }

        Commands::View { id } => cmd::cmd_view(&store, id),

        Commands::Edit { id, title, desc, assigner, assigned, due, priority, status } => {
            cmd::cmd_edit(
                &mut store, &paths, &config, id, title, desc, assigner, assigned, due, priority,
                status,
            )
        }

        Commands::Status { id, status } => {
            cmd::cmd_status(&mut store, &paths, &config, id, status)
        }

        Commands::Toggle { id, number } => {
            cmd::cmd_toggle(&mut store, &paths, &config, id, number)
        }

        Commands::Delete { id, yes } => cmd::cmd_delete(&mut store, &paths, &config, id, yes),

        Commands::Stats => cmd::cmd_stats(&store),

        Commands::Notify { action } => cmd::cmd_notify(&store, &paths, &mut config, action),

        Commands::Analyze { model } => cmd::cmd_analyze(&store, &config, model),
    }
}
