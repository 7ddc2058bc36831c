//! Task storage and persistence.
//!
//! The store owns the in-memory task collection for the process lifetime and
//! mirrors it to a JSON file (a bare array of task records) on every
//! mutation. The file is a mirror, not the source of truth: on load,
//! persisted data replaces in-memory state; a missing file yields the fixed
//! seed collection.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::fields::{Priority, Status};
use crate::task::{SubTask, Task};

/// A task as submitted by a creation form, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub assigned_date: NaiveDate,
    pub due_date: NaiveDate,
    pub assigner: String,
    pub priority: Priority,
    pub status: Status,
    pub sub_tasks: Vec<SubTask>,
}

/// In-memory store for the task collection.
#[derive(Debug, Default)]
pub struct TaskStore {
    pub tasks: Vec<Task>,
}

impl TaskStore {
    /// Load the store from a JSON file.
    ///
    /// A missing file yields the seed collection. A file that cannot be read
    /// or parsed also falls back to the seed, with the reason reported on
    /// stderr, so a corrupted database never aborts startup.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no task database, seeding");
            return TaskStore { tasks: seed_tasks() };
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(tasks) => TaskStore { tasks },
                Err(e) => {
                    eprintln!("Error parsing task database, starting from seed: {e}");
                    TaskStore { tasks: seed_tasks() }
                }
            },
            Err(e) => {
                eprintln!("Error reading task database, starting from seed: {e}");
                TaskStore { tasks: seed_tasks() }
            }
        }
    }

    /// Save the full collection to a JSON file using atomic write
    /// (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(&self.tasks).expect("task collection serialises");
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        debug!(path = %path.display(), count = self.tasks.len(), "saved task database");
        Ok(())
    }

    /// Assign a fresh unique id to the draft, append it to the end of the
    /// collection and return the stored task.
    pub fn add(&mut self, draft: TaskDraft) -> &Task {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            assigned_date: draft.assigned_date,
            due_date: draft.due_date,
            assigner: draft.assigner,
            priority: draft.priority,
            status: draft.status,
            sub_tasks: draft.sub_tasks,
        };
        self.tasks.push(task);
        self.tasks.last().expect("just pushed")
    }

    /// Replace the entry whose id matches. Every other entry is unchanged
    /// and keeps its position. No-op when no id matches.
    pub fn update(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    /// Delete the entry with the given id. No-op when absent.
    pub fn remove(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Get a task by id.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

/// The fixed two-task collection used when no database exists yet.
pub fn seed_tasks() -> Vec<Task> {
    vec![
        Task {
            id: "1".into(),
            title: "Science fair project".into(),
            description: "Prepare the display board and the experiment summary report".into(),
            assigned_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 25).unwrap(),
            assigner: "Ms. Carter".into(),
            priority: Priority::High,
            status: Status::InProgress,
            sub_tasks: vec![
                SubTask { id: "st1".into(), title: "Prepare the apparatus".into(), is_completed: true },
                SubTask { id: "st2".into(), title: "Summarise the findings".into(), is_completed: false },
                SubTask { id: "st3".into(), title: "Lay out the exhibition board".into(), is_completed: false },
            ],
        },
        Task {
            id: "2".into(),
            title: "Maths homework, chapter 3".into(),
            description: "End-of-chapter exercises 1-20".into(),
            assigned_date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            assigner: "Mr. Reed".into(),
            priority: Priority::Medium,
            status: Status::NotStarted,
            sub_tasks: vec![
                SubTask { id: "st4".into(), title: "Exercises 1-10".into(), is_completed: false },
                SubTask { id: "st5".into(), title: "Exercises 11-20".into(), is_completed: false },
            ],
        },
    ]
}
