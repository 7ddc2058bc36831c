//! Task data structures.
//!
//! This module defines the core `Task` record and its owned `SubTask`
//! checklist items. Field names serialise in the camelCase form used by the
//! on-disk JSON database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::{Priority, Status};

/// A checklist item owned by exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
}

impl SubTask {
    /// Create a new unchecked subtask with a fresh id.
    pub fn new(title: impl Into<String>) -> Self {
        SubTask {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            is_completed: false,
        }
    }
}

/// A unit of work with a due date, priority, status and optional subtasks.
///
/// Subtask order is insertion order and is display-significant. Dates carry
/// day granularity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assigned_date: NaiveDate,
    pub due_date: NaiveDate,
    pub assigner: String,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
}

impl Task {
    /// Flip the completion flag of the subtask with the given id.
    ///
    /// Exactly one subtask changes; every other field of the task is left
    /// untouched. Returns false when no subtask matches.
    pub fn toggle_subtask(&mut self, sub_id: &str) -> bool {
        match self.sub_tasks.iter_mut().find(|st| st.id == sub_id) {
            Some(st) => {
                st.is_completed = !st.is_completed;
                true
            }
            None => false,
        }
    }

    /// Checklist progress as a whole percentage. Zero subtasks is 0%.
    pub fn progress_percent(&self) -> u8 {
        let total = self.sub_tasks.len();
        if total == 0 {
            return 0;
        }
        let done = self.sub_tasks.iter().filter(|st| st.is_completed).count();
        ((done * 100 + total / 2) / total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "t1".into(),
            title: "Science fair project".into(),
            description: "Board and summary report".into(),
            assigned_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 25).unwrap(),
            assigner: "Ms. Carter".into(),
            priority: Priority::High,
            status: Status::InProgress,
            sub_tasks: vec![
                SubTask { id: "st1".into(), title: "Prepare apparatus".into(), is_completed: true },
                SubTask { id: "st2".into(), title: "Write up results".into(), is_completed: false },
            ],
        }
    }

    #[test]
    fn toggle_changes_exactly_one_subtask() {
        let mut task = sample();
        let before = task.clone();
        assert!(task.toggle_subtask("st2"));

        assert!(task.sub_tasks[1].is_completed);
        assert_eq!(task.sub_tasks[0], before.sub_tasks[0]);
        assert_eq!(task.title, before.title);
        assert_eq!(task.status, before.status);
        assert_eq!(task.due_date, before.due_date);
    }

    #[test]
    fn toggle_unknown_id_is_a_noop() {
        let mut task = sample();
        let before = task.clone();
        assert!(!task.toggle_subtask("missing"));
        assert_eq!(task, before);
    }

    #[test]
    fn progress_handles_empty_checklist() {
        let mut task = sample();
        task.sub_tasks.clear();
        assert_eq!(task.progress_percent(), 0);
    }

    #[test]
    fn progress_rounds_to_whole_percent() {
        let task = sample();
        assert_eq!(task.progress_percent(), 50);
    }

    #[test]
    fn serialises_with_camel_case_field_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"dueDate\":\"2024-05-25\""));
        assert!(json.contains("\"assignedDate\""));
        assert!(json.contains("\"subTasks\""));
        assert!(json.contains("\"isCompleted\":true"));
        assert!(json.contains("\"priority\":\"high\""));
        assert!(json.contains("\"status\":\"in-progress\""));
    }
}
