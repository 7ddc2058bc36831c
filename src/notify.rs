//! Due-date and priority notifications with once-per-event dedup.
//!
//! Each (task, event-kind) pair notifies at most once, tracked by an opaque
//! tag of the form `{kind}-{taskId}` in a persisted set. The set is
//! append-only: tags are kept even after their task is deleted, so the only
//! bound on its growth is the number of tasks ever created.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::{Priority, Status};
use crate::task::Task;

/// Notification icon shown by backends that support one.
pub const ICON_URL: &str = "https://cdn-icons-png.flaticon.com/512/906/906334.png";

/// Platform permission for delivering notifications.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

/// A user-visible notification. The tag doubles as the coalescing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub tag: String,
}

/// Delivery surface for notifications.
///
/// Backends that cannot deliver (permission denied, unsupported terminal)
/// silently drop the notification rather than raising an error.
pub trait Notifier {
    fn notify(&mut self, notification: &Notification);

    /// Ask the user to grant notification delivery.
    fn request_permission(&mut self) -> Permission;
}

/// Notifier that writes to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notification: &Notification) {
        println!("\u{1f514} {}", notification.title);
        println!("   {}", notification.body);
    }

    fn request_permission(&mut self) -> Permission {
        print!("Enable task notifications? [y/N] ");
        if std::io::stdout().flush().is_err() {
            return Permission::Denied;
        }
        let mut answer = String::new();
        match std::io::stdin().read_line(&mut answer) {
            Ok(_) if answer.trim().eq_ignore_ascii_case("y") => Permission::Granted,
            Ok(_) => Permission::Denied,
            Err(_) => Permission::Denied,
        }
    }
}

/// Persisted dedup state: the set of already-notified event tags.
#[derive(Debug, Default)]
pub struct NotifyState {
    pub notified: Vec<String>,
}

impl NotifyState {
    /// Load the dedup set from its JSON slot (a bare array of tag strings).
    /// Missing or unreadable slots start empty.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return NotifyState::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(notified) => NotifyState { notified },
                Err(e) => {
                    eprintln!("Error parsing notification state, starting empty: {e}");
                    NotifyState::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading notification state, starting empty: {e}");
                NotifyState::default()
            }
        }
    }

    /// Save the dedup set using atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(&self.notified).expect("tag list serialises");
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn fire(&mut self, notifier: &mut dyn Notifier, tag: String, title: String, body: String) {
        notifier.notify(&Notification {
            title,
            body,
            icon: ICON_URL.into(),
            tag: tag.clone(),
        });
        self.notified.push(tag);
    }

    /// Scan the collection and emit every not-yet-notified event.
    ///
    /// Completed tasks are skipped before any check, so even the priority
    /// latch never fires for them. Per task the checks run in order:
    /// overdue, due today, high priority. The priority tag is a one-shot
    /// latch: once recorded it never fires again, regardless of later
    /// priority changes. Returns the number of notifications emitted.
    pub fn scan(
        &mut self,
        tasks: &[Task],
        today: NaiveDate,
        notifier: &mut dyn Notifier,
    ) -> usize {
        let mut fired = 0;

        for task in tasks {
            if task.status == Status::Completed {
                continue;
            }

            let overdue_tag = format!("overdue-{}", task.id);
            if task.due_date < today && !self.notified.contains(&overdue_tag) {
                self.fire(
                    notifier,
                    overdue_tag,
                    format!("Overdue: {}", task.title),
                    format!(
                        "This task was due on {}. Please catch up as soon as you can.",
                        task.due_date
                    ),
                );
                fired += 1;
            }

            let due_tag = format!("due-{}", task.id);
            if task.due_date == today && !self.notified.contains(&due_tag) {
                self.fire(
                    notifier,
                    due_tag,
                    format!("Due today: {}", task.title),
                    format!(
                        "Don't forget! \"{}\" is due today. Check your progress.",
                        task.title
                    ),
                );
                fired += 1;
            }

            let priority_tag = format!("priority-{}", task.id);
            if task.priority == Priority::High && !self.notified.contains(&priority_tag) {
                let detail = if task.description.is_empty() {
                    "no further details".to_string()
                } else {
                    task.description.clone()
                };
                self.fire(
                    notifier,
                    priority_tag,
                    format!("New urgent task: {}", task.title),
                    format!("High priority: {detail}"),
                );
                fired += 1;
            }
        }

        debug!(fired, tracked = self.notified.len(), "notification scan");
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Records notifications instead of delivering them.
    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Vec<Notification>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&mut self, notification: &Notification) {
            self.sent.push(notification.clone());
        }

        fn request_permission(&mut self) -> Permission {
            Permission::Granted
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, due: NaiveDate, priority: Priority, status: Status) -> Task {
        Task {
            id: id.into(),
            title: format!("task {id}"),
            description: String::new(),
            assigned_date: due - Duration::days(7),
            due_date: due,
            assigner: "Ms. Carter".into(),
            priority,
            status,
            sub_tasks: Vec::new(),
        }
    }

    #[test]
    fn overdue_task_notifies_exactly_once() {
        let today = day(2024, 5, 22);
        let tasks = vec![task("a", today - Duration::days(1), Priority::Low, Status::InProgress)];
        let mut state = NotifyState::default();
        let mut notifier = RecordingNotifier::default();

        assert_eq!(state.scan(&tasks, today, &mut notifier), 1);
        assert_eq!(state.scan(&tasks, today, &mut notifier), 0);
        assert_eq!(notifier.sent.len(), 1);
        assert_eq!(notifier.sent[0].tag, "overdue-a");
    }

    #[test]
    fn completed_tasks_are_skipped_entirely() {
        let today = day(2024, 5, 22);
        // Overdue, due today and high priority all at once, but completed.
        let tasks = vec![task("a", today, Priority::High, Status::Completed)];
        let mut state = NotifyState::default();
        let mut notifier = RecordingNotifier::default();

        assert_eq!(state.scan(&tasks, today, &mut notifier), 0);
        assert!(state.notified.is_empty());
    }

    #[test]
    fn events_fire_in_overdue_due_priority_order() {
        let today = day(2024, 5, 22);
        let tasks = vec![
            task("late", today - Duration::days(3), Priority::High, Status::NotStarted),
            task("now", today, Priority::Low, Status::NotStarted),
        ];
        let mut state = NotifyState::default();
        let mut notifier = RecordingNotifier::default();

        assert_eq!(state.scan(&tasks, today, &mut notifier), 3);
        let tags: Vec<_> = notifier.sent.iter().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, ["overdue-late", "priority-late", "due-now"]);
    }

    #[test]
    fn priority_latch_survives_downgrade_and_upgrade() {
        let today = day(2024, 5, 22);
        let mut tasks = vec![task("a", today + Duration::days(5), Priority::High, Status::NotStarted)];
        let mut state = NotifyState::default();
        let mut notifier = RecordingNotifier::default();

        assert_eq!(state.scan(&tasks, today, &mut notifier), 1);

        tasks[0].priority = Priority::Low;
        assert_eq!(state.scan(&tasks, today, &mut notifier), 0);

        tasks[0].priority = Priority::High;
        assert_eq!(state.scan(&tasks, today, &mut notifier), 0);
    }

    #[test]
    fn tags_outlive_deleted_tasks() {
        let today = day(2024, 5, 22);
        let mut tasks = vec![task("a", today - Duration::days(1), Priority::Low, Status::NotStarted)];
        let mut state = NotifyState::default();
        let mut notifier = RecordingNotifier::default();

        state.scan(&tasks, today, &mut notifier);
        assert_eq!(state.notified, ["overdue-a"]);

        tasks.clear();
        state.scan(&tasks, today, &mut notifier);
        assert_eq!(state.notified, ["overdue-a"]);
    }

    #[test]
    fn state_round_trips_through_its_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified.json");

        let state = NotifyState { notified: vec!["overdue-a".into(), "due-b".into()] };
        state.save(&path).unwrap();
        let reloaded = NotifyState::load(&path);
        assert_eq!(reloaded.notified, state.notified);
    }

    #[test]
    fn malformed_slot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notified.json");
        fs::write(&path, "[[[").unwrap();
        assert!(NotifyState::load(&path).notified.is_empty());
    }

    #[test]
    fn priority_body_carries_the_description() {
        let today = day(2024, 5, 22);
        let mut t = task("a", today + Duration::days(2), Priority::High, Status::NotStarted);
        t.description = "Bring the permission slip".into();
        let mut state = NotifyState::default();
        let mut notifier = RecordingNotifier::default();

        state.scan(&[t], today, &mut notifier);
        assert_eq!(notifier.sent[0].body, "High priority: Bring the permission slip");
        assert_eq!(notifier.sent[0].icon, ICON_URL);
    }
}
