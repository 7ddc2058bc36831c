//! Task list filtering, sorting and derived statistics.
//!
//! `view` is a pure function of the task collection and a query: it owns no
//! state and never fails, an empty result is a valid outcome. Statistics are
//! always computed over the unfiltered collection.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::fields::{DateRange, Priority, SortOrder, Status};
use crate::task::Task;

/// Filter and sort parameters for the task list.
///
/// Every field is drawn from a closed set of recognised values; `None` on
/// status/priority means "all".
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub range: DateRange,
    pub search: String,
    pub sort: SortOrder,
}

/// Aggregate counters over the full task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// High-priority tasks not yet completed.
    pub urgent: usize,
}

/// Produce the visible ordered subset of `tasks` for the given query.
///
/// Predicates combine with AND semantics; sorts are stable, so ties keep
/// their stored relative order.
pub fn view<'a>(tasks: &'a [Task], query: &TaskQuery, today: NaiveDate) -> Vec<&'a Task> {
    let needle = query.search.trim().to_lowercase();
    let (week_start, week_end) = week_bounds(today);

    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            if let Some(s) = query.status {
                if t.status != s {
                    return false;
                }
            }
            if let Some(p) = query.priority {
                if t.priority != p {
                    return false;
                }
            }
            if !needle.is_empty()
                && !t.title.to_lowercase().contains(&needle)
                && !t.description.to_lowercase().contains(&needle)
            {
                return false;
            }
            match query.range {
                DateRange::All => true,
                DateRange::Today => t.due_date == today,
                DateRange::Week => t.due_date >= week_start && t.due_date <= week_end,
                DateRange::Month => {
                    t.due_date.month() == today.month() && t.due_date.year() == today.year()
                }
                DateRange::Overdue => is_overdue(t, today),
            }
        })
        .collect();

    match query.sort {
        SortOrder::DueDateAsc => visible.sort_by_key(|t| t.due_date),
        SortOrder::DueDateDesc => visible.sort_by_key(|t| std::cmp::Reverse(t.due_date)),
        SortOrder::PriorityDesc => visible.sort_by_key(|t| std::cmp::Reverse(t.priority.weight())),
        SortOrder::PriorityAsc => visible.sort_by_key(|t| t.priority.weight()),
    }
    visible
}

/// Compute aggregate counters over the unfiltered collection.
pub fn stats(tasks: &[Task]) -> Stats {
    Stats {
        total: tasks.len(),
        completed: tasks.iter().filter(|t| t.status == Status::Completed).count(),
        in_progress: tasks.iter().filter(|t| t.status == Status::InProgress).count(),
        urgent: tasks
            .iter()
            .filter(|t| t.priority == Priority::High && t.status != Status::Completed)
            .count(),
    }
}

/// A task is overdue when its due date has passed and it is not completed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    task.due_date < today && task.status != Status::Completed
}

/// Start and end of the week containing `today`.
///
/// Weeks run Sunday through Saturday here, not ISO Monday weeks: the start
/// is today minus its days-from-Sunday index, the end six days later.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = today.weekday().num_days_from_sunday() as i64;
    let start = today - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// Parse human-readable date input.
///
/// Supports "today", "tomorrow", "yesterday", bare weekday names ("friday"),
/// "in 3d" / "in 2w", and ISO "YYYY-MM-DD".
pub fn parse_date_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    let weekdays = [
        ("monday", 1), ("tuesday", 2), ("wednesday", 3), ("thursday", 4),
        ("friday", 5), ("saturday", 6), ("sunday", 0),
        ("mon", 1), ("tue", 2), ("wed", 3), ("thu", 4),
        ("fri", 5), ("sat", 6), ("sun", 0),
    ];
    for (name, target) in weekdays {
        if s == name {
            let current = today.weekday().num_days_from_sunday() as i64;
            let ahead = (target - current).rem_euclid(7);
            return Some(today + Duration::days(ahead));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Priority, Status};

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

    // 2024-05-22 is a Wednesday.
    const TODAY: (i32, u32, u32) = (2024, 5, 22);

    fn fixture() -> Vec<Task> {
        let today = day(TODAY.0, TODAY.1, TODAY.2);
        vec![
            task("a", today - Duration::days(2), Priority::Medium, Status::InProgress),
            task("b", today, Priority::High, Status::NotStarted),
            task("c", today + Duration::days(2), Priority::Low, Status::NotStarted),
            task("d", today + Duration::days(30), Priority::High, Status::Completed),
        ]
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn neutral_query_keeps_stored_order() {
        let tasks = fixture();
        let query = TaskQuery { sort: SortOrder::DueDateAsc, ..Default::default() };
        let visible = view(&tasks, &query, day(TODAY.0, TODAY.1, TODAY.2));
        // Due-date ascending happens to match stored order in the fixture.
        assert_eq!(ids(&visible), ["a", "b", "c", "d"]);
    }

    #[test]
    fn priority_desc_groups_high_first_and_is_stable() {
        let today = day(TODAY.0, TODAY.1, TODAY.2);
        let tasks = vec![
            task("h1", today, Priority::High, Status::NotStarted),
            task("m1", today, Priority::Medium, Status::NotStarted),
            task("h2", today, Priority::High, Status::NotStarted),
            task("l1", today, Priority::Low, Status::NotStarted),
            task("m2", today, Priority::Medium, Status::NotStarted),
        ];
        let query = TaskQuery { sort: SortOrder::PriorityDesc, ..Default::default() };
        assert_eq!(ids(&view(&tasks, &query, today)), ["h1", "h2", "m1", "m2", "l1"]);
    }

    #[test]
    fn due_date_desc_reverses() {
        let tasks = fixture();
        let query = TaskQuery { sort: SortOrder::DueDateDesc, ..Default::default() };
        assert_eq!(ids(&view(&tasks, &query, day(TODAY.0, TODAY.1, TODAY.2))), ["d", "c", "b", "a"]);
    }

    #[test]
    fn overdue_excludes_completed_tasks() {
        let today = day(TODAY.0, TODAY.1, TODAY.2);
        let yesterday = today - Duration::days(1);
        let tasks = vec![
            task("late", yesterday, Priority::Low, Status::InProgress),
            task("done", yesterday, Priority::Low, Status::Completed),
        ];
        let query = TaskQuery { range: DateRange::Overdue, ..Default::default() };
        assert_eq!(ids(&view(&tasks, &query, today)), ["late"]);
    }

    #[test]
    fn today_filter_matches_exact_date_only() {
        let tasks = fixture();
        let query = TaskQuery { range: DateRange::Today, ..Default::default() };
        assert_eq!(ids(&view(&tasks, &query, day(TODAY.0, TODAY.1, TODAY.2))), ["b"]);
    }

    #[test]
    fn week_runs_sunday_through_saturday() {
        // Wednesday 2024-05-22: week is Sun 19th through Sat 25th.
        let (start, end) = week_bounds(day(2024, 5, 22));
        assert_eq!(start, day(2024, 5, 19));
        assert_eq!(end, day(2024, 5, 25));

        let tasks = vec![
            task("in1", day(2024, 5, 19), Priority::Low, Status::NotStarted),
            task("out1", day(2024, 5, 18), Priority::Low, Status::NotStarted),
            task("in2", day(2024, 5, 25), Priority::Low, Status::NotStarted),
            task("out2", day(2024, 5, 26), Priority::Low, Status::NotStarted),
        ];
        let query = TaskQuery { range: DateRange::Week, sort: SortOrder::DueDateAsc, ..Default::default() };
        assert_eq!(ids(&view(&tasks, &query, day(2024, 5, 22))), ["in1", "in2"]);
    }

    #[test]
    fn month_filter_matches_month_and_year() {
        let tasks = vec![
            task("may", day(2024, 5, 3), Priority::Low, Status::NotStarted),
            task("june", day(2024, 6, 3), Priority::Low, Status::NotStarted),
            task("lastyear", day(2023, 5, 3), Priority::Low, Status::NotStarted),
        ];
        let query = TaskQuery { range: DateRange::Month, ..Default::default() };
        assert_eq!(ids(&view(&tasks, &query, day(2024, 5, 22))), ["may"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let today = day(TODAY.0, TODAY.1, TODAY.2);
        let mut a = task("a", today, Priority::Low, Status::NotStarted);
        a.title = "Revise Geometry".into();
        let mut b = task("b", today, Priority::Low, Status::NotStarted);
        b.description = "finish the geometry worksheet".into();
        let c = task("c", today, Priority::Low, Status::NotStarted);

        let query = TaskQuery { search: "GEOMETRY".into(), ..Default::default() };
        let tasks = [a, b, c];
        let visible = view(&tasks, &query, today);
        assert_eq!(ids(&visible), ["a", "b"]);
    }

    #[test]
    fn filters_combine_with_and_semantics() {
        let tasks = fixture();
        let query = TaskQuery {
            status: Some(Status::NotStarted),
            priority: Some(Priority::High),
            ..Default::default()
        };
        assert_eq!(ids(&view(&tasks, &query, day(TODAY.0, TODAY.1, TODAY.2))), ["b"]);
    }

    #[test]
    fn stats_count_over_the_unfiltered_collection() {
        let tasks = fixture();
        let s = stats(&tasks);
        assert_eq!(s, Stats { total: 4, completed: 1, in_progress: 1, urgent: 1 });
    }

    #[test]
    fn stats_track_create_and_complete_transitions() {
        let mut tasks = fixture();
        let before = stats(&tasks);

        tasks.push(task("x", day(2024, 1, 1), Priority::High, Status::NotStarted));
        let after_add = stats(&tasks);
        assert_eq!(after_add.total, before.total + 1);
        assert_eq!(after_add.urgent, before.urgent + 1);

        tasks.last_mut().unwrap().status = Status::Completed;
        let after_done = stats(&tasks);
        assert_eq!(after_done.completed, after_add.completed + 1);
        assert_eq!(after_done.urgent, after_add.urgent - 1);
    }

    #[test]
    fn parse_date_input_accepts_iso() {
        assert_eq!(parse_date_input("2024-05-25"), Some(day(2024, 5, 25)));
        assert_eq!(parse_date_input("not a date"), None);
    }

    #[test]
    fn parse_date_input_relative_offsets() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date_input("today"), Some(today));
        assert_eq!(parse_date_input("tomorrow"), Some(today + Duration::days(1)));
        assert_eq!(parse_date_input("in 3d"), Some(today + Duration::days(3)));
        assert_eq!(parse_date_input("in 2w"), Some(today + Duration::weeks(2)));
    }
}
