//! View models for a presentation layer. Every builder is a pure function of
//! the records handed in and a caller-supplied "now".

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::rules;
use crate::{Schedule, Subject, Task};

pub const UPCOMING_LIMIT: usize = 5;
pub const URGENT_WITHIN_DAYS: i64 = 2;

/// Whole calendar days from `now` to the deadline, both taken in `now`'s zone.
/// Negative once the deadline's day has passed.
pub fn days_until<Tz: TimeZone>(deadline: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    let today = now.date_naive();
    let due = deadline.with_timezone(&now.timezone()).date_naive();
    (due - today).num_days()
}

/// A deadline is overdue from the day after it falls on.
pub fn is_overdue<Tz: TimeZone>(deadline: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    days_until(deadline, now) < 0
}

pub fn is_urgent<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    !task.completed && days_until(&task.deadline, now) <= URGENT_WITHIN_DAYS
}

pub fn days_label(days_until: i64) -> String {
    match days_until {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        n if n > 0 => format!("{n} days"),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "pending" => Ok(TaskFilter::Pending),
            "completed" => Ok(TaskFilter::Completed),
            "overdue" => Ok(TaskFilter::Overdue),
            other => Err(format!("unknown task filter '{other}'")),
        }
    }
}

/// Applies the filter and orders the result by deadline, earliest first.
pub fn filter_tasks<Tz: TimeZone>(tasks: &[Task], filter: TaskFilter, now: &DateTime<Tz>) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|t| match filter {
            TaskFilter::All => true,
            TaskFilter::Pending => !t.completed,
            TaskFilter::Completed => t.completed,
            TaskFilter::Overdue => !t.completed && is_overdue(&t.deadline, now),
        })
        .cloned()
        .collect();
    selected.sort_by_key(|t| t.deadline);
    selected
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_subjects: usize,
    pub pending_tasks: usize,
    pub today: Weekday,
    pub todays_classes: Vec<Schedule>,
    pub upcoming: Vec<Task>,
}

pub fn dashboard<Tz: TimeZone>(
    subjects: &[Subject],
    schedules: &[Schedule],
    tasks: &[Task],
    now: &DateTime<Tz>,
) -> Dashboard {
    let today = now.weekday();
    let mut upcoming = filter_tasks(tasks, TaskFilter::Pending, now);
    upcoming.truncate(UPCOMING_LIMIT);
    Dashboard {
        total_subjects: subjects.len(),
        pending_tasks: tasks.iter().filter(|t| !t.completed).count(),
        today,
        todays_classes: rules::sorted_by_start_time(&rules::by_day(schedules, today)),
        upcoming,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectProgress {
    pub subject_id: String,
    pub name: String,
    pub color: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Analytics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub completion_rate: u32,
    pub by_subject: Vec<SubjectProgress>,
}

impl Analytics {
    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.by_subject.is_empty()
    }
}

fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Empty when there are no subjects or no tasks.
pub fn analytics<Tz: TimeZone>(subjects: &[Subject], tasks: &[Task], now: &DateTime<Tz>) -> Analytics {
    if subjects.is_empty() || tasks.is_empty() {
        return Analytics::default();
    }

    let completed = tasks.iter().filter(|t| t.completed).count();
    let overdue = tasks
        .iter()
        .filter(|t| !t.completed && is_overdue(&t.deadline, now))
        .count();

    let mut per_subject: HashMap<&str, (usize, usize)> = HashMap::new();
    for task in tasks {
        let entry = per_subject.entry(task.subject_id.as_str()).or_default();
        entry.1 += 1;
        if task.completed {
            entry.0 += 1;
        }
    }

    let by_subject = subjects
        .iter()
        .map(|subject| {
            let (done, total) = per_subject
                .get(subject.id.as_str())
                .copied()
                .unwrap_or_default();
            SubjectProgress {
                subject_id: subject.id.clone(),
                name: subject.name.clone(),
                color: subject.color.clone(),
                completed: done,
                total,
                percent: rounded_percent(done, total),
            }
        })
        .collect();

    Analytics {
        total: tasks.len(),
        completed,
        pending: tasks.len() - completed,
        overdue,
        completion_rate: rounded_percent(completed, tasks.len()),
        by_subject,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Dashboard,
    Subjects,
    Schedule,
    Tasks,
    Analytics,
    Settings,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Dashboard => "dashboard",
            Section::Subjects => "subjects",
            Section::Schedule => "schedule",
            Section::Tasks => "tasks",
            Section::Analytics => "analytics",
            Section::Settings => "settings",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleView {
    Daily,
    #[default]
    Weekly,
}

/// UI state owned by the presentation layer and passed to whatever renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewState {
    pub section: Section,
    pub schedule_view: ScheduleView,
    pub task_filter: TaskFilter,
}

impl ViewState {
    /// Switching sections resets the section-local choices.
    pub fn navigate(&mut self, section: Section) {
        if self.section != section {
            *self = Self {
                section,
                ..Self::default()
            };
        }
    }

    pub fn set_schedule_view(&mut self, view: ScheduleView) {
        self.schedule_view = view;
    }

    pub fn set_task_filter(&mut self, filter: TaskFilter) {
        self.task_filter = filter;
    }
}
