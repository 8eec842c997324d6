use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc, Weekday};
use study_planner::views::{analytics, dashboard, days_until, filter_tasks, is_overdue, is_urgent};
use study_planner::{ClassType, Priority, Schedule, Subject, Task, TaskFilter, TaskType};

fn now() -> DateTime<Utc> {
    // A Monday.
    Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
}

fn subject(id: &str) -> Subject {
    Subject {
        id: id.to_string(),
        name: id.to_uppercase(),
        professor: None,
        priority: Priority::Medium,
        credits: 3,
        color: "#8b5cf6".to_string(),
        description: None,
        created_at: now(),
    }
}

fn task(id: &str, subject_id: &str, due_in_days: i64, completed: bool) -> Task {
    Task {
        id: id.to_string(),
        subject_id: subject_id.to_string(),
        title: format!("task {id}"),
        task_type: TaskType::Assignment,
        priority: Priority::Medium,
        deadline: now() + Duration::days(due_in_days),
        description: None,
        completed,
        created_at: now(),
    }
}

fn class(id: &str, day: Weekday, start_hour: u32) -> Schedule {
    Schedule {
        id: id.to_string(),
        subject_id: "s1".to_string(),
        day,
        start_time: NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(start_hour + 1, 0, 0).unwrap(),
        location: None,
        class_type: ClassType::Lecture,
        created_at: now(),
    }
}

#[test]
fn days_until_counts_calendar_days() {
    let now = now();
    assert_eq!(days_until(&now, &now), 0);
    assert_eq!(days_until(&(now + Duration::hours(15)), &now), 1);
    assert_eq!(days_until(&(now + Duration::days(3)), &now), 3);
    assert_eq!(days_until(&(now - Duration::days(1)), &now), -1);

    assert!(is_overdue(&(now - Duration::days(1)), &now));
    assert!(!is_overdue(&(now - Duration::hours(2)), &now));
}

#[test]
fn urgency_ignores_completed_tasks() {
    let now = now();
    assert!(is_urgent(&task("a", "s1", 2, false), &now));
    assert!(!is_urgent(&task("b", "s1", 3, false), &now));
    assert!(!is_urgent(&task("c", "s1", 1, true), &now));
}

#[test]
fn filters_select_and_sort_by_deadline() {
    let now = now();
    let tasks = vec![
        task("late", "s1", 9, false),
        task("done", "s1", 1, true),
        task("overdue", "s1", -3, false),
        task("soon", "s1", 2, false),
        task("done-overdue", "s1", -5, true),
    ];

    let ids = |filter| -> Vec<String> {
        filter_tasks(&tasks, filter, &now)
            .into_iter()
            .map(|t| t.id)
            .collect()
    };

    assert_eq!(
        ids(TaskFilter::All),
        vec!["done-overdue", "overdue", "done", "soon", "late"]
    );
    assert_eq!(ids(TaskFilter::Pending), vec!["overdue", "soon", "late"]);
    assert_eq!(ids(TaskFilter::Completed), vec!["done-overdue", "done"]);
    assert_eq!(ids(TaskFilter::Overdue), vec!["overdue"]);
}

#[test]
fn dashboard_shows_todays_classes_and_five_upcoming() {
    let now = now();
    let subjects = vec![subject("s1"), subject("s2")];
    let schedules = vec![
        class("mon-late", Weekday::Mon, 14),
        class("tue", Weekday::Tue, 9),
        class("mon-early", Weekday::Mon, 8),
    ];
    let mut tasks: Vec<Task> = (1..=7).rev().map(|d| task(&format!("t{d}"), "s1", d, false)).collect();
    tasks.push(task("finished", "s2", 0, true));

    let board = dashboard(&subjects, &schedules, &tasks, &now);
    assert_eq!(board.total_subjects, 2);
    assert_eq!(board.pending_tasks, 7);
    assert_eq!(board.today, Weekday::Mon);

    let classes: Vec<&str> = board.todays_classes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(classes, vec!["mon-early", "mon-late"]);

    let upcoming: Vec<&str> = board.upcoming.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(upcoming, vec!["t1", "t2", "t3", "t4", "t5"]);
}

#[test]
fn analytics_reports_rates_per_subject() {
    let now = now();
    let subjects = vec![subject("s1"), subject("s2"), subject("s3")];
    let tasks = vec![
        task("a", "s1", 1, true),
        task("b", "s1", 2, false),
        task("c", "s1", -2, false),
        task("d", "s2", 4, true),
    ];

    let report = analytics(&subjects, &tasks, &now);
    assert_eq!(report.total, 4);
    assert_eq!(report.completed, 2);
    assert_eq!(report.pending, 2);
    assert_eq!(report.overdue, 1);
    assert_eq!(report.completion_rate, 50);

    let s1 = &report.by_subject[0];
    assert_eq!((s1.completed, s1.total, s1.percent), (1, 3, 33));
    let s2 = &report.by_subject[1];
    assert_eq!((s2.completed, s2.total, s2.percent), (1, 1, 100));
    let s3 = &report.by_subject[2];
    assert_eq!((s3.completed, s3.total, s3.percent), (0, 0, 0));
}

#[test]
fn analytics_is_empty_without_subjects_or_tasks() {
    let now = now();
    assert!(analytics(&[], &[task("a", "s1", 1, false)], &now).is_empty());
    assert!(analytics(&[subject("s1")], &[], &now).is_empty());
}
