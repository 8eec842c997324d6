use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use study_planner::{
    ClassType, KeyValueStore, NewSchedule, NewSubject, NewTask, PlannerConfig, PlannerStore,
    Priority, Schedule, SchedulePatch, SettingsPatch, Subject, SubjectPatch, Task, TaskFilter,
    TaskType, Theme, load_snapshot_from_json, parse_time_of_day, rules, save_snapshot_to_json,
    schedule::day_number, views,
};
use std::error::Error;
use std::io::{self, Write};

type Store = PlannerStore<Box<dyn KeyValueStore>>;
type CliResult<T> = Result<T, Box<dyn Error>>;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: Vec<&str>| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(headers.to_vec()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                        Show this help\n  subjects                                    List subjects\n  subject add <priority> <credits> <name...>  Add a subject\n  subject edit <subject> <field> <value...>   Edit name|professor|priority|credits|color|description\n  subject delete <subject>                    Delete a subject with its classes and tasks\n  classes [day]                               List classes, optionally for one day (0-6 or name)\n  week                                        Show the weekly timetable\n  class add <subject> <day> <HH:MM> <HH:MM> <type> [location...]\n                                              Add a class (type: Lecture|Lab|Tutorial)\n  class move <id> <day> <HH:MM> <HH:MM>       Reschedule a class\n  class delete <id>                           Delete a class\n  tasks [all|pending|completed|overdue]       List tasks by deadline\n  task add <subject> <assignment|exam> <priority> <YYYY-MM-DD> <title...>\n                                              Add a task\n  task toggle <id>                            Flip a task's completed flag\n  task delete <id>                            Delete a task\n  dashboard                                   Today's classes and upcoming deadlines\n  analytics                                   Completion statistics\n  settings                                    Show settings\n  theme <light|dark>                          Set the theme\n  notifications <on|off>                      Toggle notifications\n  sample                                      Load sample data into an empty planner\n  reset                                       Delete all subjects, classes and tasks\n  export <path>                               Write a JSON backup\n  import <path>                               Replace all data from a JSON backup\n  quit|exit                                   Exit\n\nSubjects can be referenced by id or by name (use _ for spaces)."
    );
}

fn day_name(schedule: &Schedule) -> &'static str {
    DAY_NAMES[day_number(schedule.day) as usize]
}

fn resolve_subject(store: &Store, reference: &str) -> CliResult<Subject> {
    let subjects = store.subjects()?;
    let wanted = reference.replace('_', " ");
    subjects
        .into_iter()
        .find(|s| s.id == reference || s.name.eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| format!("Subject '{reference}' not found.").into())
}

fn subject_name(subjects: &[Subject], id: &str) -> String {
    subjects
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| "?".to_string())
}

fn parse_day(raw: Option<&str>) -> CliResult<chrono::Weekday> {
    let raw = raw.ok_or("Missing day.")?;
    rules::parse_day(raw).ok_or_else(|| format!("Invalid day '{raw}'.").into())
}

fn parse_time(raw: Option<&str>) -> CliResult<NaiveTime> {
    Ok(parse_time_of_day(raw.ok_or("Missing time.")?)?)
}

fn rest(parts: std::str::SplitWhitespace<'_>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn print_subjects(store: &Store) -> CliResult<()> {
    let rows: Vec<Vec<String>> = store
        .subjects()?
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.name.clone(),
                s.priority.to_string(),
                s.credits.to_string(),
                s.professor.clone().unwrap_or_default(),
                s.color.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        render_table(&["id", "name", "priority", "credits", "professor", "color"], &rows)
    );
    Ok(())
}

fn schedule_rows(schedules: &[Schedule], subjects: &[Subject]) -> Vec<Vec<String>> {
    schedules
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                day_name(s).to_string(),
                s.start_time.format("%H:%M").to_string(),
                s.end_time.format("%H:%M").to_string(),
                subject_name(subjects, &s.subject_id),
                s.class_type.to_string(),
                s.location.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

const SCHEDULE_HEADERS: [&str; 7] = ["id", "day", "start", "end", "subject", "type", "location"];

fn print_classes(store: &Store, day: Option<&str>) -> CliResult<()> {
    let subjects = store.subjects()?;
    let mut schedules = match day {
        Some(raw) => store.schedules_by_day(parse_day(Some(raw))?)?,
        None => store.schedules()?,
    };
    schedules = rules::sorted_by_start_time(&schedules);
    schedules.sort_by_key(|s| day_number(s.day));
    println!(
        "{}",
        render_table(&SCHEDULE_HEADERS, &schedule_rows(&schedules, &subjects))
    );
    Ok(())
}

fn print_week(store: &Store) -> CliResult<()> {
    let subjects = store.subjects()?;
    let week = rules::week_view(&store.schedules()?);
    for (idx, day) in week.iter().enumerate() {
        println!("{}:", DAY_NAMES[idx]);
        if day.is_empty() {
            println!("  (no classes)");
        }
        for s in day {
            println!(
                "  {}-{} {} ({})",
                s.start_time.format("%H:%M"),
                s.end_time.format("%H:%M"),
                subject_name(&subjects, &s.subject_id),
                s.class_type
            );
        }
    }
    Ok(())
}

fn task_rows(tasks: &[Task], subjects: &[Subject]) -> Vec<Vec<String>> {
    let now = Local::now();
    tasks
        .iter()
        .map(|t| {
            let days = views::days_until(&t.deadline, &now);
            let status = if t.completed {
                "done".to_string()
            } else if views::is_overdue(&t.deadline, &now) {
                "OVERDUE".to_string()
            } else if views::is_urgent(t, &now) {
                format!("urgent {}", views::days_label(days))
            } else {
                views::days_label(days)
            };
            vec![
                t.id.clone(),
                t.title.clone(),
                subject_name(subjects, &t.subject_id),
                t.task_type.to_string(),
                t.priority.to_string(),
                t.deadline.with_timezone(&Local).format("%Y-%m-%d").to_string(),
                status,
            ]
        })
        .collect()
}

const TASK_HEADERS: [&str; 7] = ["id", "title", "subject", "type", "priority", "deadline", "status"];

fn print_tasks(store: &Store, filter: TaskFilter) -> CliResult<()> {
    let subjects = store.subjects()?;
    let tasks = views::filter_tasks(&store.tasks()?, filter, &Local::now());
    println!("{}", render_table(&TASK_HEADERS, &task_rows(&tasks, &subjects)));
    Ok(())
}

fn print_dashboard(store: &Store) -> CliResult<()> {
    let subjects = store.subjects()?;
    let dashboard = views::dashboard(&subjects, &store.schedules()?, &store.tasks()?, &Local::now());
    println!("Total subjects : {}", dashboard.total_subjects);
    println!("Pending tasks  : {}", dashboard.pending_tasks);
    println!("Classes today  : {}", dashboard.todays_classes.len());
    if !dashboard.todays_classes.is_empty() {
        println!(
            "{}",
            render_table(
                &SCHEDULE_HEADERS,
                &schedule_rows(&dashboard.todays_classes, &subjects)
            )
        );
    }
    println!("Upcoming deadlines:");
    println!(
        "{}",
        render_table(&TASK_HEADERS, &task_rows(&dashboard.upcoming, &subjects))
    );
    Ok(())
}

fn print_analytics(store: &Store) -> CliResult<()> {
    let analytics = views::analytics(&store.subjects()?, &store.tasks()?, &Local::now());
    if analytics.is_empty() {
        println!("No data available. Add subjects and tasks to see analytics.");
        return Ok(());
    }
    println!("Completed       : {}", analytics.completed);
    println!("Pending         : {}", analytics.pending);
    println!("Overdue         : {}", analytics.overdue);
    println!("Completion rate : {}%", analytics.completion_rate);
    for progress in &analytics.by_subject {
        println!(
            "  {:<24} {}/{} tasks ({}% complete)",
            progress.name, progress.completed, progress.total, progress.percent
        );
    }
    Ok(())
}

fn subject_command(store: &mut Store, mut parts: std::str::SplitWhitespace<'_>) -> CliResult<()> {
    match parts.next() {
        Some("add") => {
            let priority: Priority = parts.next().ok_or("Missing priority.")?.parse()?;
            let credits: u32 = parts
                .next()
                .ok_or("Missing credits.")?
                .parse()
                .map_err(|_| "Invalid credits.")?;
            let name = rest(parts);
            if name.is_empty() {
                return Err("Usage: subject add <priority> <credits> <name...>".into());
            }
            let subject = store.add_subject(
                NewSubject::new(name)
                    .with_priority(priority)
                    .with_credits(credits),
            )?;
            println!("Subject added: {} ({})", subject.name, subject.id);
        }
        Some("edit") => {
            let subject = resolve_subject(store, parts.next().ok_or("Missing subject.")?)?;
            let field = parts.next().ok_or("Missing field.")?;
            let value = rest(parts);
            let mut patch = SubjectPatch::default();
            match field {
                "name" => patch.name = Some(value),
                "professor" => patch.professor = Some(value),
                "priority" => patch.priority = Some(value.parse::<Priority>()?),
                "credits" => patch.credits = Some(value.parse::<u32>().map_err(|_| "Invalid credits.")?),
                "color" => patch.color = Some(value),
                "description" => patch.description = Some(value),
                other => return Err(format!("Unknown subject field '{other}'.").into()),
            }
            match store.update_subject(&subject.id, patch)? {
                Some(updated) => println!("Subject updated: {}", updated.name),
                None => println!("Subject {} not found.", subject.id),
            }
        }
        Some("delete") => {
            let subject = resolve_subject(store, parts.next().ok_or("Missing subject.")?)?;
            let summary = store.delete_subject(&subject.id)?;
            println!(
                "Deleted subject {} ({} classes, {} tasks).",
                subject.name, summary.schedules_removed, summary.tasks_removed
            );
        }
        _ => println!("Usage: subject <add|edit|delete> ..."),
    }
    Ok(())
}

fn class_command(store: &mut Store, mut parts: std::str::SplitWhitespace<'_>) -> CliResult<()> {
    match parts.next() {
        Some("add") => {
            let subject = resolve_subject(store, parts.next().ok_or("Missing subject.")?)?;
            let day = parse_day(parts.next())?;
            let start = parse_time(parts.next())?;
            let end = parse_time(parts.next())?;
            let class_type: ClassType = parts.next().unwrap_or("Lecture").parse()?;
            let location = rest(parts);
            let schedule = store.add_schedule(
                NewSchedule::new(subject.id, day, start, end)
                    .with_class_type(class_type)
                    .with_location(location),
            )?;
            println!(
                "Class added: {} {} {}-{} ({})",
                subject.name,
                day_name(&schedule),
                schedule.start_time.format("%H:%M"),
                schedule.end_time.format("%H:%M"),
                schedule.id
            );
        }
        Some("move") => {
            let id = parts.next().ok_or("Missing class id.")?;
            let patch = SchedulePatch {
                day: Some(parse_day(parts.next())?),
                start_time: Some(parse_time(parts.next())?),
                end_time: Some(parse_time(parts.next())?),
                ..Default::default()
            };
            match store.update_schedule(id, patch)? {
                Some(_) => println!("Class {id} updated."),
                None => println!("Class {id} not found."),
            }
        }
        Some("delete") => {
            let id = parts.next().ok_or("Missing class id.")?;
            if store.delete_schedule(id)? {
                println!("Deleted class {id}.");
            } else {
                println!("Class {id} not found.");
            }
        }
        _ => println!("Usage: class <add|move|delete> ..."),
    }
    Ok(())
}

fn parse_deadline(raw: &str) -> CliResult<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{raw}' (YYYY-MM-DD)."))?;
    let end_of_day = date.and_hms_opt(23, 59, 0).ok_or("Invalid deadline.")?;
    Local
        .from_local_datetime(&end_of_day)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("Deadline '{raw}' does not exist in the local time zone.").into())
}

fn task_command(store: &mut Store, mut parts: std::str::SplitWhitespace<'_>) -> CliResult<()> {
    match parts.next() {
        Some("add") => {
            let subject = resolve_subject(store, parts.next().ok_or("Missing subject.")?)?;
            let task_type: TaskType = parts.next().ok_or("Missing task type.")?.parse()?;
            let priority: Priority = parts.next().ok_or("Missing priority.")?.parse()?;
            let deadline = parse_deadline(parts.next().ok_or("Missing deadline.")?)?;
            let title = rest(parts);
            if title.is_empty() {
                return Err("Missing title.".into());
            }
            let task = store.add_task(
                NewTask::new(subject.id, title, task_type, deadline).with_priority(priority),
            )?;
            println!("Task added: {} ({})", task.title, task.id);
        }
        Some("toggle") => {
            let id = parts.next().ok_or("Missing task id.")?;
            match store.toggle_task_complete(id)? {
                Some(task) if task.completed => println!("Task {id} marked completed."),
                Some(_) => println!("Task {id} marked pending."),
                None => println!("Task {id} not found."),
            }
        }
        Some("delete") => {
            let id = parts.next().ok_or("Missing task id.")?;
            if store.delete_task(id)? {
                println!("Deleted task {id}.");
            } else {
                println!("Task {id} not found.");
            }
        }
        _ => println!("Usage: task <add|toggle|delete> ..."),
    }
    Ok(())
}

fn run_command(store: &mut Store, input: &str) -> CliResult<bool> {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    match cmd {
        "help" => print_help(),
        "quit" | "exit" => return Ok(false),
        "subjects" => print_subjects(store)?,
        "subject" => subject_command(store, parts)?,
        "classes" => print_classes(store, parts.next())?,
        "week" => print_week(store)?,
        "class" => class_command(store, parts)?,
        "tasks" => {
            let filter = match parts.next() {
                Some(raw) => raw.parse::<TaskFilter>()?,
                None => TaskFilter::All,
            };
            print_tasks(store, filter)?;
        }
        "task" => task_command(store, parts)?,
        "dashboard" => print_dashboard(store)?,
        "analytics" => print_analytics(store)?,
        "settings" => {
            let settings = store.settings()?;
            println!("Theme         : {}", settings.theme);
            println!("Notifications : {}", if settings.notifications { "on" } else { "off" });
        }
        "theme" => {
            let theme: Theme = parts.next().ok_or("Usage: theme <light|dark>")?.parse()?;
            let settings = store.update_settings(SettingsPatch::theme(theme))?;
            println!("Theme set to {}.", settings.theme);
        }
        "notifications" => {
            let enabled = match parts.next() {
                Some("on") => true,
                Some("off") => false,
                _ => return Err("Usage: notifications <on|off>".into()),
            };
            store.update_settings(SettingsPatch::notifications(enabled))?;
            println!("Notifications {}.", if enabled { "enabled" } else { "disabled" });
        }
        "sample" => {
            if store.seed_sample_data(Utc::now())? {
                println!("Sample data loaded.");
            } else {
                println!("Planner already has subjects; sample data skipped.");
            }
        }
        "reset" => {
            store.reset_all()?;
            println!("All data has been reset.");
        }
        "export" => {
            let path = parts.next().ok_or("Usage: export <path>")?;
            save_snapshot_to_json(&store.snapshot()?, path)?;
            println!("Planner exported to {path}.");
        }
        "import" => {
            let path = parts.next().ok_or("Usage: import <path>")?;
            let snapshot = load_snapshot_from_json(path)?;
            store.restore(&snapshot)?;
            println!("Planner imported from {path}.");
        }
        other => println!("Unknown command '{other}'. Type 'help' for commands."),
    }
    Ok(true)
}

fn main() {
    env_logger::init();

    let config = match PlannerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    let medium = match config.open_medium() {
        Ok(medium) => medium,
        Err(e) => {
            eprintln!("Could not open storage: {e}");
            std::process::exit(1);
        }
    };
    let mut store: Store = PlannerStore::new(medium).with_prefix(config.key_prefix.clone());

    println!("Study Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match run_command(&mut store, input) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("Error: {e}"),
        }
    }
}
