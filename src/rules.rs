//! Pure rules over a collection of class slots: interval overlap, per-day
//! views and ordering. Nothing here touches storage.

use chrono::{NaiveTime, Timelike, Weekday};
use thiserror::Error;

use crate::schedule::{NewSchedule, Schedule, day_from_number};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleRuleError {
    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTimeFormat(String),
    #[error("start time {start} must be before end time {end}")]
    InvalidTimeRange { start: String, end: String },
    #[error("time conflict with existing class {conflicting_id} ({day} {start}-{end})")]
    Conflict {
        conflicting_id: String,
        day: Weekday,
        start: String,
        end: String,
    },
}

/// Anything with a weekday and a `[start, end)` interval.
pub trait TimeSlot {
    fn day(&self) -> Weekday;
    fn start_time(&self) -> NaiveTime;
    fn end_time(&self) -> NaiveTime;
}

impl TimeSlot for Schedule {
    fn day(&self) -> Weekday {
        self.day
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
}

impl TimeSlot for NewSchedule {
    fn day(&self) -> Weekday {
        self.day
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
}

/// Minutes since midnight, 0..=1439. Seconds are ignored.
pub fn time_to_minutes(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parses `HH:MM` (24-hour). A single-digit hour such as `9:30` is accepted.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, ScheduleRuleError> {
    let trimmed = input.trim();
    let invalid = || ScheduleRuleError::InvalidTimeFormat(input.to_string());
    let (hours, minutes) = trimmed.split_once(':').ok_or_else(invalid)?;
    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !digits(hours) || !digits(minutes) {
        return Err(invalid());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// Parses a day given either as its number (0 = Sunday) or an English name.
pub fn parse_day(input: &str) -> Option<Weekday> {
    let trimmed = input.trim();
    if let Ok(number) = trimmed.parse::<u8>() {
        return day_from_number(number);
    }
    trimmed.parse::<Weekday>().ok()
}

fn overlaps<A: TimeSlot + ?Sized, B: TimeSlot + ?Sized>(a: &A, b: &B) -> bool {
    let (s1, e1) = (time_to_minutes(a.start_time()), time_to_minutes(a.end_time()));
    let (s2, e2) = (time_to_minutes(b.start_time()), time_to_minutes(b.end_time()));
    s1 < e2 && e1 > s2
}

/// First schedule that shares the candidate's day and overlaps its interval.
/// `exclude_id` skips the record being edited.
pub fn find_conflict<'a, C: TimeSlot + ?Sized>(
    existing: &'a [Schedule],
    candidate: &C,
    exclude_id: Option<&str>,
) -> Option<&'a Schedule> {
    existing.iter().find(|schedule| {
        if exclude_id == Some(schedule.id.as_str()) {
            return false;
        }
        schedule.day == candidate.day() && overlaps(*schedule, candidate)
    })
}

pub fn has_conflict<C: TimeSlot + ?Sized>(
    existing: &[Schedule],
    candidate: &C,
    exclude_id: Option<&str>,
) -> bool {
    find_conflict(existing, candidate, exclude_id).is_some()
}

/// Range check followed by the conflict scan, in that order.
pub fn validate_slot<C: TimeSlot + ?Sized>(
    existing: &[Schedule],
    candidate: &C,
    exclude_id: Option<&str>,
) -> Result<(), ScheduleRuleError> {
    let (start, end) = (candidate.start_time(), candidate.end_time());
    if time_to_minutes(start) >= time_to_minutes(end) {
        return Err(ScheduleRuleError::InvalidTimeRange {
            start: start.format("%H:%M").to_string(),
            end: end.format("%H:%M").to_string(),
        });
    }
    if let Some(other) = find_conflict(existing, candidate, exclude_id) {
        return Err(ScheduleRuleError::Conflict {
            conflicting_id: other.id.clone(),
            day: other.day,
            start: other.start_time.format("%H:%M").to_string(),
            end: other.end_time.format("%H:%M").to_string(),
        });
    }
    Ok(())
}

pub fn by_day(schedules: &[Schedule], day: Weekday) -> Vec<Schedule> {
    schedules.iter().filter(|s| s.day == day).cloned().collect()
}

/// Stable ascending sort by start minute.
pub fn sorted_by_start_time(schedules: &[Schedule]) -> Vec<Schedule> {
    let mut sorted = schedules.to_vec();
    sorted.sort_by_key(|s| time_to_minutes(s.start_time));
    sorted
}

/// Seven buckets, Sunday first, each sorted by start time.
pub fn week_view(schedules: &[Schedule]) -> [Vec<Schedule>; 7] {
    let mut week: [Vec<Schedule>; 7] = Default::default();
    for schedule in sorted_by_start_time(schedules) {
        week[schedule.day.num_days_from_sunday() as usize].push(schedule);
    }
    week
}
