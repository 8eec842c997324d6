use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::subject::non_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassType {
    #[default]
    Lecture,
    Lab,
    Tutorial,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Lecture => "Lecture",
            ClassType::Lab => "Lab",
            ClassType::Tutorial => "Tutorial",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lecture" => Ok(ClassType::Lecture),
            "lab" => Ok(ClassType::Lab),
            "tutorial" => Ok(ClassType::Tutorial),
            other => Err(format!("unknown class type '{other}'")),
        }
    }
}

/// A recurring weekly class slot for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub subject_id: String,
    #[serde(with = "weekday_number")]
    pub day: Weekday,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub class_type: ClassType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub subject_id: String,
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Option<String>,
    pub class_type: ClassType,
}

impl NewSchedule {
    pub fn new(
        subject_id: impl Into<String>,
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            day,
            start_time,
            end_time,
            location: None,
            class_type: ClassType::default(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_class_type(mut self, class_type: ClassType) -> Self {
        self.class_type = class_type;
        self
    }

    pub(crate) fn into_schedule(self, id: String, created_at: DateTime<Utc>) -> Schedule {
        Schedule {
            id,
            subject_id: self.subject_id,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            location: non_blank(self.location),
            class_type: self.class_type,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulePatch {
    pub subject_id: Option<String>,
    pub day: Option<Weekday>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub class_type: Option<ClassType>,
}

impl SchedulePatch {
    pub(crate) fn apply(self, schedule: &mut Schedule) {
        if let Some(subject_id) = self.subject_id {
            schedule.subject_id = subject_id;
        }
        if let Some(day) = self.day {
            schedule.day = day;
        }
        if let Some(start_time) = self.start_time {
            schedule.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            schedule.end_time = end_time;
        }
        if let Some(location) = self.location {
            schedule.location = non_blank(Some(location));
        }
        if let Some(class_type) = self.class_type {
            schedule.class_type = class_type;
        }
    }
}

/// Day numbering used by the persisted layout: 0 is Sunday, 6 is Saturday.
pub fn day_from_number(number: u8) -> Option<Weekday> {
    match number {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

pub fn day_number(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

pub(crate) mod weekday_number {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(super::day_number(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let number = u8::deserialize(deserializer)?;
        super::day_from_number(number)
            .ok_or_else(|| D::Error::custom(format!("day {number} is outside 0-6")))
    }
}

pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::rules::parse_time_of_day(&raw).map_err(D::Error::custom)
    }
}
