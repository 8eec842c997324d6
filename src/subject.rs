use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative importance shared by subjects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

pub const DEFAULT_SUBJECT_COLOR: &str = "#8b5cf6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub credits: u32,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new subject. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub professor: Option<String>,
    pub priority: Priority,
    pub credits: u32,
    pub color: String,
    pub description: Option<String>,
}

impl NewSubject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            professor: None,
            priority: Priority::default(),
            credits: 0,
            color: DEFAULT_SUBJECT_COLOR.to_string(),
            description: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_professor(mut self, professor: impl Into<String>) -> Self {
        self.professor = Some(professor.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn into_subject(self, id: String, created_at: DateTime<Utc>) -> Subject {
        Subject {
            id,
            name: self.name,
            professor: non_blank(self.professor),
            priority: self.priority,
            credits: self.credits,
            color: self.color,
            description: non_blank(self.description),
            created_at,
        }
    }
}

/// Partial update for a subject. `None` leaves a field untouched; for the optional
/// text fields a blank string clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub professor: Option<String>,
    pub priority: Option<Priority>,
    pub credits: Option<u32>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl SubjectPatch {
    pub(crate) fn apply(self, subject: &mut Subject) {
        if let Some(name) = self.name {
            subject.name = name;
        }
        if let Some(professor) = self.professor {
            subject.professor = non_blank(Some(professor));
        }
        if let Some(priority) = self.priority {
            subject.priority = priority;
        }
        if let Some(credits) = self.credits {
            subject.credits = credits;
        }
        if let Some(color) = self.color {
            subject.color = color;
        }
        if let Some(description) = self.description {
            subject.description = non_blank(Some(description));
        }
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subject_defaults_to_medium_priority() {
        assert_eq!(Priority::default(), Priority::Medium);
        let subject = NewSubject::new("Art").into_subject("s1".into(), Utc::now());
        assert_eq!(subject.priority, Priority::Medium);
        assert_eq!(subject.color, DEFAULT_SUBJECT_COLOR);
    }

    #[test]
    fn blank_professor_in_patch_clears_field() {
        let mut subject = NewSubject::new("Math")
            .with_professor("Dr. Smith")
            .into_subject("s1".into(), Utc::now());
        SubjectPatch {
            professor: Some("   ".into()),
            ..Default::default()
        }
        .apply(&mut subject);
        assert_eq!(subject.professor, None);
        assert_eq!(subject.name, "Math");
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }
}
