use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::subject::{Priority, non_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Assignment,
    Exam,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Assignment => "assignment",
            TaskType::Exam => "exam",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(TaskType::Assignment),
            "exam" => Ok(TaskType::Exam),
            other => Err(format!("unknown task type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub subject_id: String,
    pub title: String,
    pub task_type: TaskType,
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(
        subject_id: impl Into<String>,
        title: impl Into<String>,
        task_type: TaskType,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            title: title.into(),
            task_type,
            priority: Priority::default(),
            deadline,
            description: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// New tasks always start incomplete.
    pub(crate) fn into_task(self, id: String, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            subject_id: self.subject_id,
            title: self.title,
            task_type: self.task_type,
            priority: self.priority,
            deadline: self.deadline,
            description: non_blank(self.description),
            completed: false,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub subject_id: Option<String>,
    pub title: Option<String>,
    pub task_type: Option<TaskType>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(subject_id) = self.subject_id {
            task.subject_id = subject_id;
        }
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(task_type) = self.task_type {
            task.task_type = task_type;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(description) = self.description {
            task.description = non_blank(Some(description));
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
