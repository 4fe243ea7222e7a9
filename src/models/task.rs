use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Allow-listed sort columns for task queries. Callers pick from this
/// enum instead of passing a raw column name, so the ORDER BY clause
/// can never be driven by untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    DueDate,
    Priority,
    CreatedAt,
    Title,
}

impl TaskSortKey {
    pub fn column(&self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::CreatedAt => "created_at",
            Self::Title => "title",
        }
    }
}

impl Default for TaskSortKey {
    fn default() -> Self {
        Self::DueDate
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub category: String,
    pub tags: Vec<String>,
    pub estimated_duration: Option<i64>,
    pub actual_duration: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            priority: 1,
            due_date: None,
            category: "general".to_string(),
            tags: Vec::new(),
            estimated_duration: None,
            actual_duration: None,
            created_at: None,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub location: String,
    pub attendees: Vec<String>,
    pub reminder_minutes: i64,
    pub category: String,
    pub recurring: bool,
    pub recurrence_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Option<i64>,
    pub title: String,
    pub message: String,
    pub reminder_time: DateTime<Utc>,
    pub repeat_interval: Option<i64>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Reminder {
    pub fn new(title: impl Into<String>, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: title.into(),
            message: message.into(),
            reminder_time: at,
            repeat_interval: None,
            is_active: true,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub completed: i64,
    pub avg_duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductivityStats {
    pub period_days: i64,
    pub total_tasks_created: i64,
    pub completed_by_category: Vec<CategoryStat>,
    pub overdue_tasks: i64,
    pub completion_rate: f64,
}
