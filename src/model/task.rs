use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task identifier. New tasks take their creation time in milliseconds.
pub type TaskId = u64;

/// Rank given to any priority label outside the known three.
pub const UNRANKED: u8 = 99;

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "asignada")]
    Assigned,
    #[serde(rename = "en_proceso")]
    InProgress,
    #[serde(rename = "completada")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Assigned,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// The stored form (`asignada`, `en_proceso`, `completada`)
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Assigned => "asignada",
            TaskStatus::InProgress => "en_proceso",
            TaskStatus::Completed => "completada",
        }
    }

    /// Human-facing label
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Assigned => "Asignada",
            TaskStatus::InProgress => "En Proceso",
            TaskStatus::Completed => "Completada",
        }
    }

    /// Parse a status from its stored form or a few English aliases
    pub fn parse_status(s: &str) -> Option<TaskStatus> {
        match s.trim().to_lowercase().as_str() {
            "asignada" | "assigned" => Some(TaskStatus::Assigned),
            "en_proceso" | "en-proceso" | "in-progress" | "in_progress" => {
                Some(TaskStatus::InProgress)
            }
            "completada" | "completed" | "done" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organisational area a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "INGENIERÍA")]
    Engineering,
    #[serde(rename = "LOGÍSTICA")]
    Logistics,
    #[serde(rename = "MARKETING")]
    Marketing,
}

impl Area {
    pub const ALL: [Area; 3] = [Area::Engineering, Area::Logistics, Area::Marketing];

    /// The stored form, e.g. `LOGÍSTICA`
    pub fn label(self) -> &'static str {
        match self {
            Area::Engineering => "INGENIERÍA",
            Area::Logistics => "LOGÍSTICA",
            Area::Marketing => "MARKETING",
        }
    }

    /// Lowercase ASCII prefix used in bucket names
    pub fn slug(self) -> &'static str {
        match self {
            Area::Engineering => "ingenieria",
            Area::Logistics => "logistica",
            Area::Marketing => "marketing",
        }
    }

    /// Parse an area from its label, its slug or its English name (case-insensitive)
    pub fn parse_area(s: &str) -> Option<Area> {
        match s.trim().to_lowercase().as_str() {
            "ingeniería" | "ingenieria" | "engineering" => Some(Area::Engineering),
            "logística" | "logistica" | "logistics" => Some(Area::Logistics),
            "marketing" => Some(Area::Marketing),
            _ => None,
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency level. Labels other than the three known ones load as `Unranked`
/// and sort after everything else; the task keeps the original label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
    Unranked,
}

impl Priority {
    /// The priorities a task can be created with
    pub const RANKED: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: lower sorts first
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::Unranked => UNRANKED,
        }
    }

    pub fn is_ranked(self) -> bool {
        self != Priority::Unranked
    }

    /// The stored form, e.g. `Alta`
    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "Alta",
            Priority::Medium => "Media",
            Priority::Low => "Baja",
            Priority::Unranked => "Unranked",
        }
    }

    /// Parse one of the three ranked priorities (Spanish label or English name)
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_lowercase().as_str() {
            "alta" | "high" => Some(Priority::High),
            "media" | "medium" => Some(Priority::Medium),
            "baja" | "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A work item on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub area: Area,
    pub priority: Priority,
    /// Stored label of an `Unranked` priority, written back unchanged
    pub unranked_label: Option<String>,
    /// Serialized as `YYYY-MM-DD`
    pub due_date: NaiveDate,
    pub estimated_pay: f64,
    pub status: TaskStatus,
}

impl Task {
    /// The priority as stored, e.g. `Alta`, or the original unknown label
    pub fn priority_label(&self) -> &str {
        match (&self.unranked_label, self.priority) {
            (Some(label), Priority::Unranked) => label.as_str(),
            (_, priority) => priority.label(),
        }
    }

    /// Change the priority, dropping any unknown stored label
    pub fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
        self.unranked_label = None;
    }
}

/// Wire form of a task. Keeps the priority as free text so unknown labels
/// survive a load and save.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: String,
    area: Area,
    priority: String,
    due_date: NaiveDate,
    #[serde(default)]
    estimated_pay: f64,
    #[serde(default)]
    status: TaskStatus,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let priority = Priority::RANKED
            .into_iter()
            .find(|p| p.label() == record.priority)
            .unwrap_or(Priority::Unranked);
        Task {
            id: record.id,
            title: record.title,
            description: record.description,
            area: record.area,
            priority,
            unranked_label: (!priority.is_ranked()).then_some(record.priority),
            due_date: record.due_date,
            estimated_pay: record.estimated_pay,
            status: record.status,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        TaskRecord {
            priority: task.priority_label().to_string(),
            id: task.id,
            title: task.title,
            description: task.description,
            area: task.area,
            due_date: task.due_date,
            estimated_pay: task.estimated_pay,
            status: task.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: 1717000000000,
            title: "Fix pump".into(),
            description: "Replace the seal".into(),
            area: Area::Logistics,
            priority: Priority::High,
            unranked_label: None,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            estimated_pay: 50.0,
            status: TaskStatus::Assigned,
        }
    }

    #[test]
    fn test_task_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["id"], 1717000000000u64);
        assert_eq!(json["area"], "LOGÍSTICA");
        assert_eq!(json["priority"], "Alta");
        assert_eq!(json["dueDate"], "2025-06-01");
        assert_eq!(json["estimatedPay"], 50.0);
        assert_eq!(json["status"], "asignada");
    }

    #[test]
    fn test_unknown_priority_label_is_unranked() {
        let task: Task = serde_json::from_str(
            r#"{"id":1,"title":"x","description":"","area":"MARKETING",
                "priority":"Urgente","dueDate":"2025-01-01","estimatedPay":0,
                "status":"en_proceso"}"#,
        )
        .unwrap();
        assert_eq!(task.priority, Priority::Unranked);
        assert_eq!(task.priority.rank(), UNRANKED);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority_label(), "Urgente");
    }

    #[test]
    fn test_unknown_priority_label_is_written_back() {
        let mut task: Task = serde_json::from_str(
            r#"{"id":1,"title":"x","area":"MARKETING","priority":"Urgente","dueDate":"2025-01-01"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "Urgente");

        task.set_priority(Priority::Low);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "Baja");
        assert_eq!(task.unranked_label, None);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let task: Task = serde_json::from_str(
            r#"{"id":7,"title":"x","area":"INGENIERÍA","priority":"Baja","dueDate":"2025-02-03"}"#,
        )
        .unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.estimated_pay, 0.0);
        assert_eq!(task.status, TaskStatus::Assigned);
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert!(Priority::Low.rank() < Priority::Unranked.rank());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(Area::parse_area("LOGÍSTICA"), Some(Area::Logistics));
        assert_eq!(Area::parse_area("logistica"), Some(Area::Logistics));
        assert_eq!(Area::parse_area("Engineering"), Some(Area::Engineering));
        assert_eq!(Area::parse_area("finance"), None);
        assert_eq!(Priority::parse_priority("media"), Some(Priority::Medium));
        assert_eq!(Priority::parse_priority("Unranked"), None);
        assert_eq!(
            TaskStatus::parse_status("completada"),
            Some(TaskStatus::Completed)
        );
        assert_eq!(TaskStatus::parse_status("archived"), None);
    }
}
