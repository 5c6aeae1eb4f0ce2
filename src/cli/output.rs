use serde::Serialize;

use crate::controller::{Notice, NoticeLevel};
use crate::model::board::Board;
use crate::model::task::{Area, Task, TaskId, TaskStatus};
use crate::ops::worker::WorkerDashboard;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub area: Area,
    pub priority: String,
    pub rank: u8,
    pub due_date: String,
    pub estimated_pay: f64,
    pub status: TaskStatus,
}

#[derive(Serialize)]
pub struct BucketJson {
    pub name: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct BoardJson {
    pub name: String,
    pub layout: String,
    pub buckets: Vec<BucketJson>,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub status: TaskStatus,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct DashboardJson {
    pub name: String,
    pub area: Area,
    pub total_tasks: usize,
    pub total_pay: f64,
    pub columns: Vec<ColumnJson>,
}

#[derive(Serialize)]
pub struct SessionJson {
    pub role: String,
    pub query: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id,
        title: task.title.clone(),
        description: task.description.clone(),
        area: task.area,
        priority: task.priority_label().to_string(),
        rank: task.priority.rank(),
        due_date: task.due_date.format("%Y-%m-%d").to_string(),
        estimated_pay: task.estimated_pay,
        status: task.status,
    }
}

pub fn board_to_json(name: &str, board: &Board) -> BoardJson {
    BoardJson {
        name: name.to_string(),
        layout: board.layout().as_str().to_string(),
        buckets: board
            .buckets()
            .map(|(key, tasks)| BucketJson {
                name: key.name(),
                tasks: tasks.iter().map(task_to_json).collect(),
            })
            .collect(),
    }
}

pub fn dashboard_to_json(dashboard: &WorkerDashboard) -> DashboardJson {
    DashboardJson {
        name: dashboard.name.clone(),
        area: dashboard.area,
        total_tasks: dashboard.total_tasks,
        total_pay: dashboard.total_pay,
        columns: dashboard
            .columns
            .iter()
            .map(|c| ColumnJson {
                status: c.status,
                tasks: c.tasks.iter().map(|t| task_to_json(t)).collect(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::Assigned => ' ',
        TaskStatus::InProgress => '>',
        TaskStatus::Completed => 'x',
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    format!(
        "[{}] {} {} ({}, due {})",
        status_char(task.status),
        task.id,
        task.title,
        task.priority_label(),
        task.due_date.format("%Y-%m-%d")
    )
}

/// Format detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {} {}", status_char(task.status), task.id, task.title),
        format!("area: {}", task.area),
        format!("priority: {}", task.priority_label()),
        format!("due: {}", task.due_date.format("%Y-%m-%d")),
        format!("pay: {:.2}", task.estimated_pay),
        format!("status: {}", task.status.label()),
    ];
    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

/// Format every bucket, empty ones included
pub fn format_board(name: &str, board: &Board) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", name)];
    for (key, tasks) in board.buckets() {
        lines.push(String::new());
        lines.push(format!("-- {} ({}) --", key.name(), tasks.len()));
        for task in tasks {
            lines.push(format_task_line(task));
        }
    }
    lines
}

pub fn format_dashboard(dashboard: &WorkerDashboard) -> Vec<String> {
    let mut lines = vec![
        format!("== {} ({}) ==", dashboard.name, dashboard.area),
        format!(
            "{} tasks, estimated pay {:.2}",
            dashboard.total_tasks, dashboard.total_pay
        ),
    ];
    for column in &dashboard.columns {
        lines.push(String::new());
        lines.push(format!(
            "-- {} ({}) --",
            column.status.label(),
            column.tasks.len()
        ));
        for task in &column.tasks {
            lines.push(format_task_line(task));
        }
    }
    lines
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("ok: {}", notice.message),
        NoticeLevel::Info => notice.message.clone(),
    }
}
