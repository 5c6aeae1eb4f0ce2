use crate::model::board::Board;
use crate::model::session::Session;
use crate::model::task::{Area, Task, TaskStatus};

/// Every task in an area, in board order
pub fn tasks_for_area(board: &Board, area: Area) -> Vec<&Task> {
    board.tasks().filter(|t| t.area == area).collect()
}

pub fn tasks_by_status<'a>(tasks: &[&'a Task], status: TaskStatus) -> Vec<&'a Task> {
    tasks.iter().copied().filter(|t| t.status == status).collect()
}

pub fn status_count(tasks: &[&Task], status: TaskStatus) -> usize {
    tasks.iter().filter(|t| t.status == status).count()
}

pub fn total_estimated_pay(tasks: &[&Task]) -> f64 {
    tasks.iter().map(|t| t.estimated_pay).sum()
}

/// One status column of the worker view
#[derive(Debug)]
pub struct StatusColumn<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Single-area view shown to a worker
#[derive(Debug)]
pub struct WorkerDashboard<'a> {
    pub name: String,
    pub area: Area,
    pub columns: Vec<StatusColumn<'a>>,
    pub total_tasks: usize,
    pub total_pay: f64,
}

impl<'a> WorkerDashboard<'a> {
    /// Build the dashboard for a worker session. None for admin sessions.
    pub fn build(board: &'a Board, session: &Session) -> Option<WorkerDashboard<'a>> {
        let Session::Worker { name, area } = session else {
            return None;
        };
        let tasks = tasks_for_area(board, *area);
        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| StatusColumn {
                status,
                tasks: tasks_by_status(&tasks, status),
            })
            .collect();
        Some(WorkerDashboard {
            name: name.clone(),
            area: *area,
            columns,
            total_tasks: tasks.len(),
            total_pay: total_estimated_pay(&tasks),
        })
    }

    /// Count of tasks in one status
    pub fn count(&self, status: TaskStatus) -> usize {
        self.columns
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.tasks.len())
            .unwrap_or(0)
    }
}
