use std::cell::RefCell;

use chrono::NaiveDate;

use crate::model::board::BucketKey;
use crate::model::task::{Area, Priority, Task, TaskId, TaskStatus};
use crate::ops::task_ops::TaskInput;
use crate::store::{StoreError, TaskStore};

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
}

/// A transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

/// Fire-and-forget sink for notices
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Sends notices to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(level = ?notice.level, "{}", notice.message);
    }
}

/// Keeps every notice, in order
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: RefCell<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the notices collected so far
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain(..).collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Raw values of the task creation form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub area: String,
    pub priority: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub due_date: String,
    pub estimated_pay: f64,
}

impl TaskForm {
    /// Normalise into a store submission. Unparseable fields become None
    /// and make the submission invalid.
    pub fn to_input(&self) -> TaskInput {
        let description = self.description.trim();
        TaskInput {
            title: self.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            area: Area::parse_area(&self.area),
            priority: Priority::parse_priority(&self.priority),
            due_date: parse_due_date(&self.due_date),
            estimated_pay: self.estimated_pay,
        }
    }
}

/// Parse a due date given as `YYYY-MM-DD` or a full timestamp, keeping only
/// the date part.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.trim().split('T').next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// A finished drag: where the task came from and where it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropEvent {
    pub previous_container: BucketKey,
    pub container: BucketKey,
    pub previous_index: usize,
    pub current_index: usize,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Routes user-originated events to the store. Holds no board state of its
/// own; outcomes are reported through a `Notifier`.
pub struct BoardController<'a> {
    store: &'a mut TaskStore,
    notifier: &'a dyn Notifier,
}

impl<'a> BoardController<'a> {
    pub fn new(store: &'a mut TaskStore, notifier: &'a dyn Notifier) -> Self {
        BoardController { store, notifier }
    }

    pub fn store(&self) -> &TaskStore {
        self.store
    }

    /// Creation form submitted. Invalid forms are ignored.
    pub fn submit_form(&mut self, form: &TaskForm) -> Result<Option<Task>, StoreError> {
        let added = self.store.add_task(&form.to_input())?;
        if added.is_some() {
            self.notifier.notify(Notice::success("Task added successfully!"));
        }
        Ok(added)
    }

    /// Drag finished over a bucket
    pub fn drop_completed(&mut self, event: DropEvent) -> Result<Option<TaskId>, StoreError> {
        self.store.reassign_on_drop(
            event.previous_container,
            event.container,
            event.previous_index,
            event.current_index,
        )
    }

    /// Delete clicked on a task card
    pub fn delete_clicked(
        &mut self,
        id: TaskId,
        bucket: BucketKey,
    ) -> Result<Option<Task>, StoreError> {
        let removed = self.store.remove_task(id, bucket)?;
        if let Some(task) = &removed {
            self.notifier
                .notify(Notice::info(format!("Task \"{}\" deleted.", task.title)));
        }
        Ok(removed)
    }

    /// A worker changed a task's status
    pub fn status_changed(&mut self, id: TaskId, status: TaskStatus) -> Result<bool, StoreError> {
        let changed = self.store.update_status(id, status)?;
        if changed {
            self.notifier.notify(Notice::info(format!(
                "Task #{} changed to: {}.",
                id,
                status.label()
            )));
        }
        Ok(changed)
    }

    /// Details requested for a task
    pub fn details_requested(&self, id: TaskId) -> Option<&Task> {
        let task = self.store.board().get(id)?;
        self.notifier.notify(Notice::info(format!(
            "Details for: {}. Description: {}",
            task.title, task.description
        )));
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStore;
    use crate::model::board::BoardLayout;

    fn form(title: &str, area: &str, priority: &str, due: &str) -> TaskForm {
        TaskForm {
            title: title.into(),
            description: "Replace the seal".into(),
            area: area.into(),
            priority: priority.into(),
            due_date: due.into(),
            estimated_pay: 50.0,
        }
    }

    fn store() -> TaskStore {
        TaskStore::new(BoardLayout::Matrix, Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_parse_due_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1);
        assert_eq!(parse_due_date("2025-06-01"), expected);
        assert_eq!(parse_due_date(" 2025-06-01T00:00:00.000Z "), expected);
        assert_eq!(parse_due_date(""), None);
        assert_eq!(parse_due_date("June 1st"), None);
    }

    #[test]
    fn test_form_to_input_normalises() {
        let input = form(" Fix pump ", "LOGÍSTICA", "Alta", "2025-06-01").to_input();
        assert_eq!(input.title, "Fix pump");
        assert_eq!(input.area, Some(Area::Logistics));
        assert_eq!(input.priority, Some(Priority::High));

        let blank = TaskForm::default().to_input();
        assert_eq!(blank.description, None);
        assert_eq!(blank.area, None);
        assert_eq!(blank.due_date, None);
    }

    #[test]
    fn test_submit_valid_form_notifies() {
        let mut store = store();
        let notifier = CollectingNotifier::new();
        let mut controller = BoardController::new(&mut store, &notifier);
        let task = controller
            .submit_form(&form("Fix pump", "LOGÍSTICA", "Alta", "2025-06-01"))
            .unwrap()
            .unwrap();
        assert_eq!(task.status, TaskStatus::Assigned);
        assert_eq!(
            notifier.drain(),
            vec![Notice::success("Task added successfully!")]
        );
    }

    #[test]
    fn test_submit_invalid_form_is_silent() {
        let mut store = store();
        let notifier = CollectingNotifier::new();
        let mut controller = BoardController::new(&mut store, &notifier);
        let added = controller
            .submit_form(&form("Fix pump", "FINANZAS", "Alta", "2025-06-01"))
            .unwrap();
        assert!(added.is_none());
        assert!(notifier.drain().is_empty());
        assert!(controller.store().board().is_empty());
    }

    #[test]
    fn test_delete_and_status_notices() {
        let mut store = store();
        let notifier = CollectingNotifier::new();
        let mut controller = BoardController::new(&mut store, &notifier);
        let task = controller
            .submit_form(&form("Fix pump", "LOGÍSTICA", "Alta", "2025-06-01"))
            .unwrap()
            .unwrap();
        let key = BucketKey::Cell {
            area: Area::Logistics,
            priority: Priority::High,
        };
        notifier.drain();

        assert!(controller.status_changed(task.id, TaskStatus::InProgress).unwrap());
        assert!(!controller.status_changed(42, TaskStatus::Completed).unwrap());
        assert!(controller.details_requested(task.id).is_some());
        assert!(controller.delete_clicked(task.id, key).unwrap().is_some());
        assert!(controller.delete_clicked(task.id, key).unwrap().is_none());

        let messages: Vec<String> = notifier.drain().into_iter().map(|n| n.message).collect();
        assert_eq!(
            messages,
            vec![
                format!("Task #{} changed to: En Proceso.", task.id),
                "Details for: Fix pump. Description: Replace the seal".to_string(),
                "Task \"Fix pump\" deleted.".to_string(),
            ]
        );
    }

    #[test]
    fn test_drop_within_bucket_is_not_sorted() {
        let mut store = store();
        let notifier = CollectingNotifier::new();
        let mut controller = BoardController::new(&mut store, &notifier);
        for due in ["2025-01-01", "2025-02-01"] {
            controller
                .submit_form(&form("t", "MARKETING", "Media", due))
                .unwrap();
        }
        let key = BucketKey::Cell {
            area: Area::Marketing,
            priority: Priority::Medium,
        };
        let dues = |store: &TaskStore| -> Vec<String> {
            store
                .board()
                .bucket(key)
                .iter()
                .map(|t| t.due_date.to_string())
                .collect()
        };
        // New tasks go to the head
        assert_eq!(dues(controller.store()), vec!["2025-02-01", "2025-01-01"]);

        controller
            .drop_completed(DropEvent {
                previous_container: key,
                container: key,
                previous_index: 1,
                current_index: 0,
            })
            .unwrap();
        assert_eq!(dues(controller.store()), vec!["2025-01-01", "2025-02-01"]);

        controller
            .drop_completed(DropEvent {
                previous_container: key,
                container: key,
                previous_index: 0,
                current_index: 1,
            })
            .unwrap();
        assert_eq!(dues(controller.store()), vec!["2025-02-01", "2025-01-01"]);
    }
}
