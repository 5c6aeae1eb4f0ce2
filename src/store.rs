use chrono::{DateTime, Utc};

use crate::io::storage::{KeyValueStore, StorageError};
use crate::model::board::{Board, BoardLayout, BucketKey};
use crate::model::config::BoardConfig;
use crate::model::task::{Task, TaskId, TaskStatus};
use crate::ops::snapshot;
use crate::ops::task_ops::{self, TaskInput};

/// Default storage key for the board snapshot
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// Error type for store persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not persist board: {0}")]
    Storage(#[from] StorageError),
    #[error("could not encode board: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Change notifications delivered to observers after a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    TaskAdded { id: TaskId, bucket: BucketKey },
    TaskRemoved { id: TaskId, bucket: BucketKey },
    TaskMoved { id: TaskId, from: BucketKey, to: BucketKey },
    StatusChanged { id: TaskId, status: TaskStatus },
    Restored { tasks: usize },
}

type Observer = Box<dyn FnMut(&BoardEvent)>;
type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// The authoritative board and its persistence.
///
/// Every successful mutation writes a full snapshot under the storage key
/// and then notifies observers. Invalid submissions and references to missing
/// tasks are no-ops, never errors; the only errors are storage failures, and
/// a mutation whose snapshot cannot be written is rolled back.
pub struct TaskStore {
    board: Board,
    storage: Box<dyn KeyValueStore>,
    storage_key: String,
    require_description: bool,
    clock: Clock,
    observers: Vec<Observer>,
}

impl TaskStore {
    /// An empty store. Call [`TaskStore::load`] to read persisted state.
    pub fn new(layout: BoardLayout, storage: Box<dyn KeyValueStore>) -> Self {
        TaskStore {
            board: Board::new(layout),
            storage,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            require_description: true,
            clock: Box::new(Utc::now),
            observers: Vec::new(),
        }
    }

    /// A store set up from board configuration
    pub fn from_config(config: &BoardConfig, storage: Box<dyn KeyValueStore>) -> Self {
        TaskStore::new(config.board.layout, storage)
            .with_storage_key(&config.storage.key)
            .with_required_description(config.form.require_description)
    }

    pub fn with_storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    pub fn with_required_description(mut self, required: bool) -> Self {
        self.require_description = required;
        self
    }

    /// Replace the clock used for new task IDs
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Register a callback run after every successful mutation
    pub fn subscribe(&mut self, observer: impl FnMut(&BoardEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a task at the head of its bucket. Invalid input is ignored
    /// (returns None and writes nothing).
    pub fn add_task(&mut self, input: &TaskInput) -> Result<Option<Task>, StoreError> {
        let id = task_ops::next_id(&self.board, (self.clock)().timestamp_millis());
        let Some(task) = task_ops::build_task(input, id, self.require_description) else {
            tracing::debug!(title = %input.title, "ignored invalid task submission");
            return Ok(None);
        };
        let before = self.board.clone();
        let Some(bucket) = task_ops::insert_task(&mut self.board, task.clone()) else {
            return Ok(None);
        };
        tracing::debug!(id, bucket = %bucket, "task added");
        self.commit(before)?;
        self.emit(BoardEvent::TaskAdded { id, bucket });
        Ok(Some(task))
    }

    /// Remove a task from the named bucket. No-op if it is not there.
    pub fn remove_task(
        &mut self,
        id: TaskId,
        bucket: BucketKey,
    ) -> Result<Option<Task>, StoreError> {
        let before = self.board.clone();
        let Some(task) = task_ops::remove_task(&mut self.board, id, bucket) else {
            return Ok(None);
        };
        tracing::debug!(id, bucket = %bucket, "task removed");
        self.commit(before)?;
        self.emit(BoardEvent::TaskRemoved { id, bucket });
        Ok(Some(task))
    }

    /// Apply a drop completion. Same-bucket drops reorder in place;
    /// cross-bucket drops recategorise the task and re-sort the destination.
    pub fn reassign_on_drop(
        &mut self,
        source: BucketKey,
        dest: BucketKey,
        source_index: usize,
        dest_index: usize,
    ) -> Result<Option<TaskId>, StoreError> {
        let before = self.board.clone();
        let Some(id) =
            task_ops::move_task(&mut self.board, source, dest, source_index, dest_index)
        else {
            tracing::debug!(%source, %dest, source_index, "ignored drop outside the board");
            return Ok(None);
        };
        tracing::debug!(id, from = %source, to = %dest, dest_index, "task moved");
        self.commit(before)?;
        self.emit(BoardEvent::TaskMoved {
            id,
            from: source,
            to: dest,
        });
        Ok(Some(id))
    }

    /// Set the status of the first task with this ID. Returns false (and
    /// writes nothing) when there is no such task.
    pub fn update_status(&mut self, id: TaskId, status: TaskStatus) -> Result<bool, StoreError> {
        let before = self.board.clone();
        if !task_ops::set_status(&mut self.board, id, status) {
            tracing::debug!(id, "status change for unknown task ignored");
            return Ok(false);
        }
        tracing::debug!(id, %status, "status changed");
        self.commit(before)?;
        self.emit(BoardEvent::StatusChanged { id, status });
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Encode the full bucket mapping
    pub fn serialize(&self) -> Result<String, StoreError> {
        Ok(snapshot::encode(&self.board)?)
    }

    /// Replace the board with a snapshot. Malformed input is logged and the
    /// board is left as it was; this never fails.
    pub fn restore(&mut self, text: &str) {
        match snapshot::decode(self.board.layout(), text) {
            Ok(decoded) => {
                for warning in &decoded.warnings {
                    tracing::warn!("{}", warning);
                }
                self.board = decoded.board;
                let tasks = self.board.len();
                tracing::debug!(tasks, "board restored");
                self.emit(BoardEvent::Restored { tasks });
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not restore board snapshot; keeping current board");
            }
        }
    }

    /// Restore from storage. A missing key leaves the board empty; an
    /// unreadable store is logged and treated as missing.
    pub fn load(&mut self) {
        match self.storage.get(&self.storage_key) {
            Ok(Some(text)) => self.restore(&text),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "could not read board storage"),
        }
    }

    /// Write the current snapshot under the storage key
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let text = snapshot::encode(&self.board)?;
        self.storage.set(&self.storage_key, &text)?;
        Ok(())
    }

    /// Persist a mutation, or put the board back as it was if that fails
    fn commit(&mut self, before: Board) -> Result<(), StoreError> {
        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "could not persist board; change rolled back");
            self.board = before;
            return Err(e);
        }
        Ok(())
    }

    fn emit(&mut self, event: BoardEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStore;
    use crate::model::task::{Area, Priority};
    use chrono::{NaiveDate, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    fn store() -> TaskStore {
        TaskStore::new(BoardLayout::Matrix, Box::new(MemoryStore::new())).with_clock(fixed_clock)
    }

    fn input(title: &str, area: Area, priority: Priority, due: &str) -> TaskInput {
        TaskInput {
            title: title.into(),
            description: Some("d".into()),
            area: Some(area),
            priority: Some(priority),
            due_date: NaiveDate::parse_from_str(due, "%Y-%m-%d").ok(),
            estimated_pay: 50.0,
        }
    }

    fn stored(store: &TaskStore) -> Option<String> {
        store.storage().get(store.storage_key()).unwrap()
    }

    #[test]
    fn test_add_task_persists_snapshot() {
        let mut store = store();
        let task = store
            .add_task(&input("Fix pump", Area::Logistics, Priority::High, "2025-06-01"))
            .unwrap()
            .unwrap();
        assert_eq!(task.id as i64, fixed_clock().timestamp_millis());

        let text = stored(&store).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["logisticaAlta"][0]["title"], "Fix pump");
        assert_eq!(json["logisticaAlta"][0]["status"], "asignada");
    }

    #[test]
    fn test_invalid_add_writes_nothing() {
        let mut store = store();
        let mut bad = input("x", Area::Logistics, Priority::High, "2025-06-01");
        bad.due_date = None;
        assert!(store.add_task(&bad).unwrap().is_none());
        assert!(store.board().is_empty());
        assert_eq!(stored(&store), None);
    }

    #[test]
    fn test_same_millisecond_ids_are_unique() {
        let mut store = store();
        let a = store
            .add_task(&input("a", Area::Marketing, Priority::Low, "2025-06-01"))
            .unwrap()
            .unwrap();
        let b = store
            .add_task(&input("b", Area::Marketing, Priority::Low, "2025-06-01"))
            .unwrap()
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_observers_see_mutations() {
        let mut store = store();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let task = store
            .add_task(&input("a", Area::Engineering, Priority::Medium, "2025-06-01"))
            .unwrap()
            .unwrap();
        let key = BucketKey::Cell {
            area: Area::Engineering,
            priority: Priority::Medium,
        };
        store.update_status(task.id, TaskStatus::InProgress).unwrap();
        store.update_status(42, TaskStatus::Completed).unwrap();
        store.remove_task(task.id, key).unwrap();
        store.remove_task(task.id, key).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                BoardEvent::TaskAdded {
                    id: task.id,
                    bucket: key
                },
                BoardEvent::StatusChanged {
                    id: task.id,
                    status: TaskStatus::InProgress
                },
                BoardEvent::TaskRemoved {
                    id: task.id,
                    bucket: key
                },
            ]
        );
    }

    #[test]
    fn test_restore_not_json_keeps_board() {
        let mut store = store();
        store.restore("not json");
        assert!(store.board().is_empty());
        assert_eq!(store.board().buckets().count(), 9);
    }

    #[test]
    fn test_load_reads_storage() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                "tasks",
                r#"{"marketingMedia":[{"id":3,"title":"Flyer","description":"","area":"MARKETING","priority":"Media","dueDate":"2025-07-01","estimatedPay":5,"status":"completada"}]}"#,
            )
            .unwrap();
        let mut store = TaskStore::new(BoardLayout::Matrix, Box::new(storage));
        store.load();
        assert_eq!(store.board().get(3).unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn test_custom_storage_key() {
        let config: BoardConfig = toml::from_str("[storage]\nkey = \"kanban\"").unwrap();
        let mut store =
            TaskStore::from_config(&config, Box::new(MemoryStore::new())).with_clock(fixed_clock);
        store
            .add_task(&input("a", Area::Logistics, Priority::Low, "2025-06-01"))
            .unwrap();
        assert!(store.storage().get("kanban").unwrap().is_some());
        assert!(store.storage().get("tasks").unwrap().is_none());
    }

    /// Reads from an inner store; every write fails
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: "storage.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn test_failed_write_rolls_back_mutations() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                "tasks",
                r#"{"logisticaAlta":[{"id":5,"title":"Fix pump","area":"LOGÍSTICA","priority":"Alta","dueDate":"2025-06-01"}]}"#,
            )
            .unwrap();
        let mut store = TaskStore::new(BoardLayout::Matrix, Box::new(ReadOnlyStore(storage)))
            .with_clock(fixed_clock);
        store.load();
        let before = store.board().clone();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let high = BucketKey::Cell {
            area: Area::Logistics,
            priority: Priority::High,
        };
        let low = BucketKey::Cell {
            area: Area::Logistics,
            priority: Priority::Low,
        };
        assert!(
            store
                .add_task(&input("Check belts", Area::Logistics, Priority::High, "2025-05-20"))
                .is_err()
        );
        assert!(store.remove_task(5, high).is_err());
        assert!(store.reassign_on_drop(high, low, 0, 0).is_err());
        assert!(store.update_status(5, TaskStatus::Completed).is_err());

        assert_eq!(*store.board(), before);
        assert_eq!(store.board().get(5).unwrap().status, TaskStatus::Assigned);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_restore_keeps_unknown_priority_label() {
        let mut store =
            TaskStore::new(BoardLayout::Status, Box::new(MemoryStore::new())).with_clock(fixed_clock);
        store.restore(
            r#"[{"id":3,"title":"Audit","description":"","area":"MARKETING","priority":"Urgente","dueDate":"2025-06-03","estimatedPay":5,"status":"completada"}]"#,
        );
        let task = store.board().get(3).unwrap();
        assert_eq!(task.priority, Priority::Unranked);
        assert_eq!(task.priority.rank(), 99);

        let text = store.serialize().unwrap();
        assert!(text.contains(r#""priority":"Urgente""#));
        assert!(!text.contains("Unranked"));
    }
}
