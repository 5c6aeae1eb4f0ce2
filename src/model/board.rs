use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use super::task::{Area, Priority, Task, TaskId, TaskStatus};

/// How tasks are grouped into buckets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardLayout {
    /// One bucket per area × priority (nine buckets)
    #[default]
    Matrix,
    /// One bucket per status (three buckets)
    Status,
}

impl BoardLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            BoardLayout::Matrix => "matrix",
            BoardLayout::Status => "status",
        }
    }

    pub fn parse_layout(s: &str) -> Option<BoardLayout> {
        match s.trim().to_lowercase().as_str() {
            "matrix" => Some(BoardLayout::Matrix),
            "status" => Some(BoardLayout::Status),
            _ => None,
        }
    }

    /// Every bucket of this layout, in canonical order
    pub fn keys(self) -> Vec<BucketKey> {
        match self {
            BoardLayout::Matrix => Area::ALL
                .iter()
                .flat_map(|&area| {
                    Priority::RANKED
                        .iter()
                        .map(move |&priority| BucketKey::Cell { area, priority })
                })
                .collect(),
            BoardLayout::Status => TaskStatus::ALL.iter().map(|&s| BucketKey::Status(s)).collect(),
        }
    }

    /// The bucket a task belongs in, or None if the layout has no place for it
    pub fn key_for(self, task: &Task) -> Option<BucketKey> {
        match self {
            BoardLayout::Matrix if task.priority.is_ranked() => Some(BucketKey::Cell {
                area: task.area,
                priority: task.priority,
            }),
            BoardLayout::Matrix => None,
            BoardLayout::Status => Some(BucketKey::Status(task.status)),
        }
    }

    /// Whether `key` is one of this layout's buckets
    pub fn contains(self, key: BucketKey) -> bool {
        match (self, key) {
            (BoardLayout::Matrix, BucketKey::Cell { priority, .. }) => priority.is_ranked(),
            (BoardLayout::Status, BucketKey::Status(_)) => true,
            _ => false,
        }
    }
}

/// Identifies one bucket of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Cell { area: Area, priority: Priority },
    Status(TaskStatus),
}

impl BucketKey {
    /// Stored bucket name, e.g. `logisticaAlta` or `en_proceso`
    pub fn name(self) -> String {
        match self {
            BucketKey::Cell { area, priority } => format!("{}{}", area.slug(), priority.label()),
            BucketKey::Status(status) => status.as_str().to_string(),
        }
    }

    /// Inverse of [`BucketKey::name`]
    pub fn from_name(name: &str) -> Option<BucketKey> {
        if let Some(status) = TaskStatus::ALL.iter().find(|s| s.as_str() == name) {
            return Some(BucketKey::Status(*status));
        }
        for area in Area::ALL {
            if let Some(rest) = name.strip_prefix(area.slug())
                && let Some(priority) = Priority::RANKED.iter().find(|p| p.label() == rest)
            {
                return Some(BucketKey::Cell {
                    area,
                    priority: *priority,
                });
            }
        }
        None
    }

    /// Whether the task's category fields agree with this bucket
    pub fn matches(self, task: &Task) -> bool {
        match self {
            BucketKey::Cell { area, priority } => task.area == area && task.priority == priority,
            BucketKey::Status(status) => task.status == status,
        }
    }

    /// Rewrite the task's category fields to this bucket's
    pub fn apply_to(self, task: &mut Task) {
        match self {
            BucketKey::Cell { area, priority } => {
                task.area = area;
                task.set_priority(priority);
            }
            BucketKey::Status(status) => task.status = status,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Where a task lives on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    pub bucket: BucketKey,
    pub index: usize,
}

/// All buckets of a board, each an ordered list of tasks.
///
/// Every bucket of the layout is always present (possibly empty), in
/// canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    layout: BoardLayout,
    buckets: IndexMap<BucketKey, Vec<Task>>,
}

impl Board {
    /// An empty board with every bucket of `layout`
    pub fn new(layout: BoardLayout) -> Self {
        let buckets = layout.keys().into_iter().map(|k| (k, Vec::new())).collect();
        Board { layout, buckets }
    }

    pub fn layout(&self) -> BoardLayout {
        self.layout
    }

    /// Tasks in a bucket (empty for a key outside the layout)
    pub fn bucket(&self, key: BucketKey) -> &[Task] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_mut(&mut self, key: BucketKey) -> Option<&mut Vec<Task>> {
        self.buckets.get_mut(&key)
    }

    /// Buckets in canonical order
    pub fn buckets(&self) -> impl Iterator<Item = (BucketKey, &[Task])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// All tasks, bucket by bucket
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.buckets.values().flatten()
    }

    /// Total number of tasks
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Locate a task by ID (first match wins)
    pub fn find(&self, id: TaskId) -> Option<TaskLocation> {
        self.buckets.iter().find_map(|(key, tasks)| {
            tasks.iter().position(|t| t.id == id).map(|index| TaskLocation {
                bucket: *key,
                index,
            })
        })
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.buckets.values_mut().flatten().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Largest task ID on the board
    pub fn max_id(&self) -> Option<TaskId> {
        self.tasks().map(|t| t.id).max()
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        for tasks in self.buckets.values_mut() {
            tasks.clear();
        }
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (key, tasks) in &self.buckets {
            map.serialize_entry(&key.name(), tasks)?;
        }
        map.end()
    }
}
