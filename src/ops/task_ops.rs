use chrono::NaiveDate;

use crate::model::board::{Board, BucketKey};
use crate::model::task::{Area, Priority, Task, TaskId, TaskStatus};
use crate::ops::sort::sort_bucket;

// ---------------------------------------------------------------------------
// Task creation
// ---------------------------------------------------------------------------

/// A task submission as it arrives from the creation form.
/// Missing fields are `None`; `build_task` decides whether it is acceptable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub area: Option<Area>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub estimated_pay: f64,
}

/// Build a new task from a submission, or None if a required field is
/// missing or the pay is negative. New tasks always start as `asignada`.
pub fn build_task(input: &TaskInput, id: TaskId, require_description: bool) -> Option<Task> {
    let title = input.title.trim();
    if title.is_empty() {
        return None;
    }
    let description = input.description.as_deref().map(str::trim).unwrap_or("");
    if require_description && description.is_empty() {
        return None;
    }
    let area = input.area?;
    let priority = input.priority.filter(|p| p.is_ranked())?;
    let due_date = input.due_date?;
    if !input.estimated_pay.is_finite() || input.estimated_pay < 0.0 {
        return None;
    }

    Some(Task {
        id,
        title: title.to_string(),
        description: description.to_string(),
        area,
        priority,
        unranked_label: None,
        due_date,
        estimated_pay: input.estimated_pay,
        status: TaskStatus::Assigned,
    })
}

/// Next task ID: the creation time in milliseconds, bumped past the largest
/// ID already on the board so rapid successive creations stay unique.
pub fn next_id(board: &Board, now_millis: i64) -> TaskId {
    let now = u64::try_from(now_millis).unwrap_or(0);
    match board.max_id() {
        Some(max) if max >= now => max.saturating_add(1),
        _ => now,
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Where to insert a task in a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Head of the bucket
    Top,
    /// At this index, clamped to the bucket length
    Index(usize),
}

/// Insert a task into its layout bucket at the head.
/// Returns the bucket it landed in.
pub fn insert_task(board: &mut Board, task: Task) -> Option<BucketKey> {
    let key = board.layout().key_for(&task)?;
    let tasks = board.bucket_mut(key)?;
    insert_at(tasks, task, InsertPosition::Top);
    Some(key)
}

/// Remove a task from the named bucket. None if it is not there.
pub fn remove_task(board: &mut Board, id: TaskId, bucket: BucketKey) -> Option<Task> {
    let tasks = board.bucket_mut(bucket)?;
    let idx = tasks.iter().position(|t| t.id == id)?;
    Some(tasks.remove(idx))
}

/// Apply a completed drop.
///
/// Within one bucket the task is removed and reinserted at `to_index`; the
/// bucket keeps the user's manual order. Across buckets the task takes the
/// destination's category and the destination is re-sorted.
///
/// Returns the moved task's ID, or None when `from_index` is out of range or
/// either bucket is not part of the layout.
pub fn move_task(
    board: &mut Board,
    from: BucketKey,
    to: BucketKey,
    from_index: usize,
    to_index: usize,
) -> Option<TaskId> {
    let layout = board.layout();
    if !layout.contains(from) || !layout.contains(to) {
        return None;
    }

    if from == to {
        let tasks = board.bucket_mut(from)?;
        if from_index >= tasks.len() {
            return None;
        }
        let task = tasks.remove(from_index);
        let id = task.id;
        insert_at(tasks, task, InsertPosition::Index(to_index));
        return Some(id);
    }

    let source = board.bucket_mut(from)?;
    if from_index >= source.len() {
        return None;
    }
    let mut task = source.remove(from_index);
    let id = task.id;
    to.apply_to(&mut task);

    let dest = board.bucket_mut(to)?;
    insert_at(dest, task, InsertPosition::Index(to_index));
    sort_bucket(dest);
    Some(id)
}

/// Set a task's status (first match by ID). In a status layout the task
/// moves to the head of its new status bucket.
pub fn set_status(board: &mut Board, id: TaskId, status: TaskStatus) -> bool {
    let layout = board.layout();
    let Some(loc) = board.find(id) else {
        return false;
    };
    let Some(tasks) = board.bucket_mut(loc.bucket) else {
        return false;
    };
    tasks[loc.index].status = status;

    if let Some(target) = layout.key_for(&tasks[loc.index])
        && target != loc.bucket
    {
        let task = tasks.remove(loc.index);
        if let Some(dest) = board.bucket_mut(target) {
            insert_at(dest, task, InsertPosition::Top);
        }
    }
    true
}

fn insert_at(tasks: &mut Vec<Task>, task: Task, position: InsertPosition) {
    match position {
        InsertPosition::Top => tasks.insert(0, task),
        InsertPosition::Index(idx) => {
            let idx = idx.min(tasks.len());
            tasks.insert(idx, task);
        }
    }
}
