use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::model::board::{Board, BoardLayout, BucketKey};
use crate::model::task::Task;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    Buckets(IndexMap<String, Vec<Value>>),
    Flat(Vec<Value>),
}

/// Result of decoding a snapshot
#[derive(Debug)]
pub struct Decoded {
    pub board: Board,
    /// Things that were skipped or corrected while loading
    pub warnings: Vec<String>,
}

/// Encode the full bucket mapping: a JSON object from bucket name to the
/// bucket's tasks
pub fn encode(board: &Board) -> Result<String, serde_json::Error> {
    serde_json::to_string(board)
}

/// Decode a snapshot into a fresh board. Buckets missing from the snapshot
/// come back empty. A bare array of tasks (the older flat form) is
/// partitioned by the layout. A task that cannot be read or placed is
/// dropped with a warning; fails only when the text is not a snapshot at all.
pub fn decode(layout: BoardLayout, text: &str) -> Result<Decoded, serde_json::Error> {
    let raw: RawSnapshot = serde_json::from_str(text)?;
    let mut board = Board::new(layout);
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    match raw {
        RawSnapshot::Buckets(buckets) => {
            for (name, values) in buckets {
                let key = match BucketKey::from_name(&name) {
                    Some(key) if layout.contains(key) => key,
                    _ => {
                        warnings.push(format!(
                            "ignored bucket \"{}\" ({} tasks): not part of the {} layout",
                            name,
                            values.len(),
                            layout.as_str()
                        ));
                        continue;
                    }
                };
                for value in values {
                    let Some(mut task) = read_task(value, &name, &mut warnings) else {
                        continue;
                    };
                    if !seen.insert(task.id) {
                        warnings.push(format!("dropped duplicate task {} in \"{}\"", task.id, name));
                        continue;
                    }
                    if !key.matches(&task) {
                        warnings.push(format!("realigned task {} to bucket \"{}\"", task.id, name));
                        key.apply_to(&mut task);
                    }
                    if let Some(tasks) = board.bucket_mut(key) {
                        tasks.push(task);
                    }
                }
            }
        }
        RawSnapshot::Flat(values) => {
            for value in values {
                let Some(task) = read_task(value, "tasks", &mut warnings) else {
                    continue;
                };
                if !seen.insert(task.id) {
                    warnings.push(format!("dropped duplicate task {}", task.id));
                    continue;
                }
                match layout.key_for(&task).and_then(|key| board.bucket_mut(key)) {
                    Some(tasks) => tasks.push(task),
                    None => warnings.push(format!(
                        "dropped task {}: no {} bucket for priority \"{}\"",
                        task.id,
                        layout.as_str(),
                        task.priority_label()
                    )),
                }
            }
        }
    }

    Ok(Decoded { board, warnings })
}

fn read_task(value: Value, bucket: &str, warnings: &mut Vec<String>) -> Option<Task> {
    match serde_json::from_value::<Task>(value) {
        Ok(task) => Some(task),
        Err(e) => {
            warnings.push(format!("dropped unreadable task in \"{}\": {}", bucket, e));
            None
        }
    }
}
