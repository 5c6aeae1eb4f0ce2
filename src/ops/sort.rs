use std::cmp::Ordering;

use crate::model::task::Task;

/// Order by priority rank, then due date. Dates are compared as calendar
/// dates, which matches comparing their `YYYY-MM-DD` forms lexically.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| a.due_date.cmp(&b.due_date))
}

/// Stable in-place sort of one bucket. Ties keep their prior order.
pub fn sort_bucket(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}
