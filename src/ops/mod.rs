pub mod snapshot;
pub mod sort;
pub mod task_ops;
pub mod worker;
