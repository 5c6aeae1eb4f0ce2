pub mod board_dir;
pub mod storage;
