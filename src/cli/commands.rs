use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("tablero v", env!("CARGO_PKG_VERSION"), " - a kanban board for areas and priorities"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "board-dir", global = true)]
    pub board_dir: Option<String>,

    /// Session query string, as printed by `tb login`
    #[arg(long, global = true, default_value = "role=admin")]
    pub session: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init(InitArgs),
    /// Check credentials and print the session query
    Login(LoginArgs),
    /// Add a task to the head of its bucket (admin)
    Add(AddArgs),
    /// Delete a task (admin)
    Rm(RmArgs),
    /// Move a task between or within buckets (admin)
    Mv(MvArgs),
    /// Change task status
    Status(StatusArgs),
    /// Show every bucket with its tasks
    Board,
    /// Show task details
    Show(ShowArgs),
    /// Show the worker dashboard for the session's area
    Mine,
    /// Print the stored board snapshot
    Snapshot,
    /// Replace the board with a snapshot file
    Restore(RestoreArgs),
}

// ---------------------------------------------------------------------------
// Setup args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Bucket layout: matrix or status
    #[arg(long, default_value = "matrix")]
    pub layout: String,
    /// Reinitialize even if .tablero/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct LoginArgs {
    pub username: String,
    #[arg(long)]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Board command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// INGENIERÍA, LOGÍSTICA or MARKETING
    #[arg(long)]
    pub area: String,
    /// Alta, Media or Baja
    #[arg(long)]
    pub priority: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: String,
    /// Task description
    #[arg(long, default_value = "")]
    pub desc: String,
    /// Estimated pay
    #[arg(long, default_value_t = 0.0)]
    pub pay: f64,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID to delete
    pub id: u64,
}

#[derive(Args)]
pub struct MvArgs {
    /// Bucket the task is dragged from (e.g. ingenieriaAlta)
    pub from: String,
    /// Position in the source bucket
    pub from_index: usize,
    /// Bucket the task is dropped on
    pub to: String,
    /// Position in the destination bucket
    pub to_index: usize,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task ID
    pub id: u64,
    /// asignada, en_proceso or completada
    pub status: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID to show
    pub id: u64,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Snapshot file (bucket object or flat task array)
    pub file: String,
}
