mod init;
pub use init::cmd_init;

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::controller::{BoardController, CollectingNotifier, DropEvent, LogNotifier, TaskForm};
use crate::io::board_dir::{self, BoardDir};
use crate::model::board::BucketKey;
use crate::model::session::{self, Session};
use crate::model::task::{TaskId, TaskStatus};
use crate::ops::worker::WorkerDashboard;
use crate::store::{BoardEvent, TaskStore};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.board_dir.as_deref())?;

    match cli.command {
        // Init and login don't need a session
        Commands::Init(args) => cmd_init(args, &start),
        Commands::Login(args) => cmd_login(args, &start, json),

        cmd => {
            let session = Session::from_query(&cli.session).ok_or_else(|| {
                format!(
                    "no role in session '{}' (log in with `tb login` and pass its output to --session)",
                    cli.session
                )
            })?;
            let board = load_board_from(&start)?;
            let mut store = open_store(&board);

            match cmd {
                Commands::Init(_) | Commands::Login(_) => unreachable!("handled before board discovery"),

                // Read commands
                Commands::Board => cmd_board(&board, &store, json),
                Commands::Show(args) => cmd_show(args, &mut store, json),
                Commands::Mine => cmd_mine(&session, &store, json),
                Commands::Snapshot => cmd_snapshot(&store),

                // Write commands
                Commands::Add(args) => cmd_add(args, &session, &mut store, json),
                Commands::Rm(args) => cmd_rm(args, &session, &mut store, json),
                Commands::Mv(args) => cmd_mv(args, &session, &mut store, json),
                Commands::Status(args) => cmd_status(args, &session, &mut store, json),
                Commands::Restore(args) => cmd_restore(args, &session, &mut store),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn start_dir(board_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match board_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn load_board_from(start: &Path) -> Result<BoardDir, board_dir::BoardDirError> {
    let root = board_dir::discover_board(start)?;
    board_dir::load_board(&root)
}

/// Open the board's store and read its persisted snapshot
fn open_store(board: &BoardDir) -> TaskStore {
    let mut store = TaskStore::from_config(&board.config, Box::new(board.storage()));
    store.load();
    store
}

fn require_admin(session: &Session, action: &str) -> CmdResult {
    if session.is_admin() {
        Ok(())
    } else {
        Err(format!("only an admin can {}", action).into())
    }
}

fn parse_bucket(store: &TaskStore, name: &str) -> Result<BucketKey, String> {
    let layout = store.board().layout();
    BucketKey::from_name(name)
        .filter(|key| layout.contains(*key))
        .ok_or_else(|| {
            let names: Vec<String> = layout.keys().into_iter().map(|k| k.name()).collect();
            format!(
                "unknown bucket '{}' (expected one of: {})",
                name,
                names.join(", ")
            )
        })
}

fn print_notices(notifier: &CollectingNotifier) {
    for notice in notifier.drain() {
        println!("{}", format_notice(&notice));
    }
}

fn not_found(id: TaskId) -> Box<dyn std::error::Error> {
    format!("task not found: {}", id).into()
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

fn cmd_login(args: LoginArgs, start: &Path, json: bool) -> CmdResult {
    let board = load_board_from(start)?;
    let session = session::authenticate(&board.config.users, &args.username, &args.password)?;
    let query = session.to_query();
    if json {
        let output = SessionJson {
            role: session.role().as_str().to_string(),
            query,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", query);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_board(board: &BoardDir, store: &TaskStore, json: bool) -> CmdResult {
    let name = &board.config.board.name;
    if json {
        let output = board_to_json(name, store.board());
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for line in format_board(name, store.board()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, store: &mut TaskStore, json: bool) -> CmdResult {
    let notifier = LogNotifier;
    let controller = BoardController::new(store, &notifier);
    let task = controller
        .details_requested(args.id)
        .ok_or_else(|| not_found(args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        for line in format_task_detail(task) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_mine(session: &Session, store: &TaskStore, json: bool) -> CmdResult {
    let dashboard = WorkerDashboard::build(store.board(), session)
        .ok_or("`tb mine` needs a worker session")?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dashboard_to_json(&dashboard))?
        );
    } else {
        for line in format_dashboard(&dashboard) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_snapshot(store: &TaskStore) -> CmdResult {
    println!("{}", store.serialize()?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, session: &Session, store: &mut TaskStore, json: bool) -> CmdResult {
    require_admin(session, "add tasks")?;
    let form = TaskForm {
        title: args.title,
        description: args.desc,
        area: args.area,
        priority: args.priority,
        due_date: args.due,
        estimated_pay: args.pay,
    };
    let notifier = CollectingNotifier::new();
    let mut controller = BoardController::new(store, &notifier);
    let task = controller.submit_form(&form)?.ok_or(
        "task not added: needs a title, description, area (INGENIERÍA, LOGÍSTICA, MARKETING), \
         priority (Alta, Media, Baja), due date (YYYY-MM-DD) and a non-negative pay",
    )?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
    } else {
        print_notices(&notifier);
        println!("{}", format_task_line(&task));
    }
    Ok(())
}

fn cmd_rm(args: RmArgs, session: &Session, store: &mut TaskStore, json: bool) -> CmdResult {
    require_admin(session, "delete tasks")?;
    let location = store
        .board()
        .find(args.id)
        .ok_or_else(|| not_found(args.id))?;
    let notifier = CollectingNotifier::new();
    let mut controller = BoardController::new(store, &notifier);
    let task = controller
        .delete_clicked(args.id, location.bucket)?
        .ok_or_else(|| not_found(args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
    } else {
        print_notices(&notifier);
    }
    Ok(())
}

fn cmd_mv(args: MvArgs, session: &Session, store: &mut TaskStore, json: bool) -> CmdResult {
    require_admin(session, "move tasks")?;
    let from = parse_bucket(store, &args.from)?;
    let to = parse_bucket(store, &args.to)?;
    let notifier = CollectingNotifier::new();
    let mut controller = BoardController::new(store, &notifier);
    let id = controller
        .drop_completed(DropEvent {
            previous_container: from,
            container: to,
            previous_index: args.from_index,
            current_index: args.to_index,
        })?
        .ok_or_else(|| format!("no task at {}[{}]", args.from, args.from_index))?;

    let task = store.board().get(id).ok_or_else(|| not_found(id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        println!("Moved {} to {}", id, to);
    }
    Ok(())
}

fn cmd_status(args: StatusArgs, session: &Session, store: &mut TaskStore, json: bool) -> CmdResult {
    let status = TaskStatus::parse_status(&args.status).ok_or_else(|| {
        format!(
            "unknown status '{}' (expected: asignada, en_proceso, completada)",
            args.status
        )
    })?;
    let task = store.board().get(args.id).ok_or_else(|| not_found(args.id))?;
    if let Session::Worker { area, .. } = session
        && task.area != *area
    {
        return Err(format!("task {} is not in your area ({})", args.id, area).into());
    }

    let notifier = CollectingNotifier::new();
    let mut controller = BoardController::new(store, &notifier);
    if !controller.status_changed(args.id, status)? {
        return Err(not_found(args.id));
    }
    if json {
        let task = store.board().get(args.id).ok_or_else(|| not_found(args.id))?;
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        print_notices(&notifier);
    }
    Ok(())
}

fn cmd_restore(args: RestoreArgs, session: &Session, store: &mut TaskStore) -> CmdResult {
    require_admin(session, "restore the board")?;
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;

    let restored = Rc::new(Cell::new(None));
    let sink = Rc::clone(&restored);
    store.subscribe(move |event| {
        if let BoardEvent::Restored { tasks } = event {
            sink.set(Some(*tasks));
        }
    });
    store.restore(&text);
    let tasks = restored
        .get()
        .ok_or_else(|| format!("{} is not a board snapshot", args.file))?;
    store.persist()?;
    println!("Restored {} tasks from {}", tasks, args.file);
    Ok(())
}
