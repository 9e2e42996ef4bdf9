use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard_lib::client::{
    AuthState, BoardFilters, ClientError, SessionStore, TaskBoard, TracingNotifier,
};
use taskboard_lib::commands::{issue_api_token, CreateTaskRequest, TaskView, UpdateTaskRequest};
use taskboard_lib::config::default_base_url;
use taskboard_lib::db::{TaskPriority, TaskStatus};
use taskboard_lib::{open_database, serve, AppConfig, AppError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("not signed in, run `taskboard login <token>` first")]
    SignedOut,
}

/// Task manager server and command-line client
#[derive(Parser)]
#[command(name = "taskboard", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,

    /// Create the user if needed and print a new API token
    IssueToken { username: String, email: String },

    /// Store a session for the given token
    Login {
        token: String,
        #[arg(long, env = "TASKBOARD_URL")]
        url: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List tasks
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        assigned_to: Option<i64>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<i64>,
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assign: Option<i64>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update a task
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        #[arg(long)]
        assign: Option<i64>,
        /// Remove the assignee
        #[arg(long, conflicts_with = "assign")]
        unassign: bool,
    },

    /// Mark a task as completed
    Complete { id: String },

    /// Delete a task
    Delete { id: String },
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(raw).ok_or_else(|| format!("unknown status `{raw}`"))
}

fn parse_priority(raw: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(raw).ok_or_else(|| format!("unknown priority `{raw}`"))
}

fn print_task(task: &TaskView) {
    let due = task
        .due_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    let overdue = if task.is_overdue { " (overdue)" } else { "" };
    println!(
        "{}  [{}] [{}] {}  due {}{}",
        task.id, task.status, task.priority, task.title, due, overdue
    );
}

async fn signed_in_board() -> Result<TaskBoard, CliError> {
    let mut board = TaskBoard::open(SessionStore::default_location(), Arc::new(TracingNotifier))?;
    let signed_in = matches!(board.check_auth().await, AuthState::SignedIn(_));
    if signed_in {
        Ok(board)
    } else {
        Err(CliError::SignedOut)
    }
}

async fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Serve => {
            let config = AppConfig::from_env()?;
            serve(config).await?;
        }
        Command::IssueToken { username, email } => {
            let config = AppConfig::from_env()?;
            let pool = open_database(&config.database_path).await?;
            let (user, token) = issue_api_token(&pool, &username, &email).await?;
            println!("user {} ({}) token:", user.username, user.user_id);
            println!("{token}");
        }
        Command::Login { token, url } => {
            let mut board =
                TaskBoard::open(SessionStore::default_location(), Arc::new(TracingNotifier))?;
            let base_url = url.unwrap_or_else(default_base_url);
            let user = board.sign_in(&base_url, &token).await?;
            println!("signed in as {} <{}>", user.username, user.email);
        }
        Command::Logout => {
            let mut board =
                TaskBoard::open(SessionStore::default_location(), Arc::new(TracingNotifier))?;
            board.sign_out()?;
        }
        Command::Whoami => {
            let board = signed_in_board().await?;
            if let AuthState::SignedIn(user) = board.auth() {
                println!("{} <{}> (id {})", user.username, user.email, user.id);
            }
        }
        Command::List {
            status,
            priority,
            assigned_to,
            search,
            page,
            limit,
        } => {
            let mut board = signed_in_board().await?;
            board
                .set_filters(BoardFilters {
                    status,
                    priority,
                    assigned_to,
                    search,
                    page,
                    limit,
                })
                .await?;
            for task in board.tasks() {
                print_task(task);
            }
            if let Some(p) = board.pagination() {
                println!("page {}/{} ({} tasks)", p.page, p.pages, p.total);
            }
            let stats = board.stats();
            println!(
                "shown: {} total, {} pending, {} in progress, {} completed",
                stats.total, stats.pending, stats.in_progress, stats.completed
            );
        }
        Command::Add {
            title,
            description,
            priority,
            due,
            assign,
            tags,
        } => {
            let mut board = signed_in_board().await?;
            let task = board
                .create_task(&CreateTaskRequest {
                    description,
                    priority,
                    due_date: due,
                    assigned_to: assign,
                    tags,
                    ..CreateTaskRequest::new(title)
                })
                .await?;
            print_task(&task);
        }
        Command::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
            clear_due,
            assign,
            unassign,
        } => {
            let mut board = signed_in_board().await?;
            let payload = UpdateTaskRequest {
                title,
                description: description.map(Some),
                status,
                priority,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                assigned_to: if unassign { Some(None) } else { assign.map(Some) },
                tags: None,
            };
            let task = board.update_task(&id, &payload).await?;
            print_task(&task);
        }
        Command::Complete { id } => {
            let mut board = signed_in_board().await?;
            let task = board.complete_task(&id).await?;
            print_task(&task);
        }
        Command::Delete { id } => {
            let mut board = signed_in_board().await?;
            board.delete_task(&id).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskboard=debug,taskboard_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}
