//! `todo` -- command-line client for the todo server.
//!
//! Every run loads the list from the server, applies one action through the
//! view controller, and prints the resulting list. `show` skips the list and
//! prints a single todo. Configuration via CLI
//! flags, environment variables, or config file (`~/.config/todo/config.toml`).
//!
//! ```bash
//! todo                                   # list everything
//! todo list --keyword milk               # search
//! todo add "Buy milk" --due 2026-01-21 --priority HIGH
//! todo toggle 3
//! todo edit 3 "Buy oat milk"
//! todo rm 3
//!
//! # Point at another server
//! TODO_SERVER_URL=http://todo.lan:3001 todo
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use todo_proto::{CreateTodo, Todo};
use tracing_appender::non_blocking::WorkerGuard;

use todo_client::config::{CliArgs, ClientConfig, Command};
use todo_client::gateway::HttpGateway;
use todo_client::render;
use todo_client::view::{TodoView, ViewError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to a file so stdout carries only the rendered list.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let gateway = match HttpGateway::new(&config.server_url) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(server = %gateway.base_url(), "todo client starting");

    let mut view = TodoView::new(gateway);
    let command = cli.command.unwrap_or(Command::List { keyword: None });

    match run(&mut view, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until exit so buffered
/// entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("todo-client.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn run(view: &mut TodoView<HttpGateway>, command: Command) -> Result<(), ViewError> {
    if let Command::List {
        keyword: Some(keyword),
    } = &command
    {
        view.set_keyword(keyword.clone());
    }

    if command.needs_list() {
        view.load().await?;
    }

    match command {
        Command::List { .. } => {}
        Command::Show { id } => {
            let todo = view.fetch(id).await?;
            print!("{}", render::todo_detail(&todo));
            return Ok(());
        }
        Command::Add {
            title,
            description,
            due,
            priority,
        } => {
            let mut request = CreateTodo::new(title);
            request.description = description;
            request.due_date = due;
            request.priority = priority;
            if view.add(request).await?.is_none() {
                eprintln!("Nothing to add: the title is blank.");
            }
        }
        Command::Toggle { id } => {
            view.toggle(id).await?;
        }
        Command::Edit { id, title } => {
            view.start_edit(id)?;
            view.set_edit_buffer(title);
            if view.commit_edit().await?.is_none() {
                eprintln!("Title unchanged: the new title is blank.");
                view.cancel_edit();
            }
        }
        Command::Rm { id, yes } => {
            let deleted = view.delete(id, |todo| yes || confirm_delete(todo)).await?;
            if !deleted {
                eprintln!("Cancelled.");
            }
        }
    }

    print!(
        "{}",
        render::todo_list(view.todos(), view.keyword(), view.edit_state())
    );
    Ok(())
}

/// Asks on stdin before deleting. Anything but `y`/`yes` declines.
fn confirm_delete(todo: &Todo) -> bool {
    print!("Delete \"{}\"? [y/N] ", todo.title);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
