//! Dragboard CLI - kanban board with drag-and-drop reordering.
//!
//! Commands:
//! - `dragboard show`: Print the board (search/sort options)
//! - `dragboard add-column [title]`, `rename-column`, `delete-column`, `move-column`
//! - `dragboard add-task <column> [content]`, `edit-task`, `delete-task`, `move-task`
//! - `dragboard replay <events.jsonl>`: Apply a recorded drag gesture stream
//! - `dragboard reset`: Remove every column and task
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

mod cli;
mod commands;

use clap::Parser;
use env_logger::Target;

use cli::Cli;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    builder.target(Target::Stderr);
    if let Err(e) = builder.try_init() {
        eprintln!("failed to initialize logger: {}", e);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
