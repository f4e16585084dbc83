//! CLI definition for the dragboard command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Dragboard - a kanban board in your terminal.
///
/// Columns and tasks are stored as JSON in the data directory
/// (default: the platform data dir, e.g. ~/.local/share/dragboard).
/// Drag gestures recorded by a front end can be replayed with `replay`.
#[derive(Parser, Debug)]
#[command(name = "dragboard")]
#[command(version)]
#[command(about = "Kanban board with drag-and-drop reordering")]
pub struct Cli {
    /// Directory holding the board data (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file (default: ~/.config/dragboard/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the board
    Show {
        /// Only show tasks whose content contains this text
        #[arg(long, short)]
        search: Option<String>,
        /// Column order
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Match the search text case-sensitively
        #[arg(long)]
        case_sensitive: bool,
        /// Treat the search text as a regular expression
        #[arg(long)]
        regex: bool,
    },

    /// Add a column at the end of the board
    AddColumn {
        /// Column title (default from config, e.g. "New Column 3")
        title: Option<String>,
    },

    /// Rename a column
    RenameColumn {
        /// Column id, id prefix, or 1-based position
        column: String,
        title: String,
    },

    /// Delete a column and all of its tasks
    DeleteColumn {
        /// Column id, id prefix, or 1-based position
        column: String,
    },

    /// Move a column to another position
    MoveColumn {
        /// Column id, id prefix, or 1-based position
        column: String,
        /// Target 1-based position
        to: usize,
    },

    /// Add a task to a column
    AddTask {
        /// Column id, id prefix, or 1-based position
        column: String,
        /// Task content (default from config, e.g. "New Task")
        content: Option<String>,
    },

    /// Replace a task's content
    EditTask {
        /// Task id or id prefix
        task: String,
        content: String,
    },

    /// Delete a task
    DeleteTask {
        /// Task id or id prefix
        task: String,
    },

    /// Drag a task into a column, optionally dropping it onto another task
    MoveTask {
        /// Task id or id prefix
        task: String,
        /// Target column id, id prefix, or 1-based position
        column: String,
        /// Task to drop onto; the dragged task takes its position
        #[arg(long, value_name = "TASK")]
        over: Option<String>,
    },

    /// Replay a recorded drag gesture stream (one JSON event per line)
    Replay {
        /// JSONL file of drag events
        file: PathBuf,
        /// Lines are raw pointer input instead of drag events
        #[arg(long)]
        pointer: bool,
    },

    /// Remove every column and task
    Reset {
        /// Also delete the stored data files
        #[arg(long)]
        purge: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortArg {
    TitleAsc,
    TitleDesc,
    TaskCountDesc,
    TaskCountAsc,
}
