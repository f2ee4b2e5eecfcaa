use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dayplan", version, about = "Dated tasks with a month calendar")]
pub struct Cli {
    /// Use this data directory instead of searching for one
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project task store in the current directory
    Init,
    /// Add a task
    Add {
        /// Title of the task
        title: String,
        /// Day of the task in YYYY-MM-DD format (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List pending and done tasks, or one day's agenda
    List {
        /// Only show tasks on this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Flip a task between pending and done
    Toggle {
        /// Task id
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
    /// Print a month calendar
    Month {
        /// Month in YYYY-MM format (defaults to the current month)
        month: Option<String>,
    },
    /// Launch the interactive TUI
    Tui,
}
