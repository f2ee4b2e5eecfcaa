mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let globals = commands::Globals {
        data_dir: args.data_dir,
        log_level: args.log_level,
    };
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::Add { title, date } => commands::add(&globals, title, date),
        cli::Command::List { date } => commands::list(&globals, date),
        cli::Command::Toggle { id } => commands::toggle(&globals, id),
        cli::Command::Delete { id } => commands::delete(&globals, id),
        cli::Command::Month { month } => commands::month(&globals, month),
        cli::Command::Tui => commands::tui(&globals),
    }
}
