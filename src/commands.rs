use crate::ui;
use anyhow::{anyhow, Result};
use dayplan::config::{init_config, load_config, Config, CONFIG_FILE};
use dayplan::date::{format_localized, parse_iso_date, to_iso_date, Clock, SystemClock, YearMonth};
use dayplan::grid::{weeks, DayCell, WEEKDAY_HEADERS};
use dayplan::logging;
use dayplan::model::Task;
use dayplan::storage::{init_project_store, locate_store, FileStore, KeyValueStore, StoreLocation};
use dayplan::store::{RandomIds, TaskStore};
use dayplan::view::{render, AppState, CalendarView, Planner};
use log::info;
use std::env;
use std::path::PathBuf;

/// Shared options from the command line.
pub struct Globals {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

pub fn init() -> Result<()> {
    let location = init_project_store()?;
    if init_config(&location.dir)? {
        println!("Wrote default {}", location.dir.join(CONFIG_FILE).display());
    }
    println!("Initialized task store at {}", location.dir.display());
    Ok(())
}

pub fn add(globals: &Globals, title: String, date: Option<String>) -> Result<()> {
    let (mut planner, _) = open_planner(globals, false)?;
    let date = date.unwrap_or_else(|| to_iso_date(SystemClock.today()));
    match planner.submit(&title, &date) {
        Some(task) => println!(
            "{}",
            with_save_status(
                &planner,
                format!("Added task {} on {}", task.id, format_localized(&task.iso_date()))
            )
        ),
        None => println!("Nothing added: a title and a YYYY-MM-DD date are required"),
    }
    Ok(())
}

pub fn list(globals: &Globals, date: Option<String>) -> Result<()> {
    let (mut planner, location) = open_planner(globals, false)?;
    println!("Tasks ({})", location.scope.label());
    if let Some(raw) = date {
        let day = parse_iso_date(&raw).ok_or_else(|| anyhow!("invalid date (use YYYY-MM-DD): {}", raw))?;
        planner.select_date(day);
        let agenda = &planner.snapshot().agenda;
        println!("Agenda {}", agenda.label);
        if agenda.tasks.is_empty() {
            println!("  No tasks for this day");
        }
        for task in &agenda.tasks {
            println!("  [{}] {}: {}", if task.done { 'x' } else { ' ' }, task.id, task.title);
        }
        return Ok(());
    }
    let lists = &planner.snapshot().lists;
    println!("Pending ({})", lists.pending_count());
    lists.pending.iter().for_each(print_task);
    println!();
    println!("Done ({})", lists.done_count());
    lists.done.iter().for_each(print_task);
    Ok(())
}

pub fn toggle(globals: &Globals, id: String) -> Result<()> {
    let (mut planner, _) = open_planner(globals, false)?;
    println!("{}", toggle_report(&mut planner, &id));
    Ok(())
}

pub fn delete(globals: &Globals, id: String) -> Result<()> {
    let (mut planner, _) = open_planner(globals, false)?;
    println!("{}", delete_report(&mut planner, &id));
    Ok(())
}

/// Unknown ids leave the store untouched; the command still says so.
fn toggle_report<S: KeyValueStore>(planner: &mut Planner<S>, id: &str) -> String {
    if planner.store().get(id).is_none() {
        return format!("No task {}", id);
    }
    planner.toggle_done(id);
    let done = planner.store().get(id).map(|t| t.done).unwrap_or_default();
    let message = format!("Task {} is now {}", id, if done { "done" } else { "pending" });
    with_save_status(planner, message)
}

fn delete_report<S: KeyValueStore>(planner: &mut Planner<S>, id: &str) -> String {
    if planner.store().get(id).is_none() {
        return format!("No task {}", id);
    }
    planner.delete(id);
    with_save_status(planner, format!("Deleted task {}", id))
}

fn with_save_status<S: KeyValueStore>(planner: &Planner<S>, message: String) -> String {
    if planner.store().has_unsaved_changes() {
        format!("{}, but it could not be saved", message)
    } else {
        message
    }
}

pub fn month(globals: &Globals, month: Option<String>) -> Result<()> {
    let (planner, _) = open_planner(globals, false)?;
    let today = SystemClock.today();
    let displayed = match month {
        Some(raw) => YearMonth::parse(&raw)
            .ok_or_else(|| anyhow!("invalid month (use YYYY-MM): {}", raw))?,
        None => YearMonth::of(today),
    };
    let state = AppState {
        displayed_month: displayed,
        selected_date: today,
    };
    let snapshot = render(planner.store(), state, today);
    print!("{}", format_month(&snapshot.calendar));
    Ok(())
}

pub fn tui(globals: &Globals) -> Result<()> {
    let (planner, location) = open_planner(globals, true)?;
    ui::run(planner, location)
}

fn open_planner(globals: &Globals, log_to_file: bool) -> Result<(Planner<FileStore>, StoreLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_store(&cwd, globals.data_dir.as_deref())?;
    let config: Config = load_config(&location.dir)?;
    let level = globals.log_level.as_deref().unwrap_or(&config.log_level);
    let log_file = log_to_file.then(|| location.dir.join(logging::LOG_FILE));
    logging::init(level, log_file.as_deref())?;
    info!(
        "using {} store at {}",
        location.scope.label(),
        location.dir.display()
    );
    let store = TaskStore::open_with(
        location.file_store(),
        config.storage_key.clone(),
        Box::new(RandomIds),
    );
    Ok((Planner::new(store, Box::new(SystemClock)), location))
}

fn print_task(task: &Task) {
    println!("  - {}: {}", task.id, task.title);
    println!("    📌 {}", format_localized(&task.iso_date()));
}

/// Plain-text month grid: `<d>` selected, `[d]` today, `·d·` other months,
/// `*` when the day has tasks.
pub fn format_month(calendar: &CalendarView) -> String {
    let mut out = format!("{}\n", calendar.label);
    for header in WEEKDAY_HEADERS {
        out.push_str(&format!(" {:>2}  ", header));
    }
    out.push('\n');
    for week in weeks(&calendar.cells) {
        let line: String = week.iter().map(cell_text).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn cell_text(cell: &DayCell) -> String {
    let (open, close) = if cell.is_selected {
        ('<', '>')
    } else if cell.is_today {
        ('[', ']')
    } else if cell.is_overflow {
        ('·', '·')
    } else {
        (' ', ' ')
    };
    let mark = if cell.has_tasks { '*' } else { ' ' };
    format!("{}{:>2}{}{}", open, cell.day_number, close, mark)
}
