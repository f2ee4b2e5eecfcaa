//! End-to-end flows through the planner with a file-backed store.

use chrono::NaiveDate;
use dayplan::store::{IdSource, DEFAULT_STORAGE_KEY};
use dayplan::view::AppState;
use dayplan::{FileStore, FixedClock, KeyValueStore, Planner, TaskStore, YearMonth};
use pretty_assertions::assert_eq;
use std::fs;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Counter(usize);

impl IdSource for Counter {
    fn next_id(&mut self) -> String {
        self.0 += 1;
        format!("task-{}", self.0)
    }
}

fn open(dir: &std::path::Path, today: NaiveDate) -> Planner<FileStore> {
    let store = TaskStore::open(FileStore::new(dir));
    Planner::new(store, Box::new(FixedClock::on(today)))
}

#[test]
fn dentist_scenario_survives_a_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let today = ymd(2025, 3, 5);

    let mut planner = open(tmp.path(), today);
    assert!(planner.store().is_empty());
    let task = planner.submit("Dentist", "2025-06-15").unwrap();

    let view = planner.snapshot();
    assert_eq!(view.lists.pending_count(), 1);
    assert_eq!(view.lists.done_count(), 0);
    assert_eq!(
        planner.state(),
        AppState {
            displayed_month: YearMonth::new(2025, 6).unwrap(),
            selected_date: ymd(2025, 6, 15),
        }
    );
    let fifteenth = view
        .calendar
        .cells
        .iter()
        .find(|c| c.date == ymd(2025, 6, 15))
        .unwrap();
    assert!(fifteenth.has_tasks);
    assert!(!fifteenth.is_overflow);
    assert_eq!(view.calendar.label, "Junio 2025");
    assert_eq!(view.agenda.label, "15/06/2025");

    // A fresh process sees the same tasks but starts back on today.
    let reopened = open(tmp.path(), today);
    assert_eq!(reopened.store().tasks(), &[task]);
    assert_eq!(reopened.state(), AppState::on(today));
}

#[test]
fn persisted_payload_uses_task_field_names() {
    let tmp = tempfile::tempdir().unwrap();
    let store = TaskStore::open_with(
        FileStore::new(tmp.path()),
        DEFAULT_STORAGE_KEY,
        Box::new(Counter(0)),
    );
    let mut planner = Planner::new(store, Box::new(FixedClock::on(ymd(2025, 3, 5))));
    let task = planner.submit("Call mum", "2025-03-10").unwrap();
    planner.toggle_done(&task.id);

    let raw = FileStore::new(tmp.path())
        .get(DEFAULT_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "id": "task-1",
            "title": "Call mum",
            "date": "2025-03-10",
            "done": true,
            "createdAt": task.created_at,
        }])
    );
}

#[test]
fn corrupt_file_starts_empty_and_is_replaced_on_next_write() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join(format!("{}.json", DEFAULT_STORAGE_KEY)),
        "definitely not json",
    )
    .unwrap();

    let mut planner = open(tmp.path(), ymd(2025, 3, 5));
    assert!(planner.store().is_empty());
    assert_eq!(planner.snapshot().lists.pending_count(), 0);

    planner.submit("fresh", "2025-03-06").unwrap();
    let reopened = open(tmp.path(), ymd(2025, 3, 5));
    assert_eq!(reopened.store().len(), 1);
}

#[test]
fn views_stay_consistent_across_mutations() {
    let tmp = tempfile::tempdir().unwrap();
    let mut planner = open(tmp.path(), ymd(2025, 3, 5));
    let a = planner.submit("a", "2025-03-10").unwrap();
    let b = planner.submit("b", "2025-03-11").unwrap();
    planner.toggle_done(&a.id);
    planner.select_date(ymd(2025, 3, 10));

    let view = planner.snapshot();
    assert_eq!(view.lists.pending, vec![b.clone()]);
    assert_eq!(view.lists.done.len(), 1);
    assert!(view.agenda.tasks[0].done);
    let marked: Vec<NaiveDate> = view
        .calendar
        .cells
        .iter()
        .filter(|c| c.has_tasks)
        .map(|c| c.date)
        .collect();
    assert_eq!(marked, vec![ymd(2025, 3, 10), ymd(2025, 3, 11)]);

    planner.delete(&a.id);
    planner.delete("missing");
    let view = planner.snapshot();
    assert!(view.agenda.tasks.is_empty());
    assert_eq!(view.lists.done_count(), 0);
    assert_eq!(view.lists.pending_count(), 1);
}
