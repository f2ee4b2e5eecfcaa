use crate::date::{format_localized, month_label, to_iso_date, Clock, YearMonth};
use crate::grid::{self, DayCell};
use crate::model::Task;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use chrono::NaiveDate;
use log::debug;

/// Transient UI state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppState {
    pub displayed_month: YearMonth,
    pub selected_date: NaiveDate,
}

impl AppState {
    pub fn on(today: NaiveDate) -> Self {
        AppState {
            displayed_month: YearMonth::of(today),
            selected_date: today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLists {
    pub pending: Vec<Task>,
    pub done: Vec<Task>,
}

impl TaskLists {
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn done_count(&self) -> usize {
        self.done.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    pub month: YearMonth,
    pub label: String,
    pub cells: Vec<DayCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAgenda {
    pub date: NaiveDate,
    /// `DD/MM/YYYY`
    pub label: String,
    /// Pending first, then done; storage order within each group.
    pub tasks: Vec<Task>,
}

/// Everything a renderer needs, computed in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: AppState,
    pub lists: TaskLists,
    pub calendar: CalendarView,
    pub agenda: DayAgenda,
}

pub fn render<S: KeyValueStore>(store: &TaskStore<S>, state: AppState, today: NaiveDate) -> Snapshot {
    let lists = TaskLists {
        pending: store.pending().into_iter().cloned().collect(),
        done: store.done().into_iter().cloned().collect(),
    };

    let calendar = CalendarView {
        month: state.displayed_month,
        label: month_label(state.displayed_month),
        cells: grid::build(state.displayed_month, today, state.selected_date, |d| {
            store.has_any(d)
        }),
    };

    let mut day_tasks: Vec<Task> = store
        .by_date(state.selected_date)
        .into_iter()
        .cloned()
        .collect();
    day_tasks.sort_by_key(|t| t.done);
    let agenda = DayAgenda {
        date: state.selected_date,
        label: format_localized(&to_iso_date(state.selected_date)),
        tasks: day_tasks,
    };

    Snapshot {
        state,
        lists,
        calendar,
        agenda,
    }
}

/// Owns the task store and the transient view state; every operation ends
/// with a full re-render.
pub struct Planner<S> {
    store: TaskStore<S>,
    clock: Box<dyn Clock>,
    state: AppState,
    snapshot: Snapshot,
}

impl<S: KeyValueStore> Planner<S> {
    pub fn new(store: TaskStore<S>, clock: Box<dyn Clock>) -> Self {
        let today = clock.today();
        let state = AppState::on(today);
        let snapshot = render(&store, state, today);
        Planner {
            store,
            clock,
            state,
            snapshot,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn go_to_prev_month(&mut self) {
        self.state.displayed_month = self.state.displayed_month.prev();
        self.refresh();
    }

    pub fn go_to_next_month(&mut self) {
        self.state.displayed_month = self.state.displayed_month.next();
        self.refresh();
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.state.selected_date = date;
        self.refresh();
    }

    pub fn on_task_created(&mut self, date: NaiveDate) {
        self.state.selected_date = date;
        self.state.displayed_month = YearMonth::of(date);
        self.refresh();
    }

    pub fn reset_to_today(&mut self) {
        self.state = AppState::on(self.clock.today());
        self.refresh();
    }

    /// Form submission. A rejected submission changes nothing.
    pub fn submit(&mut self, title: &str, date: &str) -> Option<Task> {
        match self.store.add(title, date, self.clock.as_ref()) {
            Some(task) => {
                self.on_task_created(task.date);
                Some(task)
            }
            None => {
                self.refresh();
                None
            }
        }
    }

    pub fn toggle_done(&mut self, id: &str) {
        self.store.toggle_done(id);
        self.refresh();
    }

    pub fn delete(&mut self, id: &str) {
        self.store.delete(id);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.snapshot = render(&self.store, self.state, self.clock.today());
        debug!(
            "rendered {} selected {}",
            self.state.displayed_month, self.state.selected_date
        );
    }
}
