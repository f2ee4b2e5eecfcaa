use crate::date::{parse_iso_date, Clock};
use crate::model::{Task, TaskId};
use crate::storage::KeyValueStore;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::HashSet;

pub const DEFAULT_STORAGE_KEY: &str = "dayplan_tasks_v1";

const ID_LEN: usize = 16;
const ID_ATTEMPTS: usize = 8;

/// Supplies identifiers for new tasks.
pub trait IdSource {
    fn next_id(&mut self) -> TaskId;
}

#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> TaskId {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LEN)
            .map(char::from)
            .collect()
    }
}

/// Ordered task collection, written through to a [`KeyValueStore`] after
/// every successful mutation.
pub struct TaskStore<S> {
    backend: S,
    key: String,
    tasks: Vec<Task>,
    ids: Box<dyn IdSource>,
    last_created_at: i64,
    /// Set when the latest write-through failed.
    unsaved: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn open(backend: S) -> Self {
        Self::open_with(backend, DEFAULT_STORAGE_KEY, Box::new(RandomIds))
    }

    pub fn open_with(backend: S, key: impl Into<String>, ids: Box<dyn IdSource>) -> Self {
        let key = key.into();
        let tasks = load(&backend, &key);
        let last_created_at = tasks.iter().map(|t| t.created_at).max().unwrap_or(i64::MIN);
        TaskStore {
            backend,
            key,
            tasks,
            ids,
            last_created_at,
            unsaved: false,
        }
    }

    /// Appends a new pending task. Returns `None` and leaves the store
    /// untouched when the trimmed title is empty or `date` is not an ISO date.
    pub fn add(&mut self, title: &str, date: &str, clock: &dyn Clock) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() {
            debug!("rejected task with empty title");
            return None;
        }
        let Some(date) = parse_iso_date(date) else {
            debug!("rejected task {:?} with invalid date {:?}", title, date);
            return None;
        };
        let created_at = clock.now_millis().max(self.last_created_at.saturating_add(1));
        let id = self.fresh_id(created_at);
        let task = Task::new(id, title.to_string(), date, created_at);
        self.last_created_at = created_at;
        self.tasks.push(task.clone());
        debug!("added task {} on {}", task.id, task.iso_date());
        self.persist();
        Some(task)
    }

    pub fn toggle_done(&mut self, id: &str) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("toggle ignored, no task {}", id);
            return;
        };
        task.done = !task.done;
        debug!("task {} done={}", id, task.done);
        self.persist();
    }

    pub fn delete(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!("delete ignored, no task {}", id);
            return;
        }
        debug!("deleted task {}", id);
        self.persist();
    }

    pub fn by_date(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.date == date).collect()
    }

    pub fn has_any(&self, date: NaiveDate) -> bool {
        self.tasks.iter().any(|t| t.date == date)
    }

    pub fn pending(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.done).collect()
    }

    pub fn done(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.done).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// `true` while the in-memory list is ahead of what the backend holds.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    fn fresh_id(&mut self, created_at: i64) -> TaskId {
        for _ in 0..ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !id.is_empty() && self.get(&id).is_none() {
                return id;
            }
        }
        warn!("id source kept colliding, falling back to a time-based id");
        let mut n = 0usize;
        loop {
            let id = format!("t{}-{}", created_at, n);
            if self.get(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }

    fn persist(&mut self) {
        let payload = match serde_json::to_string(&self.tasks) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("unable to serialize tasks: {}", err);
                self.unsaved = true;
                return;
            }
        };
        match self.backend.set(&self.key, &payload) {
            Ok(()) => self.unsaved = false,
            Err(err) => {
                warn!("unable to save tasks: {}", err);
                self.unsaved = true;
            }
        }
    }
}

/// Reads the task list under `key`. Anything unreadable counts as empty.
pub fn load(backend: &dyn KeyValueStore, key: &str) -> Vec<Task> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            info!("no tasks stored under {}, starting empty", key);
            return Vec::new();
        }
        Err(err) => {
            warn!("unable to read tasks: {}; starting empty", err);
            return Vec::new();
        }
    };
    let parsed: Vec<Task> = match serde_json::from_str::<Option<Vec<Task>>>(&raw) {
        Ok(tasks) => tasks.unwrap_or_default(),
        Err(err) => {
            warn!("stored tasks are corrupt ({}); starting empty", err);
            return Vec::new();
        }
    };
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(parsed.len());
    for task in parsed {
        if seen.insert(task.id.clone()) {
            tasks.push(task);
        } else {
            warn!("dropping task with duplicate id {}", task.id);
        }
    }
    info!("loaded {} task(s)", tasks.len());
    tasks
}
