//! Dated task planner: a task store, a Monday-first month grid and the
//! view models that keep task lists, calendar and day agenda in step.

pub mod config;
pub mod date;
pub mod grid;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use date::{Clock, FixedClock, SystemClock, YearMonth};
pub use model::Task;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::TaskStore;
pub use view::{Planner, Snapshot};
