use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

pub const LOG_FILE: &str = "dayplan.log";

/// Installs the global logger. `RUST_LOG` takes precedence over `level`.
///
/// With `file` set, records are appended there instead of stderr, which
/// keeps the terminal UI clean.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_millis();
    if let Some(path) = file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {:?}", path))?;
        builder.target(Target::Pipe(Box::new(out)));
    }
    // A second call (tests, repeated init) keeps the first logger.
    let _ = builder.try_init();
    Ok(())
}
