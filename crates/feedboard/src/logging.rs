use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Send `tracing` output to the file at `path`, appending.
///
/// The terminal belongs to the dashboard, so logs never go to stdout or
/// stderr. `RUST_LOG` overrides the default `info` filter.
pub fn init(path: &Path) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// Install file logging if `var` names a file; otherwise leave logging off.
pub fn init_from_env(var: &str) -> Result<()> {
    match std::env::var_os(var) {
        Some(path) if !path.is_empty() => init(Path::new(&path)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variable_is_a_no_op() {
        init_from_env("FEEDBOARD_TEST_UNSET_LOG_VARIABLE").unwrap();
    }

    #[test]
    fn unopenable_path_is_reported() {
        let dir = std::env::temp_dir().join("feedboard-missing-dir-for-log-test");
        let _ = std::fs::remove_dir_all(&dir);
        let err = init(&dir.join("nested").join("feedboard.log")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open log file"));
    }
}
