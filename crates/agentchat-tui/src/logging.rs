use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

/// Filter override, checked before `RUST_LOG`
pub const LOG_ENV: &str = "AGENTCHAT_LOG";

const LOG_FILE_NAME: &str = "agentchat.log";

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log file used when the config does not name one
pub fn default_log_path(config_dir: &Path) -> PathBuf {
    config_dir.join(LOG_FILE_NAME)
}

/// Send tracing output to `path`; the terminal belongs to the UI.
pub fn init_logging(path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(LOG_FILE_NAME);
    let writer = tracing_appender::rolling::never(dir, file_name);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);

    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(resolve_env_filter())
        .with(file_layer)
        .try_init();
    Ok(())
}
