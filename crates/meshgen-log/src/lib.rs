//! Structured logging for the terrain generator.
//!
//! Console output through `tracing-subscriber`, filtered by `RUST_LOG` or the
//! configured level, plus a JSON log file in debug builds. `log` records from
//! the configuration crate are forwarded into the same subscriber.

use std::path::{Path, PathBuf};

use meshgen_config::Config;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// File name of the JSON log written in debug builds.
pub const LOG_FILE_NAME: &str = "meshgen.log";

/// Initialize the global tracing subscriber.
///
/// - Console output with uptime timestamps, targets and levels
/// - JSON file logging to `log_dir/meshgen.log` when `debug_build` is set
/// - `RUST_LOG` takes precedence over `config.debug.log_level`
///
/// Returns the path of the JSON log when one was opened. A log directory that
/// cannot be created only disables the file layer.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use meshgen_config::Config;
/// use meshgen_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config)).unwrap();
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Result<Option<PathBuf>, TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config_filter(config));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).try_init()?;
        let path = log_dir.join(LOG_FILE_NAME);
        tracing::debug!(path = %path.display(), "json log file opened");
        return Ok(Some(path));
    }

    subscriber.try_init()?;
    Ok(None)
}

/// Filter built from the config's log level, or [`DEFAULT_FILTER`].
///
/// An unparsable level falls back to the default rather than disabling logs.
pub fn config_filter(config: Option<&Config>) -> EnvFilter {
    config
        .map(|c| c.debug.log_level.as_str())
        .filter(|level| !level.trim().is_empty())
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(default_env_filter)
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
