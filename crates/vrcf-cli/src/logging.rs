//! Tracing setup for the CLI.
//!
//! Log lines go to a daily-rotated file under ${VRCF_HOME}/logs; the
//! terminal belongs to the prompts and the friends list. The filter comes
//! from the VRCF_LOG environment variable (default "info").

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use vrcf_core::config::paths;

/// Initializes the global subscriber.
///
/// Returns None (and logs nothing) when the log directory cannot be
/// created or a subscriber is already installed. The returned guard must
/// stay alive for the life of the process or buffered lines are dropped.
pub fn init() -> Option<WorkerGuard> {
    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::daily(logs_dir, "vrcf.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("VRCF_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
