//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/wallet-shell/logs/`.
/// Log level is controlled by the `WSHELL_LOG` environment variable.
///
/// # Examples
/// ```bash
/// WSHELL_LOG=debug cargo run
/// WSHELL_LOG=trace cargo run
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "wshell.log");

    // Default to info, allow override via WSHELL_LOG
    let env_filter = EnvFilter::try_from_env("WSHELL_LOG").unwrap_or_else(|_| {
        EnvFilter::new("wallet_shell=info,wshell_core=info,wshell_daemon=info,wshell_app=info,warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Wallet Shell starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("wallet-shell").join("logs")
}

/// Get the log file path for the current day
pub fn current_log_file() -> PathBuf {
    get_log_directory().join("wshell.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_is_scoped_to_app() {
        let dir = get_log_directory();
        assert!(dir.ends_with("wallet-shell/logs"));
    }

    #[test]
    fn test_current_log_file_name() {
        assert_eq!(
            current_log_file().file_name().unwrap().to_str().unwrap(),
            "wshell.log"
        );
    }
}
