//! Test utilities for daemon supervision
//!
//! Provides helpers that stand in a shell one-liner for the wallet daemon,
//! exercising the real spawn/reader/wait machinery without a walletd binary.

use tokio::process::Command;
use tokio::sync::mpsc;

use crate::process::WalletProcess;
use wshell_core::events::DaemonEvent;
use wshell_core::Result;

/// Spawn `sh -c <script>` through the normal process machinery.
///
/// The script's stdout/stderr flow through the same reader tasks as real
/// daemon output.
pub fn spawn_script(script: &str, event_tx: mpsc::Sender<DaemonEvent>) -> Result<WalletProcess> {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    WalletProcess::spawn_command(command, &[], event_tx)
}

/// Script that prints the readiness marker for `host_port`, then keeps the
/// process alive like a serving daemon.
pub fn ready_daemon_script(host_port: &str) -> String {
    format!(
        "echo 'Loading blockchain database'; \
         echo 'Starting web interface on {}'; \
         sleep 30",
        host_port
    )
}

/// Script that exits with `code` before ever printing the marker,
/// indistinguishable from a crash.
pub fn silent_crash_script(code: i32) -> String {
    format!("echo 'Loading blockchain database'; exit {}", code)
}
