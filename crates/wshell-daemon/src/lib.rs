//! # wshell-daemon - Wallet Daemon Process Management
//!
//! Locates, spawns and supervises the external `walletd` process, and scans
//! its stdout for the readiness marker that carries the dynamically assigned
//! HTTP API origin.
//!
//! Depends on [`wshell_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Location (`locator`)
//! - [`Platform`] - Packaging layout identifier (darwin/win32/linux/other)
//! - [`DaemonInvocation`] - Resolved executable path + fixed argument vector
//! - [`daemon_executable()`], [`daemon_args()`] - The underlying pure functions
//!
//! ### Process Management (`process`)
//! - [`WalletProcess`] - Spawn and manage the walletd child process
//!
//! ### Readiness Protocol (`protocol`)
//! - [`ReadinessProbe`] - Interface over origin discovery
//! - [`MarkerProbe`] - Stdout scan for [`READINESS_MARKER`]
//!
//! ### Supervision (`supervisor`)
//! - [`DaemonSupervisor`] - The `Idle → Spawning → Running →
//!   (ReadinessPending | Terminated)` state machine
//! - [`SupervisorEvent`] - Ready / Terminated / SpawnFailed notifications
//!
//! ### Wallet API (`wallet_api`)
//! - [`WalletApiClient`] - Best-effort wallets-folder lookup

pub mod locator;
pub mod process;
pub mod protocol;
pub mod supervisor;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod wallet_api;

// Public API re-exports
pub use locator::{daemon_args, daemon_executable, DaemonInvocation, Platform, DAEMON_BINARY};
pub use process::WalletProcess;
pub use protocol::{MarkerProbe, ReadinessProbe, READINESS_MARKER};
pub use supervisor::{DaemonSupervisor, SupervisorConfig, SupervisorEvent, SupervisorState};
pub use wallet_api::{WalletApiClient, WalletFolder};
