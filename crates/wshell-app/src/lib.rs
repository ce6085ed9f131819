//! wshell-app - Shell orchestration for Wallet Shell
//!
//! Joins the daemon supervisor, the readiness barrier and the window
//! controller behind a single event loop, and carries the shell-only
//! concerns: single-instance gating, navigation policy, menu surface,
//! egress restriction and settings.

pub mod app;
pub mod barrier;
pub mod egress;
pub mod events;
pub mod host;
pub mod instance;
pub mod menu;
pub mod navigation;
pub mod settings;
pub mod window;

// Re-export primary types
pub use app::{run, ShellApp, ShellConfig, DEV_SERVER_URL, URL_SCHEME};
pub use barrier::ReadinessBarrier;
pub use events::{ShellEvent, WindowEvent};
pub use host::{SystemHost, WebPreferences, WindowConfig, WindowHost};
pub use instance::{InstanceGate, PrimaryInstance};
pub use menu::MenuAction;
pub use navigation::{AttachDecision, AttachPreferences, NavigationDecision, NavigationPolicy};
pub use settings::ShellSettings;
pub use window::{ResourcePaths, WindowController};

// Re-export daemon types for the binary
pub use wshell_daemon::{DaemonInvocation, Platform, SupervisorState};

#[cfg(any(test, feature = "test-helpers"))]
pub use host::RecordingHost;
