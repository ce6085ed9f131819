//! Shell-level event definitions
//!
//! Everything the event loop reacts to flows through [`ShellEvent`]: daemon
//! stdio/lifecycle events, window-surface events, second-instance pings and
//! menu actions.

use wshell_core::DaemonEvent;

use crate::menu::MenuAction;

/// Events originating from the window surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// A page load completed (`did-finish-load` equivalent)
    FinishedLoad,
    /// The window was closed by the user
    Closed,
    /// The application was re-activated with no window open (dock click)
    Activated,
}

/// The merged event stream consumed by the shell's single event loop
#[derive(Debug)]
pub enum ShellEvent {
    Daemon(DaemonEvent),
    Window(WindowEvent),
    /// A second OS-level instance tried to start and pinged us
    SecondInstance,
    /// A menu item was activated
    Menu(MenuAction),
    /// Wallet folder path reported by the daemon API (cosmetic)
    WalletFolderResolved(String),
    /// Quit requested
    Quit,
}
