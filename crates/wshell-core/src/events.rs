//! Domain event definitions

/// Events from the wallet daemon process
///
/// The daemon communicates with the shell through its stdio streams only;
/// these events are the complete inter-process surface.
#[derive(Debug, Clone)]
pub enum DaemonEvent {
    /// Raw stdout line from the daemon (scanned for the readiness marker)
    Stdout(String),

    /// Stderr output (logged only, never a state transition)
    Stderr(String),

    /// Daemon process has exited
    Exited { code: Option<i32> },

    /// Process spawn failed
    SpawnFailed { reason: String },
}

impl DaemonEvent {
    /// Short name for logging/diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            DaemonEvent::Stdout(_) => "Stdout",
            DaemonEvent::Stderr(_) => "Stderr",
            DaemonEvent::Exited { .. } => "Exited",
            DaemonEvent::SpawnFailed { .. } => "SpawnFailed",
        }
    }

    /// True for the two terminal events that end a daemon lifetime
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DaemonEvent::Exited { .. } | DaemonEvent::SpawnFailed { .. }
        )
    }
}
