//! Daemon supervision state machine
//!
//! Owns the single wallet daemon process and the single API origin. All
//! mutation of either handle happens here, driven by [`DaemonEvent`]s on the
//! shell's event loop.

use tokio::sync::mpsc;

use crate::locator::DaemonInvocation;
use crate::process::WalletProcess;
use crate::protocol::{MarkerProbe, ReadinessProbe};
use wshell_core::prelude::*;
use wshell_core::{ApiOrigin, DaemonEvent};

/// Supervisor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No daemon has been launched yet
    Idle,
    /// Spawn requested, process not yet confirmed
    Spawning,
    /// Daemon process is live, readiness marker not yet observed
    Running,
    /// API origin discovered, composite readiness pending at the barrier
    ReadinessPending,
    /// Daemon lifetime over (crash, exit, or spawn failure); a fresh
    /// `launch()` is allowed
    Terminated,
}

/// Notifications the supervisor hands to the shell layer
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisorEvent {
    /// API origin discovered (or re-announced for an idempotent launch)
    Ready { origin: ApiOrigin },
    /// Daemon exited or crashed; error view must be shown, relaunch allowed
    Terminated { code: Option<i32> },
    /// Daemon could not be spawned at all; error view, no retry
    SpawnFailed { reason: String },
}

/// Supervisor configuration
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Daemon executable and fixed argument vector
    pub invocation: DaemonInvocation,
    /// Development mode: no process is spawned, the origin is fixed
    pub dev_mode: bool,
    /// Origin announced immediately in development mode
    pub dev_origin: ApiOrigin,
}

/// Supervises the wallet daemon child process.
///
/// State machine: `Idle → Spawning → Running → (ReadinessPending | Terminated)`.
/// At most one process and one origin exist at any time; both are cleared when
/// the daemon terminates so the next `launch()` starts a fresh lifetime.
pub struct DaemonSupervisor<P: ReadinessProbe = MarkerProbe> {
    config: SupervisorConfig,
    state: SupervisorState,
    process: Option<WalletProcess>,
    origin: Option<ApiOrigin>,
    probe: P,
    event_tx: mpsc::Sender<DaemonEvent>,
}

impl DaemonSupervisor<MarkerProbe> {
    pub fn new(config: SupervisorConfig, event_tx: mpsc::Sender<DaemonEvent>) -> Self {
        Self::with_probe(config, event_tx, MarkerProbe::new())
    }
}

impl<P: ReadinessProbe> DaemonSupervisor<P> {
    pub fn with_probe(
        config: SupervisorConfig,
        event_tx: mpsc::Sender<DaemonEvent>,
        probe: P,
    ) -> Self {
        Self {
            config,
            state: SupervisorState::Idle,
            process: None,
            origin: None,
            probe,
            event_tx,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// The immutable origin of the current daemon lifetime, if discovered
    pub fn origin(&self) -> Option<&ApiOrigin> {
        self.origin.as_ref()
    }

    /// Whether a daemon process is currently live
    pub fn is_live(&self) -> bool {
        self.process.as_ref().is_some_and(|p| p.is_running())
    }

    pub fn process_id(&self) -> Option<u32> {
        self.process.as_ref().and_then(|p| p.id())
    }

    /// Launch the wallet daemon. Idempotent: if a daemon is already live this
    /// never spawns a second process; it re-announces readiness when the
    /// origin is known and otherwise leaves discovery to the stdout scan
    /// already in flight.
    ///
    /// In development mode no process is spawned; the origin is the fixed dev
    /// server address and readiness is announced immediately.
    pub fn launch(&mut self) -> Result<Option<SupervisorEvent>> {
        if self.config.dev_mode {
            let origin = self.config.dev_origin.clone();
            info!("dev mode: not spawning a daemon, using {}", origin);
            self.origin = Some(origin.clone());
            self.state = SupervisorState::ReadinessPending;
            return Ok(Some(SupervisorEvent::Ready { origin }));
        }

        if self.is_live() {
            info!("wallet daemon already running");
            return Ok(self
                .origin
                .clone()
                .map(|origin| SupervisorEvent::Ready { origin }));
        }

        self.state = SupervisorState::Spawning;
        // No timeout guards the wait for the readiness marker; a corrupt-db
        // reset can keep the daemon silent for minutes.
        info!("launching wallet daemon, waiting for readiness marker");
        match WalletProcess::spawn(&self.config.invocation, self.event_tx.clone()) {
            Ok(process) => {
                self.process = Some(process);
                self.state = SupervisorState::Running;
                Ok(None)
            }
            Err(e) => {
                self.state = SupervisorState::Terminated;
                // Surface through the event loop so the error view and quit
                // decision happen in one place.
                let _ = self.event_tx.try_send(DaemonEvent::SpawnFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Process one daemon event, returning the notification (if any) the
    /// shell layer must act on.
    pub fn handle_event(&mut self, event: DaemonEvent) -> Option<SupervisorEvent> {
        match event {
            DaemonEvent::Stdout(line) => {
                debug!("daemon: {}", line);
                // Origin is immutable once set for this lifetime
                if self.origin.is_some() {
                    return None;
                }
                let origin = self.probe.feed_line(&line)?;
                self.origin = Some(origin.clone());
                self.state = SupervisorState::ReadinessPending;
                Some(SupervisorEvent::Ready { origin })
            }
            DaemonEvent::Stderr(line) => {
                // Logged only, never a state transition
                if !line.trim().is_empty() {
                    warn!("daemon stderr: {}", line);
                }
                None
            }
            DaemonEvent::Exited { code } => {
                info!("wallet daemon exited with code {:?}", code);
                self.reset_lifetime();
                Some(SupervisorEvent::Terminated { code })
            }
            DaemonEvent::SpawnFailed { reason } => {
                error!("wallet daemon spawn failed: {}", reason);
                self.reset_lifetime();
                Some(SupervisorEvent::SpawnFailed { reason })
            }
        }
    }

    /// Interrupt the daemon (SIGINT) on shell shutdown.
    pub async fn shutdown(&mut self) {
        if let Some(process) = self.process.as_mut() {
            if let Err(e) = process.shutdown().await {
                warn!("wallet daemon shutdown failed: {:?}", e);
            }
        }
        self.reset_lifetime();
        self.state = SupervisorState::Idle;
    }

    /// End the current daemon lifetime: clear the process handle and the
    /// origin so a future `launch()` spawns anew and can never reuse a stale
    /// origin.
    fn reset_lifetime(&mut self) {
        self.process = None;
        self.origin = None;
        self.probe.reset();
        self.state = SupervisorState::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ready_daemon_script, silent_crash_script};
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::sync::mpsc::Receiver;

    fn script_invocation(script: &str) -> DaemonInvocation {
        DaemonInvocation {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string()],
        }
    }

    fn config_for(script: &str) -> SupervisorConfig {
        SupervisorConfig {
            invocation: script_invocation(script),
            dev_mode: false,
            dev_origin: ApiOrigin::parse("http://localhost:4200/").unwrap(),
        }
    }

    fn dev_config() -> SupervisorConfig {
        SupervisorConfig {
            invocation: script_invocation("exit 1"),
            dev_mode: true,
            dev_origin: ApiOrigin::parse("http://localhost:4200/").unwrap(),
        }
    }

    /// Pump daemon events into the supervisor until it produces a
    /// notification or the channel goes quiet.
    async fn drive_until_notice(
        supervisor: &mut DaemonSupervisor,
        rx: &mut Receiver<DaemonEvent>,
    ) -> Option<SupervisorEvent> {
        for _ in 0..100 {
            match tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
                Ok(Some(event)) => {
                    if let Some(notice) = supervisor.handle_event(event) {
                        return Some(notice);
                    }
                }
                _ => break,
            }
        }
        None
    }

    #[tokio::test]
    async fn test_production_launch_discovers_origin() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut supervisor =
            DaemonSupervisor::new(config_for(&ready_daemon_script("127.0.0.1:43210")), tx);

        assert_eq!(supervisor.state(), SupervisorState::Idle);
        assert!(supervisor.launch().unwrap().is_none());
        assert_eq!(supervisor.state(), SupervisorState::Running);

        let notice = drive_until_notice(&mut supervisor, &mut rx).await;
        match notice {
            Some(SupervisorEvent::Ready { origin }) => {
                assert_eq!(origin.to_string(), "http://127.0.0.1:43210");
            }
            other => panic!("expected Ready, got {:?}", other),
        }
        assert_eq!(supervisor.state(), SupervisorState::ReadinessPending);
        assert!(supervisor.origin().is_some());
    }

    #[tokio::test]
    async fn test_launch_is_idempotent_while_live() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut supervisor =
            DaemonSupervisor::new(config_for(&ready_daemon_script("127.0.0.1:43210")), tx);

        supervisor.launch().unwrap();
        let first_pid = supervisor.process_id().expect("daemon should have a pid");

        // Second launch while live: no second OS process
        supervisor.launch().unwrap();
        assert_eq!(supervisor.process_id(), Some(first_pid));

        // After the origin is known, relaunching re-announces readiness
        let notice = drive_until_notice(&mut supervisor, &mut rx).await;
        assert!(matches!(notice, Some(SupervisorEvent::Ready { .. })));
        let announced = supervisor.launch().unwrap();
        assert!(matches!(announced, Some(SupervisorEvent::Ready { .. })));
        assert_eq!(supervisor.process_id(), Some(first_pid));
    }

    #[tokio::test]
    async fn test_crash_resets_and_relaunch_gets_fresh_origin() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut supervisor =
            DaemonSupervisor::new(config_for(&ready_daemon_script("127.0.0.1:43210")), tx);
        supervisor.launch().unwrap();

        let notice = drive_until_notice(&mut supervisor, &mut rx).await;
        assert!(matches!(notice, Some(SupervisorEvent::Ready { .. })));

        // Kill the daemon out from under the supervisor
        supervisor
            .handle_event(DaemonEvent::Exited { code: Some(2) })
            .map(|notice| match notice {
                SupervisorEvent::Terminated { code } => assert_eq!(code, Some(2)),
                other => panic!("expected Terminated, got {:?}", other),
            })
            .expect("exit must produce a notification");

        // Stale origin must never be reused
        assert!(supervisor.origin().is_none());
        assert_eq!(supervisor.state(), SupervisorState::Terminated);

        // Drain events from the first lifetime before relaunching
        while rx.try_recv().is_ok() {}

        // Fresh launch discovers the new daemon's origin
        supervisor.config = config_for(&ready_daemon_script("127.0.0.1:50001"));
        supervisor.launch().unwrap();
        let notice = drive_until_notice(&mut supervisor, &mut rx).await;
        match notice {
            Some(SupervisorEvent::Ready { origin }) => {
                assert_eq!(origin.to_string(), "http://127.0.0.1:50001");
            }
            other => panic!("expected Ready after relaunch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_markerless_exit_is_a_crash() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut supervisor = DaemonSupervisor::new(config_for(&silent_crash_script(3)), tx);
        supervisor.launch().unwrap();

        let notice = drive_until_notice(&mut supervisor, &mut rx).await;
        match notice {
            Some(SupervisorEvent::Terminated { code }) => assert_eq!(code, Some(3)),
            other => panic!("expected Terminated, got {:?}", other),
        }
        assert!(supervisor.origin().is_none());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_surfaced_and_fatal_shaped() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut supervisor = DaemonSupervisor::new(
            SupervisorConfig {
                invocation: DaemonInvocation {
                    executable: PathBuf::from("/nonexistent/walletd"),
                    args: vec![],
                },
                dev_mode: false,
                dev_origin: ApiOrigin::parse("http://localhost:4200/").unwrap(),
            },
            tx,
        );

        let err = supervisor.launch().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(supervisor.state(), SupervisorState::Terminated);

        // The failure is also surfaced through the event loop
        let event = rx.try_recv().expect("SpawnFailed event expected");
        let notice = supervisor.handle_event(event);
        assert!(matches!(notice, Some(SupervisorEvent::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn test_dev_mode_announces_fixed_origin_without_process() {
        let (tx, _rx) = mpsc::channel(64);
        let mut supervisor = DaemonSupervisor::new(dev_config(), tx);

        let notice = supervisor.launch().unwrap();
        match notice {
            Some(SupervisorEvent::Ready { origin }) => {
                assert_eq!(origin.to_string(), "http://localhost:4200");
            }
            other => panic!("expected immediate Ready, got {:?}", other),
        }
        assert!(!supervisor.is_live());
        assert_eq!(supervisor.process_id(), None);
        assert_eq!(supervisor.state(), SupervisorState::ReadinessPending);
    }

    #[tokio::test]
    async fn test_stderr_never_transitions() {
        let (tx, _rx) = mpsc::channel(64);
        let mut supervisor =
            DaemonSupervisor::new(config_for(&ready_daemon_script("127.0.0.1:43210")), tx);
        supervisor.launch().unwrap();

        let notice = supervisor.handle_event(DaemonEvent::Stderr(
            "Starting web interface on 127.0.0.1:1".to_string(),
        ));
        assert!(notice.is_none());
        assert!(supervisor.origin().is_none());
        assert_eq!(supervisor.state(), SupervisorState::Running);
    }
}
