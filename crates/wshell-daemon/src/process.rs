//! Wallet daemon process management

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, Notify};

use crate::locator::DaemonInvocation;
use wshell_core::events::DaemonEvent;
use wshell_core::prelude::*;

/// Manages a wallet daemon child process.
///
/// The `Child` handle is moved into a dedicated `wait_for_exit` background task
/// that calls `child.wait()`. This ensures the real exit code is captured and
/// emitted as `DaemonEvent::Exited { code: Some(N) }` rather than always `None`.
///
/// `WalletProcess` retains a kill channel ([`kill_tx`]) to request a force-kill,
/// an atomic flag ([`exited`]) for synchronous `has_exited()` checks, and a
/// [`Notify`] handle so `shutdown()` can await graceful exit without holding a
/// lock across `.await`.
pub struct WalletProcess {
    /// Process ID for logging and signal delivery
    pid: Option<u32>,
    /// One-shot sender that tells the wait task to force-kill the process.
    /// Consumed on first use (or on drop).
    kill_tx: Option<oneshot::Sender<()>>,
    /// Set to `true` by the wait task once the child has exited.
    /// Allows synchronous `has_exited()` / `is_running()` checks.
    exited: Arc<AtomicBool>,
    /// Notified by the wait task immediately after the child exits.
    /// Used by `shutdown()` to await graceful termination without polling.
    exit_notify: Arc<Notify>,
}

impl WalletProcess {
    /// Spawn the wallet daemon with the locator's path and argument vector.
    ///
    /// Events are sent to `event_tx` for processing by the shell event loop.
    pub fn spawn(
        invocation: &DaemonInvocation,
        event_tx: mpsc::Sender<DaemonEvent>,
    ) -> Result<Self> {
        // An absolute path that does not exist can never spawn; report it as
        // the dedicated not-found error. Relative paths resolve against the
        // working directory at exec time, so those go straight to spawn.
        if invocation.executable.is_absolute() && !invocation.executable.exists() {
            return Err(Error::DaemonNotFound {
                path: invocation.executable.clone(),
            });
        }

        info!(
            "Spawning wallet daemon: {} {}",
            invocation.executable.display(),
            invocation.args.join(" ")
        );

        let command = Command::new(&invocation.executable);
        Self::spawn_command(command, &invocation.args, event_tx)
    }

    /// Internal spawn implementation shared with the test helpers.
    pub(crate) fn spawn_command(
        mut command: Command,
        args: &[String],
        event_tx: mpsc::Sender<DaemonEvent>,
    ) -> Result<Self> {
        let mut child = command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true) // Critical: cleanup on drop
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::process_spawn("wallet daemon executable not found")
                } else {
                    Error::process_spawn(e.to_string())
                }
            })?;

        let pid = child.id();
        info!("Wallet daemon started with PID: {:?}", pid);

        // Spawn stdout reader task (never emits Exited — that's the wait task's job)
        let stdout = child.stdout.take().expect("stdout was configured");
        tokio::spawn(Self::stdout_reader(stdout, event_tx.clone()));

        // Spawn stderr reader task
        let stderr = child.stderr.take().expect("stderr was configured");
        tokio::spawn(Self::stderr_reader(stderr, event_tx.clone()));

        // Shared exit-state primitives
        let exited = Arc::new(AtomicBool::new(false));
        let exit_notify = Arc::new(Notify::new());

        // Kill channel: WalletProcess holds the sender, wait task holds the receiver.
        let (kill_tx, kill_rx) = oneshot::channel::<()>();

        // Spawn the dedicated wait task — takes ownership of `child`.
        tokio::spawn(Self::wait_for_exit(
            child,
            kill_rx,
            event_tx,
            Arc::clone(&exited),
            Arc::clone(&exit_notify),
        ));

        Ok(Self {
            pid,
            kill_tx: Some(kill_tx),
            exited,
            exit_notify,
        })
    }

    /// Background task: owns `child`, waits for it to exit, emits `DaemonEvent::Exited`.
    ///
    /// Two ways the task can end:
    /// 1. The daemon exits on its own — `child.wait()` resolves.
    /// 2. `kill_rx` fires — we kill the child first, then wait for it.
    async fn wait_for_exit(
        mut child: Child,
        kill_rx: oneshot::Receiver<()>,
        event_tx: mpsc::Sender<DaemonEvent>,
        exited: Arc<AtomicBool>,
        exit_notify: Arc<Notify>,
    ) {
        let code: Option<i32> = tokio::select! {
            // Natural exit path
            result = child.wait() => {
                match result {
                    Ok(status) => {
                        info!("Wallet daemon exited with status: {:?}", status);
                        status.code()
                    }
                    Err(e) => {
                        error!("Error waiting for wallet daemon: {}", e);
                        None
                    }
                }
            }
            // Force-kill path: kill_tx was sent (by shutdown or drop)
            _ = kill_rx => {
                info!("Kill signal received, force-killing wallet daemon");
                if let Err(e) = child.kill().await {
                    error!("Failed to kill wallet daemon: {}", e);
                }
                match child.wait().await {
                    Ok(status) => {
                        info!("Wallet daemon killed, exit status: {:?}", status);
                        status.code()
                    }
                    Err(e) => {
                        error!("Error waiting after kill: {}", e);
                        None
                    }
                }
            }
        };

        // Mark process as exited and wake any waiters before sending the event.
        // This order ensures `has_exited()` is true before callers observe the event.
        exited.store(true, Ordering::Release);
        exit_notify.notify_waiters();

        debug!("Sending DaemonEvent::Exited {{ code: {:?} }}", code);
        let _ = event_tx.send(DaemonEvent::Exited { code }).await;
    }

    /// Read lines from stdout and send as `DaemonEvent::Stdout`.
    ///
    /// Does NOT emit `DaemonEvent::Exited` — that is the responsibility of the
    /// `wait_for_exit` task, which captures the real exit code.
    async fn stdout_reader(stdout: tokio::process::ChildStdout, tx: mpsc::Sender<DaemonEvent>) {
        let mut reader = BufReader::new(stdout).lines();

        while let Ok(Some(line)) = reader.next_line().await {
            trace!("stdout: {}", line);

            if tx.send(DaemonEvent::Stdout(line)).await.is_err() {
                debug!("stdout channel closed");
                break;
            }
        }

        // Stdout EOF just means the pipe closed; the process may still be
        // shutting down. The wait_for_exit task will emit DaemonEvent::Exited
        // with the real exit code.
        info!("stdout reader finished, daemon likely exiting");
    }

    /// Read lines from stderr and send as DaemonEvents
    async fn stderr_reader(stderr: tokio::process::ChildStderr, tx: mpsc::Sender<DaemonEvent>) {
        let mut reader = BufReader::new(stderr).lines();

        while let Ok(Some(line)) = reader.next_line().await {
            trace!("stderr: {}", line);

            if tx.send(DaemonEvent::Stderr(line)).await.is_err() {
                debug!("stderr channel closed");
                break;
            }
        }

        debug!("stderr reader finished");
    }

    /// Gracefully shut the daemon down.
    ///
    /// 1. Early exit if the process is already dead (atomic check — no lock)
    /// 2. Deliver an interrupt signal so the daemon can flush its database
    /// 3. Wait up to 2s for graceful exit via `exit_notify`
    /// 4. Send the kill signal to the wait task if graceful exit times out
    pub async fn shutdown(&mut self) -> Result<()> {
        use std::time::Duration;
        use tokio::time::timeout;

        // Fast path: if process already exited, we're done
        if self.has_exited() {
            info!("Wallet daemon already exited, skipping shutdown signal");
            return Ok(());
        }

        info!("Initiating wallet daemon shutdown");
        self.interrupt();

        // Race-free pattern: create the `notified()` future BEFORE the final
        // `has_exited()` check, so we cannot miss a notification that fires
        // between the check and the await.
        let notified = self.exit_notify.notified();
        if self.has_exited() {
            info!("Wallet daemon exited gracefully");
            return Ok(());
        }

        match timeout(Duration::from_secs(2), notified).await {
            Ok(()) => {
                info!("Wallet daemon exited gracefully");
                Ok(())
            }
            Err(_) => {
                warn!("Timeout waiting for graceful exit, force killing");
                self.force_kill()
            }
        }
    }

    /// Deliver SIGINT to the daemon so it can shut down cleanly.
    #[cfg(unix)]
    fn interrupt(&self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        match self.pid {
            Some(pid) => {
                if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGINT) {
                    warn!("Failed to deliver SIGINT to wallet daemon: {}", e);
                }
            }
            None => warn!("No PID recorded, cannot deliver SIGINT"),
        }
    }

    /// Windows has no SIGINT delivery for detached children; route through
    /// the wait task's kill path instead.
    #[cfg(not(unix))]
    fn interrupt(&self) {
        // The shutdown timeout path triggers force_kill; nothing to do here.
    }

    /// Force kill the process by signalling the wait task.
    ///
    /// The wait task calls `child.kill()` and then `child.wait()`, ensuring the
    /// OS reaps the process correctly before emitting `DaemonEvent::Exited`.
    fn force_kill(&mut self) -> Result<()> {
        warn!("Force killing wallet daemon via kill channel");
        if let Some(tx) = self.kill_tx.take() {
            // Ignore send error — the wait task may have already exited naturally.
            let _ = tx.send(());
        }
        Ok(())
    }

    /// Check if the process has already exited.
    ///
    /// This is a non-blocking, synchronous check backed by an atomic flag that
    /// is set by the `wait_for_exit` task. It takes `&self` and never races
    /// with `child.wait()`.
    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }

    /// Check if the process is still running.
    ///
    /// This is the logical complement of `has_exited()`.
    pub fn is_running(&self) -> bool {
        !self.has_exited()
    }

    /// Get the process ID
    pub fn id(&self) -> Option<u32> {
        self.pid
    }
}

impl Drop for WalletProcess {
    fn drop(&mut self) {
        if !self.has_exited() {
            warn!("WalletProcess dropped while daemon may still be running");
            // Send kill signal so the wait task tears down the child cleanly.
            // If kill_tx was already consumed by shutdown(), this is a no-op.
            if let Some(tx) = self.kill_tx.take() {
                let _ = tx.send(());
            }
        }
        // kill_on_drop(true) on the Child is the final safety net if the
        // wait task hasn't had a chance to handle the kill yet.
        debug!("WalletProcess dropped");
    }
}
