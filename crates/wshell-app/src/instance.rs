//! Single-instance gate
//!
//! One OS-level shell instance at a time. The primary holds an exclusive
//! lock on `instance.lock` in the data directory and serves a loopback TCP
//! focus channel whose port is recorded in the lock file. A second launch
//! attempt fails the lock, pings the recorded port, and must quit without
//! spawning a daemon or window.

use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::time::Duration;

use fs2::FileExt;
use tokio::sync::mpsc;

use wshell_core::prelude::*;

use crate::events::ShellEvent;

const LOCK_FILE: &str = "instance.lock";
const PING_TIMEOUT: Duration = Duration::from_millis(1000);

/// Result of registering as the single instance
pub enum InstanceGate {
    /// This process is the primary instance; keep the guard alive for the
    /// life of the process
    Primary(PrimaryInstance),
    /// Another instance is already running and has been asked to focus its
    /// window; this process must quit immediately
    AlreadyRunning,
}

/// The primary instance's lock and focus listener
pub struct PrimaryInstance {
    lock_file: File,
    listener: std::net::TcpListener,
}

/// Register as the single running instance.
pub fn acquire(data_dir: &Path) -> Result<InstanceGate> {
    fs::create_dir_all(data_dir)?;
    let lock_path = data_dir.join(LOCK_FILE);
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;

    match file.try_lock_exclusive() {
        Ok(()) => {
            let listener = std::net::TcpListener::bind(("127.0.0.1", 0))
                .map_err(|e| Error::instance_lock(format!("focus listener bind failed: {e}")))?;
            let port = listener
                .local_addr()
                .map_err(|e| Error::instance_lock(format!("focus listener address: {e}")))?
                .port();

            // Record the focus port for future second instances
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            writeln!(file, "{}", port)?;
            file.flush()?;

            listener
                .set_nonblocking(true)
                .map_err(|e| Error::instance_lock(format!("focus listener nonblocking: {e}")))?;

            info!(
                "single-instance lock acquired, focus channel on 127.0.0.1:{}",
                port
            );
            Ok(InstanceGate::Primary(PrimaryInstance {
                lock_file: file,
                listener,
            }))
        }
        Err(_) => {
            info!("another instance is already running, pinging it");
            notify_primary(&lock_path);
            Ok(InstanceGate::AlreadyRunning)
        }
    }
}

/// Best-effort focus ping to the primary instance.
fn notify_primary(lock_path: &Path) {
    let port = fs::read_to_string(lock_path)
        .ok()
        .and_then(|contents| contents.trim().parse::<u16>().ok());
    let Some(port) = port else {
        warn!("primary instance lock file has no focus port");
        return;
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    match TcpStream::connect_timeout(&addr, PING_TIMEOUT) {
        Ok(mut stream) => {
            let _ = stream.write_all(b"focus\n");
        }
        Err(e) => warn!("could not reach primary instance on port {}: {}", port, e),
    }
}

impl PrimaryInstance {
    /// Serve second-instance pings for the life of the process, forwarding
    /// each as [`ShellEvent::SecondInstance`]. The lock stays held as long as
    /// this task runs.
    pub async fn serve(self, event_tx: mpsc::Sender<ShellEvent>) {
        let _lock = self.lock_file;
        let listener = match tokio::net::TcpListener::from_std(self.listener) {
            Ok(listener) => listener,
            Err(e) => {
                error!("focus listener registration failed: {}", e);
                return;
            }
        };

        loop {
            match listener.accept().await {
                Ok((_stream, addr)) => {
                    debug!("second-instance ping from {}", addr);
                    if event_tx.send(ShellEvent::SecondInstance).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("focus listener accept failed: {}", e);
                    break;
                }
            }
        }
    }
}
