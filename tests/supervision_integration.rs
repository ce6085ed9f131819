//! End-to-end supervision tests using a scripted stand-in daemon
//!
//! These drive the real spawn/reader/wait machinery with `sh` one-liners in
//! place of walletd, and a recording window host in place of the browser
//! surface.
//!
//! Run with: cargo test --test supervision_integration

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

use wshell_app::{
    RecordingHost, ShellApp, ShellConfig, ShellEvent, ShellSettings, WindowEvent,
};
use wshell_core::DaemonEvent;
use wshell_daemon::test_utils::{ready_daemon_script, silent_crash_script};
use wshell_daemon::DaemonInvocation;

const SPLASH_URL: &str = "file:///opt/wallet-shell/resources/splash/index.html";
const ERROR_URL: &str = "file:///opt/wallet-shell/resources/error-alert/index.html";

struct Shell {
    app: ShellApp<RecordingHost>,
    daemon_rx: mpsc::Receiver<DaemonEvent>,
    _event_rx: mpsc::Receiver<ShellEvent>,
}

fn start_shell(dev_mode: bool, daemon_script: &str) -> Shell {
    let (event_tx, event_rx) = mpsc::channel(64);
    let (daemon_tx, daemon_rx) = mpsc::channel(64);
    let config = ShellConfig {
        dev_mode,
        invocation: DaemonInvocation {
            executable: PathBuf::from("sh"),
            args: vec!["-c".to_string(), daemon_script.to_string()],
        },
        data_dir: std::env::temp_dir().join("wallet-shell-integration"),
        resources_dir: PathBuf::from("/opt/wallet-shell/resources"),
        settings: ShellSettings::default(),
    };

    let mut app = ShellApp::new(config, RecordingHost::new(), event_tx, daemon_tx)
        .expect("shell app construction");
    app.start().expect("shell startup");
    Shell {
        app,
        daemon_rx,
        _event_rx: event_rx,
    }
}

fn loads(shell: &mut Shell) -> Vec<String> {
    shell.app.window_mut().host_mut().loads.clone()
}

/// Forward real daemon events into the shell until `done` observes the
/// expected window state (or the pump times out).
async fn pump_until(shell: &mut Shell, done: impl Fn(&[String]) -> bool) -> bool {
    for _ in 0..100 {
        if done(&shell.app.window_mut().host_mut().loads) {
            return true;
        }
        if let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(100), shell.daemon_rx.recv()).await
        {
            let _ = shell.app.handle_event(ShellEvent::Daemon(event));
        }
    }
    done(&shell.app.window_mut().host_mut().loads)
}

#[tokio::test]
async fn production_startup_navigates_to_discovered_origin() {
    let mut shell = start_shell(false, &ready_daemon_script("127.0.0.1:45111"));

    // Splash first
    assert_eq!(loads(&mut shell), vec![SPLASH_URL.to_string()]);
    shell
        .app
        .handle_event(ShellEvent::Window(WindowEvent::FinishedLoad))
        .unwrap();

    // The real marker line flows from the child process to the window
    let navigated = pump_until(&mut shell, |loads| {
        loads.last().map(String::as_str) == Some("http://127.0.0.1:45111/")
    })
    .await;
    assert!(navigated, "window never navigated to the discovered origin");

    let all = loads(&mut shell);
    assert_eq!(
        all.iter()
            .filter(|u| u.as_str() == "http://127.0.0.1:45111/")
            .count(),
        1,
        "discovered origin must be navigated to exactly once"
    );
}

#[tokio::test]
async fn daemon_crash_before_marker_surfaces_error_view() {
    let mut shell = start_shell(false, &silent_crash_script(7));
    shell
        .app
        .handle_event(ShellEvent::Window(WindowEvent::FinishedLoad))
        .unwrap();

    let errored = pump_until(&mut shell, |loads| {
        loads.last().map(String::as_str) == Some(ERROR_URL)
    })
    .await;
    assert!(errored, "crash before the marker must show the error view");

    // The crash never produced an origin navigation
    assert!(loads(&mut shell)
        .iter()
        .all(|u| !u.starts_with("http://127.0.0.1")));
}

#[tokio::test]
async fn dev_mode_navigates_immediately_without_a_daemon() {
    let mut shell = start_shell(true, "exit 1");

    // No splash, no process: the window goes straight to the dev server
    assert_eq!(
        loads(&mut shell),
        vec!["http://localhost:4200/".to_string()]
    );
}

#[tokio::test]
async fn restart_after_crash_discovers_a_fresh_origin() {
    // First lifetime: the daemon dies before serving
    let mut shell = start_shell(false, &silent_crash_script(2));
    shell
        .app
        .handle_event(ShellEvent::Window(WindowEvent::FinishedLoad))
        .unwrap();
    let errored = pump_until(&mut shell, |loads| {
        loads.last().map(String::as_str) == Some(ERROR_URL)
    })
    .await;
    assert!(errored);
    drop(shell);

    // Restarted shell: a fresh daemon handle and a fresh origin
    let mut shell = start_shell(false, &ready_daemon_script("127.0.0.1:45333"));
    shell
        .app
        .handle_event(ShellEvent::Window(WindowEvent::FinishedLoad))
        .unwrap();
    let navigated = pump_until(&mut shell, |loads| {
        loads.last().map(String::as_str) == Some("http://127.0.0.1:45333/")
    })
    .await;
    assert!(navigated, "restart must navigate to the freshly discovered origin");
}
