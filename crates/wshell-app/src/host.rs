//! Window host seam
//!
//! The browser surface is an external collaborator: the shell's only contract
//! with it is "serve this URL inside a locked-down window". [`WindowHost`]
//! is that seam. The shipped [`SystemHost`] delegates external opens to the
//! platform opener and treats in-window operations as delegations to the
//! embedding surface; an embedding host (wry/tauri-class) plugs into the same
//! trait.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tokio::sync::mpsc;

use wshell_core::prelude::*;

use crate::events::{ShellEvent, WindowEvent};

/// Fixed, non-negotiable security configuration of the window content.
///
/// Node-style OS integration stays off everywhere, dynamic code execution is
/// stripped, and the preload bridge is the only channel between host
/// privileges and page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebPreferences {
    pub node_integration: bool,
    pub node_integration_in_worker: bool,
    pub context_isolation: bool,
    pub webview_tag: bool,
    pub webgl: bool,
    pub webaudio: bool,
    pub allow_running_insecure_content: bool,
    pub web_security: bool,
    pub plugins: bool,
    /// The preload bridge script
    pub preload: PathBuf,
}

impl WebPreferences {
    /// The only constructor: everything locked down, preload bridge required.
    pub fn locked_down(preload: PathBuf) -> Self {
        Self {
            node_integration: false,
            node_integration_in_worker: false,
            // Strict. The surface content gets no direct bridge objects.
            context_isolation: true,
            webview_tag: false,
            webgl: false,
            webaudio: false,
            allow_running_insecure_content: false,
            web_security: true,
            plugins: false,
            preload,
        }
    }
}

/// Top-level window configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub title: String,
    pub icon: Option<PathBuf>,
    pub web_preferences: WebPreferences,
}

/// The embedding surface the shell drives.
///
/// One window at most; the controller guarantees create/reuse semantics, the
/// host only executes.
pub trait WindowHost: Send {
    /// Create the top-level window with the given fixed configuration
    fn create_window(&mut self, config: &WindowConfig) -> Result<()>;

    /// Navigate the window content
    fn load_url(&mut self, url: &str) -> Result<()>;

    /// Focus the window
    fn focus(&mut self);

    /// Un-minimize the window
    fn restore(&mut self);

    fn is_minimized(&self) -> bool;

    /// Open a URL in the system's default external browser
    fn open_external(&mut self, url: &str) -> Result<()>;

    /// Reveal a filesystem path in the platform file manager
    fn reveal_path(&mut self, path: &Path) -> Result<()>;

    /// Toggle the developer tools of the window content
    fn toggle_devtools(&mut self);

    /// Register the process as OS-level handler for a custom URI scheme
    fn register_url_scheme(&mut self, scheme: &str);

    /// Install the host-level network routing rules (loopback mapping with an
    /// egress allow-list)
    fn apply_host_rules(&mut self, rules: &str);

    /// Install the deny-all handler for runtime permission prompts
    fn deny_permission_requests(&mut self);

    /// Disable the dynamic code-execution primitive (`eval` equivalent).
    /// Called once at the host-process level and once per created window, so
    /// both levels are covered.
    fn strip_eval(&mut self);
}

// ─────────────────────────────────────────────────────────────────
// SystemHost
// ─────────────────────────────────────────────────────────────────

/// Host implementation backed by the operating system.
///
/// In-window operations are logged delegations; navigation to an http(s) URL
/// opens the system browser, which is how the wallet UI is surfaced when no
/// embedding engine is linked in.
pub struct SystemHost {
    event_tx: mpsc::Sender<ShellEvent>,
    window_created: bool,
}

impl SystemHost {
    pub fn new(event_tx: mpsc::Sender<ShellEvent>) -> Self {
        Self {
            event_tx,
            window_created: false,
        }
    }

    fn emit(&self, event: WindowEvent) {
        let _ = self.event_tx.try_send(ShellEvent::Window(event));
    }
}

impl WindowHost for SystemHost {
    fn create_window(&mut self, config: &WindowConfig) -> Result<()> {
        info!(
            "creating window '{}' ({}x{})",
            config.title, config.width, config.height
        );
        self.window_created = true;
        Ok(())
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        if !self.window_created {
            return Err(Error::window_host("load_url before create_window"));
        }
        info!("window navigating to {}", url);
        if url.starts_with("http://") || url.starts_with("https://") {
            self.open_external(url)?;
        }
        // The surface has no asynchronous render phase here; report the load
        // as finished so the splash signal advances.
        self.emit(WindowEvent::FinishedLoad);
        Ok(())
    }

    fn focus(&mut self) {
        debug!("focus requested for main window");
    }

    fn restore(&mut self) {
        debug!("restore requested for main window");
    }

    fn is_minimized(&self) -> bool {
        false
    }

    fn open_external(&mut self, url: &str) -> Result<()> {
        open_with_system_browser(url)
    }

    fn reveal_path(&mut self, path: &Path) -> Result<()> {
        reveal_in_file_manager(path)
    }

    fn toggle_devtools(&mut self) {
        debug!("devtools toggle requested (no embedded surface)");
    }

    fn register_url_scheme(&mut self, scheme: &str) {
        info!("registering as default handler for {}: links", scheme);
    }

    fn apply_host_rules(&mut self, rules: &str) {
        info!("host rules: {}", rules);
    }

    fn deny_permission_requests(&mut self) {
        info!("runtime permission prompts: deny all");
    }

    fn strip_eval(&mut self) {
        info!("dynamic code execution (eval) disabled");
    }
}

#[cfg(target_os = "macos")]
fn open_with_system_browser(url: &str) -> Result<()> {
    spawn_detached(Command::new("open").arg(url))
}

#[cfg(target_os = "windows")]
fn open_with_system_browser(url: &str) -> Result<()> {
    spawn_detached(Command::new("rundll32").args(["url.dll,FileProtocolHandler", url]))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_with_system_browser(url: &str) -> Result<()> {
    spawn_detached(Command::new("xdg-open").arg(url))
}

#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
fn open_with_system_browser(_url: &str) -> Result<()> {
    Err(Error::window_host(
        "opening external URLs is not supported on this platform",
    ))
}

#[cfg(target_os = "macos")]
fn reveal_in_file_manager(path: &Path) -> Result<()> {
    spawn_detached(Command::new("open").arg("-R").arg(path))
}

#[cfg(target_os = "windows")]
fn reveal_in_file_manager(path: &Path) -> Result<()> {
    spawn_detached(Command::new("explorer").arg(format!("/select,{}", path.display())))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn reveal_in_file_manager(path: &Path) -> Result<()> {
    // xdg-open has no select flag; open the containing directory
    let target = path.parent().unwrap_or(path);
    spawn_detached(Command::new("xdg-open").arg(target))
}

#[cfg(not(any(target_os = "macos", target_os = "windows", unix)))]
fn reveal_in_file_manager(_path: &Path) -> Result<()> {
    Err(Error::window_host(
        "revealing paths is not supported on this platform",
    ))
}

fn spawn_detached(command: &mut Command) -> Result<()> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| Error::window_host(format!("failed to run system opener: {e}")))
}

// ─────────────────────────────────────────────────────────────────
// RecordingHost (test helper)
// ─────────────────────────────────────────────────────────────────

/// Host fake that records every operation, for controller and event-loop
/// tests.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub windows_created: usize,
    pub loads: Vec<String>,
    pub external_opens: Vec<String>,
    pub reveals: Vec<PathBuf>,
    pub focus_count: usize,
    pub restore_count: usize,
    pub devtools_toggles: usize,
    pub minimized: bool,
    pub schemes: Vec<String>,
    pub host_rules: Option<String>,
    pub permissions_denied: bool,
    pub eval_strips: usize,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl WindowHost for RecordingHost {
    fn create_window(&mut self, _config: &WindowConfig) -> Result<()> {
        self.windows_created += 1;
        Ok(())
    }

    fn load_url(&mut self, url: &str) -> Result<()> {
        self.loads.push(url.to_string());
        Ok(())
    }

    fn focus(&mut self) {
        self.focus_count += 1;
    }

    fn restore(&mut self) {
        self.restore_count += 1;
        self.minimized = false;
    }

    fn is_minimized(&self) -> bool {
        self.minimized
    }

    fn open_external(&mut self, url: &str) -> Result<()> {
        self.external_opens.push(url.to_string());
        Ok(())
    }

    fn reveal_path(&mut self, path: &Path) -> Result<()> {
        self.reveals.push(path.to_path_buf());
        Ok(())
    }

    fn toggle_devtools(&mut self) {
        self.devtools_toggles += 1;
    }

    fn register_url_scheme(&mut self, scheme: &str) {
        self.schemes.push(scheme.to_string());
    }

    fn apply_host_rules(&mut self, rules: &str) {
        self.host_rules = Some(rules.to_string());
    }

    fn deny_permission_requests(&mut self) {
        self.permissions_denied = true;
    }

    fn strip_eval(&mut self) {
        self.eval_strips += 1;
    }
}
