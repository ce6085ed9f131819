//! Single-window controller
//!
//! Owns the one top-level window handle: lifecycle (create/destroy/refocus),
//! the fixed security configuration, and the navigation policy. No other
//! component may create, destroy or reassign the window.

use std::path::{Path, PathBuf};

use url::Url;

use wshell_core::prelude::*;

use crate::host::{WindowConfig, WindowHost};
use crate::navigation::{AttachDecision, AttachPreferences, NavigationDecision, NavigationPolicy};

/// Bundled static assets the window falls back to
#[derive(Debug, Clone)]
pub struct ResourcePaths {
    splash: PathBuf,
    error_view: PathBuf,
    pub preload: PathBuf,
    pub icon512: PathBuf,
}

impl ResourcePaths {
    /// Resolve the asset layout under the packaged `resources/` directory
    pub fn resolve(resources_dir: &Path) -> Self {
        Self {
            splash: resources_dir.join("splash").join("index.html"),
            error_view: resources_dir.join("error-alert").join("index.html"),
            preload: resources_dir.join("preload.js"),
            icon512: resources_dir.join("icon512x512.png"),
        }
    }

    pub fn splash_url(&self) -> String {
        file_url(&self.splash)
    }

    pub fn error_url(&self) -> String {
        file_url(&self.error_view)
    }
}

fn file_url(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|_| format!("file://{}", path.display()))
}

/// Controller of the single top-level window.
///
/// The window reference is cleared on close and recreated on demand, so a
/// dead handle is never operated on.
pub struct WindowController<H: WindowHost> {
    host: H,
    config: WindowConfig,
    resources: ResourcePaths,
    policy: NavigationPolicy,
    window_live: bool,
    current_url: Option<String>,
    splash_signaled: bool,
}

impl<H: WindowHost> WindowController<H> {
    pub fn new(
        host: H,
        config: WindowConfig,
        resources: ResourcePaths,
        policy: NavigationPolicy,
    ) -> Self {
        Self {
            host,
            config,
            resources,
            policy,
            window_live: false,
            current_url: None,
            splash_signaled: false,
        }
    }

    /// Create the window if none exists; an existing window is reused.
    /// Without a URL the local splash asset is loaded.
    pub fn create_window(&mut self, url: Option<&str>) -> Result<()> {
        if self.window_live {
            return Ok(());
        }

        self.host.create_window(&self.config)?;
        self.host.deny_permission_requests();
        // Window-content level; the host-process level is stripped at startup
        self.host.strip_eval();
        self.window_live = true;

        let target = url
            .map(str::to_string)
            .unwrap_or_else(|| self.resources.splash_url());
        self.load(&target)
    }

    fn load(&mut self, url: &str) -> Result<()> {
        self.current_url = Some(url.to_string());
        self.host.load_url(url)
    }

    /// Point the window at `url`, recreating it first if it was closed.
    pub fn navigate(&mut self, url: &str) -> Result<()> {
        if self.window_live {
            self.load(url)
        } else {
            self.create_window(Some(url))
        }
    }

    /// Replace the window content with the static error asset. A closed
    /// window stays closed; the error view never forces a window open.
    pub fn show_error(&mut self) -> Result<()> {
        if !self.window_live {
            return Ok(());
        }
        info!("Showing the error view");
        let url = self.resources.error_url();
        self.load(&url)
    }

    /// Record a finished content load. Returns `true` exactly once, for the
    /// splash-loaded signal; later loads (the real app after the splash)
    /// never re-fire it.
    pub fn handle_finished_load(&mut self) -> bool {
        if self.splash_signaled {
            return false;
        }
        self.splash_signaled = true;
        true
    }

    /// The window was closed: clear the handle so the next activation or
    /// focus request recreates it.
    pub fn handle_closed(&mut self) {
        info!("main window closed");
        self.window_live = false;
    }

    /// Re-activation with no window open (dock click): recreate at the last
    /// known URL.
    pub fn handle_activated(&mut self) -> Result<()> {
        if self.window_live {
            return Ok(());
        }
        let url = self.current_url.clone();
        self.create_window(url.as_deref())
    }

    /// A second launch attempt was detected: restore and focus the existing
    /// window, or recreate it if none is open.
    pub fn focus_or_recreate(&mut self) -> Result<()> {
        if self.window_live {
            if self.host.is_minimized() {
                self.host.restore();
            }
            self.host.focus();
            Ok(())
        } else {
            let url = self.current_url.clone();
            self.create_window(url.as_deref())
        }
    }

    /// Apply the navigation policy to an in-page navigation attempt.
    pub fn handle_will_navigate(&mut self, url: &str) -> Result<NavigationDecision> {
        let decision = self.policy.on_will_navigate(url);
        if decision == NavigationDecision::OpenExternal {
            self.host.open_external(url)?;
        }
        Ok(decision)
    }

    /// Apply the navigation policy to a new-window request.
    pub fn handle_new_window(&mut self, url: &str) -> Result<NavigationDecision> {
        let decision = self.policy.on_new_window(url);
        if decision == NavigationDecision::OpenExternal {
            self.host.open_external(url)?;
        }
        Ok(decision)
    }

    /// Apply the attachment policy to a sub-view attach request.
    pub fn handle_attach_subview(
        &mut self,
        preferences: &mut AttachPreferences,
        src: &str,
    ) -> AttachDecision {
        let decision =
            self.policy
                .on_attach_subview(preferences, src, self.current_url.as_deref());
        if decision == AttachDecision::Reject {
            warn!("rejected sub-view attachment from {}", src);
        }
        decision
    }

    pub fn is_open(&self) -> bool {
        self.window_live
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
