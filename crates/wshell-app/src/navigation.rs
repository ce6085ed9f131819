//! Window navigation and attachment policy
//!
//! Security denials, not operational failures: disallowed navigations and
//! sub-view attachments are silently prevented and rerouted, never surfaced
//! to the user.

use std::path::PathBuf;

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the window perform the navigation itself
    Allow,
    /// Cancel in-window, open in the system's default external browser
    OpenExternal,
}

/// Outcome of a sub-view attachment request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachDecision {
    Allow,
    Reject,
}

/// Preferences carried by a sub-view attachment request, before sanitizing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachPreferences {
    pub preload: Option<PathBuf>,
    pub preload_url: Option<String>,
    pub node_integration: bool,
}

/// Navigation policy of the single main window
#[derive(Debug, Clone, Copy)]
pub struct NavigationPolicy {
    /// Development mode permits in-window navigation (live-reload workflows)
    pub dev_mode: bool,
}

impl NavigationPolicy {
    pub fn new(dev_mode: bool) -> Self {
        Self { dev_mode }
    }

    /// In-page navigation: cancelled and rerouted externally, except in dev
    /// mode.
    pub fn on_will_navigate(&self, _url: &str) -> NavigationDecision {
        if self.dev_mode {
            NavigationDecision::Allow
        } else {
            NavigationDecision::OpenExternal
        }
    }

    /// New-window requests (target=_blank links): always rerouted externally.
    pub fn on_new_window(&self, _url: &str) -> NavigationDecision {
        NavigationDecision::OpenExternal
    }

    /// Sub-view attachment: strip preload wiring, force OS integration off,
    /// and reject sources outside the currently loaded origin.
    pub fn on_attach_subview(
        &self,
        preferences: &mut AttachPreferences,
        src: &str,
        current_url: Option<&str>,
    ) -> AttachDecision {
        preferences.preload = None;
        preferences.preload_url = None;
        preferences.node_integration = false;

        match current_url {
            Some(current) if src.starts_with(current) => AttachDecision::Allow,
            _ => AttachDecision::Reject,
        }
    }

    /// Runtime permission prompts (camera, geolocation, notifications, …):
    /// unconditionally denied.
    pub fn on_permission_request(&self, _permission: &str) -> bool {
        false
    }
}
