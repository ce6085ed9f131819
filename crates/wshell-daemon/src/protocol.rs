//! Readiness marker protocol
//!
//! The only inter-process contract between shell and daemon: once the
//! daemon's HTTP API is listening, it prints a line containing
//! [`READINESS_MARKER`] followed by the bound `host:port`. The scan is
//! isolated behind [`ReadinessProbe`] so a structured handshake (origin
//! written to a well-known file or pipe) could replace stdout scraping
//! without touching the supervisor's state machine.

use wshell_core::prelude::*;
use wshell_core::ApiOrigin;

/// Literal substring the daemon prints when its web interface is up
pub const READINESS_MARKER: &str = "Starting web interface on ";

/// Source of the daemon's API origin
pub trait ReadinessProbe: Send {
    /// Feed one stdout line. Returns the origin on the first detection and
    /// `None` for every line after it (the origin is immutable per daemon
    /// lifetime).
    fn feed_line(&mut self, line: &str) -> Option<ApiOrigin>;

    /// The origin discovered so far, if any
    fn discovered(&self) -> Option<&ApiOrigin>;

    /// Forget the discovered origin, re-arming the probe for a fresh daemon
    /// lifetime
    fn reset(&mut self);
}

/// Stdout-scraping probe for the fixed marker line
#[derive(Debug, Default)]
pub struct MarkerProbe {
    origin: Option<ApiOrigin>,
}

impl MarkerProbe {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadinessProbe for MarkerProbe {
    fn feed_line(&mut self, line: &str) -> Option<ApiOrigin> {
        if self.origin.is_some() {
            return None;
        }

        let idx = line.find(READINESS_MARKER)?;
        let trailing = &line[idx + READINESS_MARKER.len()..];
        match ApiOrigin::from_host_port(trailing) {
            Ok(origin) => {
                info!("daemon web interface detected at {}", origin);
                self.origin = Some(origin.clone());
                Some(origin)
            }
            Err(e) => {
                warn!("readiness marker with unusable origin ({}): {:?}", trailing.trim(), e);
                None
            }
        }
    }

    fn discovered(&self) -> Option<&ApiOrigin> {
        self.origin.as_ref()
    }

    fn reset(&mut self) {
        self.origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_line_yields_origin() {
        let mut probe = MarkerProbe::new();
        let origin = probe
            .feed_line("Starting web interface on 127.0.0.1:43210")
            .expect("marker line must yield an origin");
        assert_eq!(origin.to_string(), "http://127.0.0.1:43210");
        assert_eq!(probe.discovered(), Some(&origin));
    }

    #[test]
    fn test_marker_mid_line_is_matched() {
        let mut probe = MarkerProbe::new();
        let origin = probe
            .feed_line("[INFO] webrpc: Starting web interface on 127.0.0.1:6420")
            .unwrap();
        assert_eq!(origin.to_string(), "http://127.0.0.1:6420");
    }

    #[test]
    fn test_non_marker_lines_are_inert() {
        let mut probe = MarkerProbe::new();
        assert!(probe.feed_line("Loading blockchain database").is_none());
        assert!(probe.feed_line("peer exchange enabled").is_none());
        assert!(probe.feed_line("").is_none());
        assert!(probe.discovered().is_none());
    }

    #[test]
    fn test_only_first_match_is_honored() {
        let mut probe = MarkerProbe::new();
        let first = probe
            .feed_line("Starting web interface on 127.0.0.1:43210")
            .unwrap();
        assert!(probe
            .feed_line("Starting web interface on 127.0.0.1:9999")
            .is_none());
        assert_eq!(probe.discovered(), Some(&first));
    }

    #[test]
    fn test_malformed_trailing_text_does_not_latch() {
        let mut probe = MarkerProbe::new();
        assert!(probe.feed_line("Starting web interface on ").is_none());
        assert!(probe.feed_line("Starting web interface on not a host").is_none());
        // A later well-formed marker still wins
        assert!(probe
            .feed_line("Starting web interface on 127.0.0.1:6420")
            .is_some());
    }

    #[test]
    fn test_reset_rearms_probe() {
        let mut probe = MarkerProbe::new();
        probe
            .feed_line("Starting web interface on 127.0.0.1:43210")
            .unwrap();
        probe.reset();
        assert!(probe.discovered().is_none());
        let origin = probe
            .feed_line("Starting web interface on 127.0.0.1:50000")
            .unwrap();
        assert_eq!(origin.to_string(), "http://127.0.0.1:50000");
    }
}
