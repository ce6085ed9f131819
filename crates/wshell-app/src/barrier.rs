//! Composite readiness barrier
//!
//! Joins the two independent startup signals (daemon-reported-ready and
//! splash-loaded) into a single transition that fires exactly once per
//! daemon lifetime, whatever the arrival order. Built as an explicit two-flag
//! object with idempotent setters; there is no polling timer, so there is
//! nothing to cancel when the window closes.

use wshell_core::ApiOrigin;

/// Two-flag fire-once barrier.
///
/// The setters return the discovered origin at the exact call that completes
/// the composite; every other call returns `None`.
#[derive(Debug, Default)]
pub struct ReadinessBarrier {
    origin: Option<ApiOrigin>,
    splash_loaded: bool,
    fired: bool,
}

impl ReadinessBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the daemon's API origin. Idempotent: the first origin of a
    /// lifetime wins, later calls cannot replace it.
    pub fn mark_daemon_ready(&mut self, origin: ApiOrigin) -> Option<ApiOrigin> {
        if self.origin.is_none() {
            self.origin = Some(origin);
        }
        self.try_fire()
    }

    /// Record that the splash page finished loading. Idempotent.
    pub fn mark_splash_loaded(&mut self) -> Option<ApiOrigin> {
        self.splash_loaded = true;
        self.try_fire()
    }

    fn try_fire(&mut self) -> Option<ApiOrigin> {
        if self.fired || !self.splash_loaded {
            return None;
        }
        let origin = self.origin.clone()?;
        self.fired = true;
        Some(origin)
    }

    /// Re-arm for the next daemon lifetime. The splash flag survives (the
    /// window does not reload the splash when the daemon is relaunched) but
    /// the origin and the fired latch do not.
    pub fn reset_daemon(&mut self) {
        self.origin = None;
        self.fired = false;
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn splash_loaded(&self) -> bool {
        self.splash_loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(port: u16) -> ApiOrigin {
        ApiOrigin::from_host_port(&format!("127.0.0.1:{}", port)).unwrap()
    }

    #[test]
    fn test_daemon_first_then_splash() {
        let mut barrier = ReadinessBarrier::new();
        assert!(barrier.mark_daemon_ready(origin(6420)).is_none());
        let fired = barrier.mark_splash_loaded().expect("composite must fire");
        assert_eq!(fired, origin(6420));
    }

    #[test]
    fn test_splash_first_then_daemon() {
        let mut barrier = ReadinessBarrier::new();
        assert!(barrier.mark_splash_loaded().is_none());
        let fired = barrier
            .mark_daemon_ready(origin(6420))
            .expect("composite must fire");
        assert_eq!(fired, origin(6420));
    }

    #[test]
    fn test_fires_exactly_once() {
        let mut barrier = ReadinessBarrier::new();
        barrier.mark_splash_loaded();
        assert!(barrier.mark_daemon_ready(origin(6420)).is_some());

        // Every further signal is inert
        assert!(barrier.mark_daemon_ready(origin(6420)).is_none());
        assert!(barrier.mark_splash_loaded().is_none());
        assert!(barrier.has_fired());
    }

    #[test]
    fn test_first_origin_wins() {
        let mut barrier = ReadinessBarrier::new();
        barrier.mark_daemon_ready(origin(6420));
        barrier.mark_daemon_ready(origin(9999));
        let fired = barrier.mark_splash_loaded().unwrap();
        assert_eq!(fired, origin(6420));
    }

    #[test]
    fn test_no_fire_without_daemon() {
        let mut barrier = ReadinessBarrier::new();
        assert!(barrier.mark_splash_loaded().is_none());
        assert!(barrier.mark_splash_loaded().is_none());
        assert!(!barrier.has_fired());
    }

    #[test]
    fn test_reset_rearms_for_next_lifetime_keeping_splash() {
        let mut barrier = ReadinessBarrier::new();
        barrier.mark_splash_loaded();
        assert!(barrier.mark_daemon_ready(origin(6420)).is_some());

        barrier.reset_daemon();
        assert!(!barrier.has_fired());
        assert!(barrier.splash_loaded());

        // The next lifetime fires again, with the fresh origin only
        let fired = barrier.mark_daemon_ready(origin(50001)).unwrap();
        assert_eq!(fired, origin(50001));
    }
}
