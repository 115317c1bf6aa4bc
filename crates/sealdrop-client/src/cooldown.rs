//! Upload cooldown gate.
//!
//! A pure state machine over caller-supplied clock readings: an accepted
//! attempt enters `Cooling` synchronously, and the gate re-opens once the
//! wall clock passes the deadline. UI polling is a side-effect-free read of
//! `remaining`, never the source of truth for the transition.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Refresh interval for countdown display. Display only — state transitions
/// compare wall clock against the deadline, not tick counts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Gate state: idle when `deadline` is absent or passed, cooling otherwise.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    duration: Duration,
    deadline: Option<SystemTime>,
}

/// Serializable gate state, for callers that outlive a single process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownSnapshot {
    /// Cooldown deadline as unix milliseconds; absent while idle
    pub deadline_unix_ms: Option<u64>,
}

impl CooldownGate {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    /// Rebuild a gate from a persisted snapshot.
    pub fn restore(duration: Duration, snapshot: &CooldownSnapshot) -> Self {
        Self {
            duration,
            deadline: snapshot
                .deadline_unix_ms
                .map(|ms| UNIX_EPOCH + Duration::from_millis(ms)),
        }
    }

    pub fn snapshot(&self) -> CooldownSnapshot {
        CooldownSnapshot {
            deadline_unix_ms: self
                .deadline
                .and_then(|d| d.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64),
        }
    }

    /// Accept or reject a new upload attempt at time `now`.
    ///
    /// Acceptance starts the cooldown immediately — before the caller
    /// reaches any await point — so two back-to-back triggers cannot both
    /// pass. Rejection reports the remaining wait.
    pub fn try_begin(&mut self, now: SystemTime) -> Result<(), Duration> {
        if let Some(remaining) = self.remaining(now) {
            return Err(remaining);
        }
        self.deadline = Some(now + self.duration);
        Ok(())
    }

    /// Remaining cooldown at `now`, or `None` when the gate is idle.
    pub fn remaining(&self, now: SystemTime) -> Option<Duration> {
        let deadline = self.deadline?;
        deadline.duration_since(now).ok().filter(|d| !d.is_zero())
    }

    pub fn is_idle(&self, now: SystemTime) -> bool {
        self.remaining(now).is_none()
    }

    /// Force the gate back to idle. Called when an accepted attempt fails so
    /// a corrected retry does not have to wait out the rest of the window.
    pub fn reset(&mut self) {
        self.deadline = None;
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_starts_idle() {
        let gate = CooldownGate::new(Duration::from_secs(60));
        assert!(gate.is_idle(base()));
        assert_eq!(gate.remaining(base()), None);
    }

    #[test]
    fn test_accepted_attempt_blocks_until_deadline() {
        let mut gate = CooldownGate::new(Duration::from_secs(60));
        gate.try_begin(base()).unwrap();

        // One second in: still cooling, 59 s left.
        let t1 = base() + Duration::from_secs(1);
        assert!(!gate.is_idle(t1));
        assert_eq!(gate.remaining(t1), Some(Duration::from_secs(59)));
        assert_eq!(gate.try_begin(t1), Err(Duration::from_secs(59)));

        // Just before the deadline: still rejected.
        let t2 = base() + Duration::from_millis(59_999);
        assert!(gate.try_begin(t2).is_err());

        // At the deadline: idle again, next attempt accepted.
        let t3 = base() + Duration::from_secs(60);
        assert!(gate.is_idle(t3));
        gate.try_begin(t3).unwrap();
    }

    #[test]
    fn test_reset_reopens_immediately() {
        let mut gate = CooldownGate::new(Duration::from_secs(60));
        gate.try_begin(base()).unwrap();

        gate.reset();
        let t1 = base() + Duration::from_secs(1);
        assert!(gate.is_idle(t1));
        gate.try_begin(t1).unwrap();
    }

    #[test]
    fn test_rejection_does_not_extend_deadline() {
        let mut gate = CooldownGate::new(Duration::from_secs(60));
        gate.try_begin(base()).unwrap();

        let t1 = base() + Duration::from_secs(30);
        assert!(gate.try_begin(t1).is_err());

        // Deadline is still base + 60, not t1 + 60.
        let t2 = base() + Duration::from_secs(60);
        assert!(gate.is_idle(t2));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut gate = CooldownGate::new(Duration::from_secs(60));
        gate.try_begin(base()).unwrap();

        let restored = CooldownGate::restore(Duration::from_secs(60), &gate.snapshot());
        let t1 = base() + Duration::from_secs(10);
        assert_eq!(restored.remaining(t1), Some(Duration::from_secs(50)));
    }

    #[test]
    fn test_idle_snapshot_is_empty() {
        let gate = CooldownGate::new(Duration::from_secs(60));
        assert!(gate.snapshot().deadline_unix_ms.is_none());

        let restored = CooldownGate::restore(Duration::from_secs(60), &CooldownSnapshot::default());
        assert!(restored.is_idle(base()));
    }
}
