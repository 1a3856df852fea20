//! Event counters for the simulation pipeline.

use core::fmt::Write;
use heapless::String;

/// Running totals maintained by [`World::step`](crate::World::step).
///
/// - `broad_checks`: candidate pairs produced by the broad phase and examined
/// - `narrow_checks`: SAT tests actually run
/// - `contacts_resolved`: contact points that received an impulse pass
/// - `body_updates`: per-body integrations
/// - `steps`: completed calls to `step`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorldStats {
    pub broad_checks: u64,
    pub narrow_checks: u64,
    pub contacts_resolved: u64,
    pub body_updates: u64,
    pub steps: u64,
}

impl WorldStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Renders the counters as one `label: value` line each, for overlay or
    /// console output.
    pub fn summary(&self) -> String<192> {
        let mut text = String::new();
        let _ = write!(text, "steps: {}\n", self.steps);
        let _ = write!(text, "body updates: {}\n", self.body_updates);
        let _ = write!(text, "broad checks: {}\n", self.broad_checks);
        let _ = write!(text, "narrow checks: {}\n", self.narrow_checks);
        let _ = write!(text, "contacts resolved: {}\n", self.contacts_resolved);
        text
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = WorldStats::new();
        assert_eq!(stats, WorldStats::default());
        assert_eq!(stats.steps, 0);
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut stats = WorldStats::new();
        stats.steps = 12;
        stats.narrow_checks = 7;
        stats.reset();
        assert_eq!(stats, WorldStats::default());
    }

    #[test]
    fn test_summary_contains_all_labels() {
        let mut stats = WorldStats::new();
        stats.steps = 3;
        stats.contacts_resolved = 5;
        let text = stats.summary();
        assert!(text.contains("steps: 3"));
        assert!(text.contains("contacts resolved: 5"));
        assert!(text.contains("broad checks"));
        assert!(text.contains("narrow checks"));
        assert!(text.contains("body updates"));
    }
}
