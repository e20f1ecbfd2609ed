//! Rolling snapshot history
//!
//! Bounded, append-only log of the most recent snapshots, in strict
//! arrival order. Feeds derived-series extraction for trends and
//! sparklines.
//!
//! # Critical Invariants
//!
//! 1. Length never exceeds [`HistoryBuffer::CAPACITY`]
//! 2. Entries are never reordered; order is chronological by arrival
//! 3. Entries are immutable once appended (no mutable access is exposed)

use crate::models::snapshot::Snapshot;
use std::collections::VecDeque;

/// Bounded FIFO log of recent snapshots.
///
/// # Example
///
/// ```rust
/// use ecosim_monitor_core::HistoryBuffer;
///
/// let history = HistoryBuffer::new();
/// assert!(history.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    entries: VecDeque<Snapshot>,
}

impl HistoryBuffer {
    /// Maximum number of retained snapshots; the oldest entry is evicted
    /// once the buffer would grow past this.
    pub const CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(Self::CAPACITY + 1),
        }
    }

    /// Append a snapshot at the tail, evicting from the head while the
    /// buffer is over capacity.
    pub fn append(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > Self::CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Reset to empty; used on RESET.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recently appended snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    /// Chronological iteration over retained snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Extract a numeric series, one value per retained snapshot, in
    /// chronological order.
    ///
    /// The iterator is lazy, finite, and restartable (call again for a
    /// fresh pass). Non-finite selector outputs are substituted with 0 so
    /// that upstream protocol violations cannot poison derived
    /// computation.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let gdp: Vec<f64> = history.series(|s| s.real_gdp).collect();
    /// ```
    pub fn series<'a, F>(&'a self, selector: F) -> impl Iterator<Item = f64> + 'a
    where
        F: Fn(&Snapshot) -> f64 + 'a,
    {
        self.entries.iter().map(move |snapshot| {
            let value = selector(snapshot);
            if value.is_finite() {
                value
            } else {
                0.0
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::PolicyAction;

    fn snapshot(step: u64) -> Snapshot {
        Snapshot {
            step,
            gdp: 1000.0 + step as f64,
            real_gdp: 900.0 + step as f64,
            unemployment: 0.1,
            avg_price: 10.0,
            avg_wage: 5.0,
            inflation_rate: 0.0,
            tax_revenue: 80.0,
            govt_cash: 500.0,
            subsistence_failures: 0,
            gini: 0.4,
            action: PolicyAction::default(),
            firms: Vec::new(),
            households: Vec::new(),
        }
    }

    #[test]
    fn test_append_and_latest() {
        let mut history = HistoryBuffer::new();
        history.append(snapshot(1));
        history.append(snapshot(2));

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().step, 2);
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let mut history = HistoryBuffer::new();
        for step in 0..150 {
            history.append(snapshot(step));
        }

        assert_eq!(history.len(), HistoryBuffer::CAPACITY);
        let steps: Vec<u64> = history.iter().map(|s| s.step).collect();
        assert_eq!(steps.first(), Some(&50));
        assert_eq!(steps.last(), Some(&149));
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryBuffer::new();
        history.append(snapshot(1));
        history.clear();

        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_series_is_chronological_and_restartable() {
        let mut history = HistoryBuffer::new();
        for step in 1..=3 {
            history.append(snapshot(step));
        }

        let first: Vec<f64> = history.series(|s| s.gdp).collect();
        let second: Vec<f64> = history.series(|s| s.gdp).collect();

        assert_eq!(first, vec![1001.0, 1002.0, 1003.0]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_series_substitutes_zero_for_non_finite() {
        let mut history = HistoryBuffer::new();
        let mut poisoned = snapshot(1);
        poisoned.gini = f64::NAN;
        history.append(poisoned);
        history.append(snapshot(2));

        let series: Vec<f64> = history.series(|s| s.gini).collect();
        assert_eq!(series, vec![0.0, 0.4]);
    }
}
