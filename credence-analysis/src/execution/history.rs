//! Bounded FIFO history of execution attempts.

use std::collections::VecDeque;

use super::types::{ExecutionRecord, ExecutionStats};

/// Default maximum retained records.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Keeps the most recent `capacity` records, evicting the oldest first.
#[derive(Debug, Clone)]
pub struct ExecutionHistory {
    capacity: usize,
    records: VecDeque<ExecutionRecord>,
}

impl ExecutionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
        }
    }

    pub fn push(&mut self, record: ExecutionRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.records.iter()
    }

    pub fn stats(&self) -> ExecutionStats {
        if self.records.is_empty() {
            return ExecutionStats::default();
        }
        let total = self.records.len();
        let n = total as f64;
        let executed_count = self.records.iter().filter(|r| r.executed).count();
        ExecutionStats {
            total_attempts: total,
            executed_count,
            executed_ratio: executed_count as f64 / n,
            avg_confidence: self.records.iter().map(|r| r.confidence).sum::<f64>() / n,
            avg_threshold: self.records.iter().map(|r| r.threshold).sum::<f64>() / n,
        }
    }
}

impl Default for ExecutionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(confidence: f64, executed: bool) -> ExecutionRecord {
        ExecutionRecord {
            confidence,
            threshold: 0.8,
            executed,
            context: None,
        }
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = ExecutionHistory::new(3);
        for i in 0..5 {
            history.push(record(i as f64 / 10.0, true));
        }
        assert_eq!(history.len(), 3);
        let confidences: Vec<f64> = history.iter().map(|r| r.confidence).collect();
        assert_eq!(confidences, vec![0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_stats() {
        let mut history = ExecutionHistory::default();
        history.push(record(0.9, true));
        history.push(record(0.5, false));
        let stats = history.stats();
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.executed_count, 1);
        assert!((stats.executed_ratio - 0.5).abs() < 1e-12);
        assert!((stats.avg_confidence - 0.7).abs() < 1e-12);
        assert!((stats.avg_threshold - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        assert_eq!(ExecutionHistory::default().stats(), ExecutionStats::default());
    }
}
