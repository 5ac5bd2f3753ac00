//! Static partitioning of a URL batch across workers
//!
//! Work is divided once, before any worker starts, into contiguous index
//! ranges. There is no shared queue and no work stealing: each worker owns
//! its range for the whole run.

use std::ops::Range;

/// Contiguous, disjoint index ranges covering `[0, task_count)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    ranges: Vec<Range<usize>>,
}

impl PartitionPlan {
    /// Splits `task_count` tasks across `workers` workers
    ///
    /// The worker count is clamped to the task count when there are tasks.
    /// The first `task_count % workers` workers receive one extra task, so
    /// loads differ by at most one. Zero workers yields an empty plan.
    ///
    /// # Example
    ///
    /// ```
    /// use parallel_crawler::crawler::PartitionPlan;
    ///
    /// let plan = PartitionPlan::new(10, 3);
    /// assert_eq!(plan.ranges(), &[0..4, 4..7, 7..10]);
    /// ```
    pub fn new(task_count: usize, workers: usize) -> Self {
        if workers == 0 {
            return Self { ranges: Vec::new() };
        }

        let workers = if task_count > 0 {
            workers.min(task_count)
        } else {
            workers
        };

        let base = task_count / workers;
        let extra = task_count % workers;

        let mut ranges = Vec::with_capacity(workers);
        let mut start = 0;
        for worker in 0..workers {
            let len = base + usize::from(worker < extra);
            ranges.push(start..start + len);
            start += len;
        }

        Self { ranges }
    }

    /// The per-worker ranges, indexed by worker id
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Number of workers in the plan
    pub fn worker_count(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates `(worker_id, range)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.ranges.iter().cloned().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_complete(task_count: usize, workers: usize) {
        let plan = PartitionPlan::new(task_count, workers);
        let mut seen = vec![0u32; task_count];
        for (_, range) in plan.iter() {
            for i in range {
                seen[i] += 1;
            }
        }
        assert!(
            seen.iter().all(|&count| count == 1),
            "n={} w={} not covered exactly once",
            task_count,
            workers
        );

        let lens: Vec<usize> = plan.ranges().iter().map(|r| r.len()).collect();
        let max = lens.iter().copied().max().unwrap_or(0);
        let min = lens.iter().copied().min().unwrap_or(0);
        assert!(max - min <= 1, "n={} w={} unbalanced", task_count, workers);
    }

    #[test]
    fn test_partition_completeness_grid() {
        for task_count in 0..40 {
            for workers in 1..12 {
                assert_complete(task_count, workers);
            }
        }
    }

    #[test]
    fn test_remainder_goes_to_first_workers() {
        let plan = PartitionPlan::new(7, 3);
        assert_eq!(plan.ranges(), &[0..3, 3..5, 5..7]);
    }

    #[test]
    fn test_even_split() {
        let plan = PartitionPlan::new(8, 4);
        assert_eq!(plan.ranges(), &[0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_workers_clamped_to_tasks() {
        let plan = PartitionPlan::new(2, 8);
        assert_eq!(plan.worker_count(), 2);
        assert_eq!(plan.ranges(), &[0..1, 1..2]);
    }

    #[test]
    fn test_zero_workers_is_empty() {
        let plan = PartitionPlan::new(5, 0);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_no_tasks_keeps_worker_count() {
        let plan = PartitionPlan::new(0, 3);
        assert_eq!(plan.worker_count(), 3);
        assert!(plan.ranges().iter().all(|r| r.is_empty()));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(PartitionPlan::new(23, 5), PartitionPlan::new(23, 5));
    }
}
