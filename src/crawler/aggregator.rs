//! Thread-safe, fixed-size result sink
//!
//! Slots are allocated up front, one per input URL. Workers only ever write
//! their own indices, but every write still goes through the single lock so
//! no reader can observe a half-written result.

use crate::crawler::result::CrawlResult;
use crate::CrawlerError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Collects per-URL results by index and counts completed tasks
#[derive(Debug)]
pub struct ResultAggregator {
    slots: Mutex<Vec<CrawlResult>>,
    completed: AtomicUsize,
    total: usize,
}

impl ResultAggregator {
    /// Pre-allocates one pending result per URL
    pub fn new(urls: &[String]) -> Self {
        let slots: Vec<CrawlResult> = urls.iter().map(CrawlResult::new).collect();
        Self {
            total: slots.len(),
            slots: Mutex::new(slots),
            completed: AtomicUsize::new(0),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Writes `result` into slot `index` and bumps the completion counter
    ///
    /// Returns the number of completed tasks after this write.
    pub fn store(&self, index: usize, result: CrawlResult) -> Result<usize, CrawlerError> {
        {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.get_mut(index).ok_or(CrawlerError::SlotOutOfRange {
                index,
                len: self.total,
            })?;
            *slot = result;
        }

        Ok(self.completed.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Number of tasks stored so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Consumes the aggregator, returning results in input order
    pub fn into_results(self) -> Vec<CrawlResult> {
        self.slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
