//! Process-wide turn numbering.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing turn numbers, starting at 1.
///
/// One sequence is shared by every turn the process serves, so numbers are
/// unique across concurrent requests.
#[derive(Debug)]
pub struct TurnSequence {
    next: AtomicU64,
}

impl TurnSequence {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Reserve the next turn number.
    pub fn next_turn(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for TurnSequence {
    fn default() -> Self {
        Self::new()
    }
}
