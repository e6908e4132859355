//! Monotonic room ID allocation with wraparound.

use std::sync::atomic::{AtomicU64, Ordering};

/// The result of one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub id: u64,
    /// `true` if this allocation hit the ceiling and started a new epoch.
    /// Every ID handed out before it is now ambiguous.
    pub epoch_reset: bool,
}

/// Hands out room IDs: 1, 2, 3, … strictly increasing within an epoch.
///
/// When the next ID would reach `ceiling`, the counter resets and the
/// allocation yields 0, the first ID of a fresh epoch. Increment-and-read
/// is a single atomic read-modify-write, so concurrent callers never see
/// the same ID within an epoch.
#[derive(Debug)]
pub struct RoomIdAllocator {
    counter: AtomicU64,
    ceiling: u64,
}

impl RoomIdAllocator {
    /// Creates an allocator whose first ID will be 1.
    ///
    /// A ceiling below 2 would reset on every call; it is raised to 2.
    pub fn new(ceiling: u64) -> Self {
        Self {
            counter: AtomicU64::new(0),
            ceiling: ceiling.max(2),
        }
    }

    /// Allocates the next ID.
    pub fn next(&self) -> Allocation {
        let ceiling = self.ceiling;
        let step = |n: u64| {
            let next = n + 1;
            if next >= ceiling { 0 } else { next }
        };
        // The closure always returns `Some`, so both arms carry the
        // previous value.
        let prev = match self.counter.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |n| Some(step(n)),
        ) {
            Ok(prev) | Err(prev) => prev,
        };
        let id = step(prev);
        Allocation {
            id,
            epoch_reset: prev + 1 >= ceiling,
        }
    }

    /// Resets the counter so the next allocation yields 1.
    pub fn reset(&self) {
        self.counter.store(0, Ordering::Release);
    }

    /// The most recently allocated ID (0 before the first allocation).
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_next_starts_at_one_and_increases() {
        let ids = RoomIdAllocator::new(100);
        let got: Vec<u64> = (0..5).map(|_| ids.next().id).collect();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_next_at_ceiling_wraps_to_zero_and_flags_reset() {
        let ids = RoomIdAllocator::new(3);
        assert_eq!(ids.next(), Allocation { id: 1, epoch_reset: false });
        assert_eq!(ids.next(), Allocation { id: 2, epoch_reset: false });
        assert_eq!(ids.next(), Allocation { id: 0, epoch_reset: true });
        assert_eq!(ids.next(), Allocation { id: 1, epoch_reset: false });
    }

    #[test]
    fn test_reset_restarts_at_one() {
        let ids = RoomIdAllocator::new(100);
        ids.next();
        ids.next();
        ids.reset();
        assert_eq!(ids.current(), 0);
        assert_eq!(ids.next().id, 1);
    }

    #[test]
    fn test_next_concurrent_callers_get_unique_ids() {
        let ids = Arc::new(RoomIdAllocator::new(1_000_000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || {
                    (0..500).map(|_| ids.next().id).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().expect("thread") {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
