//! Randomized per-item delay assignment with collision avoidance.
//!
//! Two browser sessions starting at the same minute is what the delays
//! exist to avoid, so the allocator redraws when a value is already taken.
//! It is a soft heuristic: after the attempt cap, the colliding value is
//! accepted and counted, never escalated.

use std::collections::HashSet;
use std::sync::Mutex;

use rand::Rng;

use marcaje_core::WorkItem;

/// One issued assignment. Published read-only; only the allocator writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayAssignment {
    /// Masked identifier of the work item.
    pub work_item: String,
    pub delay_minutes: u32,
}

struct AllocState {
    assigned: HashSet<u32>,
    assignments: Vec<DelayAssignment>,
    collisions: u32,
}

/// Run-scoped delay allocator. Safe to call from any worker: the draw,
/// the collision check, and the insert happen under one lock, so two
/// workers can never race past the check with the same value.
pub struct DelayAllocator {
    min: u32,
    max: u32,
    attempt_cap: u32,
    state: Mutex<AllocState>,
}

impl DelayAllocator {
    pub fn new(min: u32, max: u32, attempt_cap: u32) -> Self {
        Self {
            min,
            max,
            attempt_cap,
            state: Mutex::new(AllocState {
                assigned: HashSet::new(),
                assignments: Vec::new(),
                collisions: 0,
            }),
        }
    }

    /// Assign `item` a delay in whole minutes, uniform over [min, max].
    pub fn allocate(&self, item: &WorkItem) -> u32 {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut rng = rand::thread_rng();

        let mut draw = rng.gen_range(self.min..=self.max);
        for _ in 0..self.attempt_cap {
            if !state.assigned.contains(&draw) {
                break;
            }
            draw = rng.gen_range(self.min..=self.max);
        }

        if state.assigned.contains(&draw) {
            state.collisions += 1;
            tracing::warn!(
                "⚠️ Delay collision for RUT {}: {} minute(s) already assigned (attempt cap {} exhausted)",
                item.rut,
                draw,
                self.attempt_cap
            );
        } else {
            state.assigned.insert(draw);
        }
        state.assignments.push(DelayAssignment {
            work_item: item.rut.masked(),
            delay_minutes: draw,
        });

        tracing::info!("⏰ RUT {} waits {} minute(s)", item.rut, draw);
        draw
    }

    /// Snapshot of every assignment issued so far.
    pub fn assignments(&self) -> Vec<DelayAssignment> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .assignments
            .clone()
    }

    /// Draws that remained colliding after the attempt cap.
    pub fn collisions(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marcaje_core::Rut;
    use std::sync::Arc;

    fn item(n: u32) -> WorkItem {
        WorkItem::new(Rut::parse(&format!("{:08}", 10_000_000 + n)).unwrap())
    }

    #[test]
    fn test_assignments_stay_in_range() {
        let alloc = DelayAllocator::new(1, 20, 10);
        for n in 0..20 {
            let delay = alloc.allocate(&item(n));
            assert!((1..=20).contains(&delay));
        }
    }

    #[test]
    fn test_full_range_is_pairwise_distinct_with_generous_cap() {
        // With a cap this large, exhausting it would take ~10^4 consecutive
        // colliding draws; the 20 assignments must all be distinct.
        let alloc = DelayAllocator::new(1, 20, 10_000);
        let mut seen = HashSet::new();
        for n in 0..20 {
            assert!(seen.insert(alloc.allocate(&item(n))));
        }
        assert_eq!(alloc.collisions(), 0);
    }

    #[test]
    fn test_exhausted_cap_accepts_and_counts_collisions() {
        // Degenerate single-value range forces every later draw to collide.
        let alloc = DelayAllocator::new(5, 5, 3);
        assert_eq!(alloc.allocate(&item(0)), 5);
        assert_eq!(alloc.allocate(&item(1)), 5);
        assert_eq!(alloc.allocate(&item(2)), 5);
        assert_eq!(alloc.collisions(), 2);
    }

    #[test]
    fn test_assignments_are_recorded_masked() {
        let alloc = DelayAllocator::new(1, 20, 100);
        alloc.allocate(&item(0));
        alloc.allocate(&item(1));

        let assignments = alloc.assignments();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].work_item, "1000****");
        assert!(assignments.iter().all(|a| a.work_item.ends_with("****")));
    }

    #[test]
    fn test_concurrent_allocation_is_race_free() {
        let alloc = Arc::new(DelayAllocator::new(1, 100, 10_000));
        let mut handles = Vec::new();
        for n in 0..10 {
            let alloc = alloc.clone();
            handles.push(std::thread::spawn(move || alloc.allocate(&item(n))));
        }
        let delays: HashSet<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(delays.len(), 10);
        assert_eq!(alloc.collisions(), 0);
    }
}
