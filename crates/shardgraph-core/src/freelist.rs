//! # Free Index List
//!
//! Per-partition, per-kind allocator and recycler of local slot indices.
//!
//! ## Reuse Policy
//!
//! Freed ids are reused **most recently freed first** (LIFO). The policy is
//! invariant: freeing id `k` and allocating again returns `k` before the
//! high-water mark advances. Local id 0 is the null slot and is never
//! handed out; allocation starts at 1.
//!
//! ## Contract
//!
//! The caller must guarantee that a freed id has no remaining structural
//! reference. A double free is a contract violation, checked in debug
//! builds, not a recoverable condition.

use crate::types::{GraphError, LocalId, PartitionId, SlotKind};

// =============================================================================
// FREE INDEX LIST
// =============================================================================

/// Allocator state: the set of currently free local ids plus a high-water
/// mark. Allocated and free ids are always disjoint.
#[derive(Debug, Clone)]
pub struct FreeIndexList {
    /// Partition this list allocates for (error reporting only).
    partition: PartitionId,
    /// Id space this list allocates for (error reporting only).
    space: SlotKind,
    /// Freed ids, most recently freed last (popped first).
    free: Vec<LocalId>,
    /// Highest id ever allocated. Ids in `(high_water, max]` are untouched.
    high_water: u32,
    /// Hard capacity bound. Exhaustion is a fatal allocation error.
    max_capacity: u32,
}

impl FreeIndexList {
    /// Create an unbounded list (bounded only by the 32-bit local id space).
    #[must_use]
    pub fn new(partition: PartitionId, space: SlotKind) -> Self {
        Self::with_capacity(partition, space, u32::MAX)
    }

    /// Create a capacity-bounded list. At most `max_capacity` ids can be
    /// live at once; exhaustion fails the creating operation outright.
    #[must_use]
    pub fn with_capacity(partition: PartitionId, space: SlotKind, max_capacity: u32) -> Self {
        Self {
            partition,
            space,
            free: Vec::new(),
            high_water: 0,
            max_capacity,
        }
    }

    /// Allocate a local id: a previously freed id if one exists, else the
    /// next id past the high-water mark.
    pub fn allocate(&mut self) -> Result<LocalId, GraphError> {
        if let Some(id) = self.free.pop() {
            return Ok(id);
        }
        if self.high_water >= self.max_capacity {
            return Err(GraphError::CapacityExhausted {
                partition: self.partition,
                space: self.space,
            });
        }
        self.high_water = self.high_water.saturating_add(1);
        Ok(LocalId(self.high_water))
    }

    /// Return a local id to the free set.
    ///
    /// The caller guarantees no remaining structural reference; freeing an
    /// id twice, or an id never allocated, is a contract violation.
    pub fn free(&mut self, id: LocalId) {
        debug_assert!(id.value() != 0, "local id 0 is the null slot");
        debug_assert!(id.value() <= self.high_water, "freeing unallocated id");
        debug_assert!(!self.free.contains(&id), "double free of {id:?}");
        self.free.push(id);
    }

    /// Number of currently allocated ids.
    #[must_use]
    pub fn len(&self) -> usize {
        (self.high_water as usize).saturating_sub(self.free.len())
    }

    /// Whether no id is currently allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The hard capacity bound.
    #[must_use]
    pub const fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    /// Highest id ever allocated.
    #[must_use]
    pub const fn high_water(&self) -> u32 {
        self.high_water
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> FreeIndexList {
        FreeIndexList::new(PartitionId(1), SlotKind::Vertex)
    }

    #[test]
    fn allocation_starts_at_one() {
        let mut ids = list();
        assert_eq!(ids.allocate().expect("allocate"), LocalId(1));
        assert_eq!(ids.allocate().expect("allocate"), LocalId(2));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn freed_id_is_reused_before_high_water_advances() {
        let mut ids = list();
        let a = ids.allocate().expect("allocate");
        let b = ids.allocate().expect("allocate");
        ids.free(a);
        assert_eq!(ids.allocate().expect("allocate"), a);
        assert_eq!(ids.high_water(), b.value());
    }

    #[test]
    fn reuse_is_most_recently_freed_first() {
        let mut ids = list();
        let a = ids.allocate().expect("allocate");
        let b = ids.allocate().expect("allocate");
        let _c = ids.allocate().expect("allocate");
        ids.free(a);
        ids.free(b);
        assert_eq!(ids.allocate().expect("allocate"), b);
        assert_eq!(ids.allocate().expect("allocate"), a);
    }

    #[test]
    fn capacity_exhaustion_is_fatal_to_the_allocation() {
        let mut ids = FreeIndexList::with_capacity(PartitionId(1), SlotKind::Edge, 2);
        ids.allocate().expect("allocate");
        ids.allocate().expect("allocate");
        let err = ids.allocate();
        assert!(matches!(
            err,
            Err(GraphError::CapacityExhausted {
                partition: PartitionId(1),
                space: SlotKind::Edge,
            })
        ));
    }

    #[test]
    fn freeing_reopens_a_bounded_list() {
        let mut ids = FreeIndexList::with_capacity(PartitionId(1), SlotKind::Incidence, 1);
        let a = ids.allocate().expect("allocate");
        assert!(ids.allocate().is_err());
        ids.free(a);
        assert_eq!(ids.allocate().expect("allocate"), a);
    }

    #[test]
    fn len_tracks_allocated_minus_freed() {
        let mut ids = list();
        let a = ids.allocate().expect("allocate");
        ids.allocate().expect("allocate");
        ids.allocate().expect("allocate");
        ids.free(a);
        assert_eq!(ids.len(), 2);
        assert!(!ids.is_empty());
    }
}
