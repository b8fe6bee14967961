//! ## tracestat-core::alloc::index_chain
//! **Fixed-capacity index allocator with time-ordered eviction**
//!
//! Every slot lives in one boxed slice of cells allocated at construction.
//! Two reserved cells act as list sentinels:
//!
//! ```text
//!  cell:   0            1            2        3             C + 1
//!        [alloc head] [free head] [slot 0] [slot 1] ... [slot C-1]
//! ```
//!
//! The allocated list runs from the least recently activated slot
//! (`cells[ALLOC_HEAD].next`) to the most recently activated one
//! (`cells[ALLOC_HEAD].prev`), which makes "find the stalest slot" a single
//! read. The free list is used as a stack: released slots are pushed on its
//! head and the next allocation pops them from there.
//!
//! A list is empty iff its sentinel links to itself. Occupancy is tracked by
//! an explicit per-slot tag; it is never derived from the link fields, since a
//! lone allocated slot and a free slot can have identical link patterns.

use crate::error::ChainError;
use crate::time::TimeNs;

const ALLOC_HEAD: usize = 0;
const FREE_HEAD: usize = 1;
const RESERVED: usize = 2;

/// Occupancy of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,
    Allocated,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    prev: usize,
    next: usize,
    state: SlotState,
}

/// Fixed-capacity allocator of slot indices in `[0, capacity)`.
///
/// All operations are O(1). Time is supplied by the caller on every call, so
/// the chain has no clock of its own.
#[derive(Debug, Clone)]
pub struct IndexChain {
    cells: Box<[Cell]>,
    timestamps: Box<[TimeNs]>,
    allocated: usize,
}

impl IndexChain {
    /// Creates a chain with `capacity` slots, all of them free.
    pub fn with_capacity(capacity: usize) -> Result<Self, ChainError> {
        if capacity == 0 {
            return Err(ChainError::InvalidCapacity);
        }
        let total = capacity
            .checked_add(RESERVED)
            .ok_or(ChainError::InvalidCapacity)?;

        let first = RESERVED;
        let last = total - 1;

        let mut cells = Vec::with_capacity(total);
        cells.push(Cell {
            prev: ALLOC_HEAD,
            next: ALLOC_HEAD,
            state: SlotState::Allocated,
        });
        cells.push(Cell {
            prev: last,
            next: first,
            state: SlotState::Free,
        });
        for pos in first..total {
            cells.push(Cell {
                prev: if pos == first { FREE_HEAD } else { pos - 1 },
                next: if pos == last { FREE_HEAD } else { pos + 1 },
                state: SlotState::Free,
            });
        }

        Ok(Self {
            cells: cells.into_boxed_slice(),
            timestamps: vec![0; capacity].into_boxed_slice(),
            allocated: 0,
        })
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.timestamps.len()
    }

    /// Number of currently allocated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.allocated
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.allocated == self.capacity()
    }

    /// Takes the slot at the head of the free list, appends it to the fresh
    /// end of the allocated list and stamps it with `now`.
    pub fn allocate(&mut self, now: TimeNs) -> Result<usize, ChainError> {
        let pos = self.cells[FREE_HEAD].next;
        if pos == FREE_HEAD {
            return Err(ChainError::CapacityExhausted {
                capacity: self.capacity(),
            });
        }

        self.unlink(pos);
        self.link_before(ALLOC_HEAD, pos);
        self.cells[pos].state = SlotState::Allocated;
        self.allocated += 1;

        let index = pos - RESERVED;
        self.timestamps[index] = now;
        Ok(index)
    }

    /// Moves an allocated slot to the fresh end of the allocated list and
    /// restamps it with `now`.
    pub fn rejuvenate(&mut self, index: usize, now: TimeNs) -> Result<(), ChainError> {
        let pos = self.allocated_position(index)?;

        // A lone slot is already at the fresh end; relinking is a no-op.
        self.unlink(pos);
        self.link_before(ALLOC_HEAD, pos);
        self.timestamps[index] = now;
        Ok(())
    }

    /// Returns `true` if `index` is currently allocated. Out-of-range indices
    /// are never allocated.
    #[inline]
    pub fn is_allocated(&self, index: usize) -> bool {
        index < self.capacity() && self.cells[index + RESERVED].state == SlotState::Allocated
    }

    /// Returns an allocated slot to the head of the free list.
    pub fn release(&mut self, index: usize) -> Result<(), ChainError> {
        let pos = self.allocated_position(index)?;
        self.free_position(pos);
        Ok(())
    }

    /// The least recently activated slot, if any.
    #[inline]
    pub fn oldest(&self) -> Option<usize> {
        let head = self.cells[ALLOC_HEAD].next;
        (head != ALLOC_HEAD).then(|| head - RESERVED)
    }

    /// Releases the oldest slot if its timestamp is strictly older than
    /// `now - ttl`. Evicts at most one slot per call and leaves the chain
    /// untouched when nothing is stale.
    pub fn expire_one(&mut self, now: TimeNs, ttl: TimeNs) -> Option<usize> {
        let index = self.oldest()?;
        if self.timestamps[index] < now.saturating_sub(ttl) {
            self.free_position(index + RESERVED);
            Some(index)
        } else {
            None
        }
    }

    /// Timestamp of the current allocation of `index`.
    pub fn timestamp(&self, index: usize) -> Option<TimeNs> {
        self.is_allocated(index).then(|| self.timestamps[index])
    }

    /// Iterates over allocated slots, oldest first.
    pub fn iter_allocated(&self) -> AllocatedIter<'_> {
        AllocatedIter {
            chain: self,
            pos: self.cells[ALLOC_HEAD].next,
        }
    }

    fn allocated_position(&self, index: usize) -> Result<usize, ChainError> {
        if index >= self.capacity() {
            return Err(ChainError::IndexOutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        let pos = index + RESERVED;
        match self.cells[pos].state {
            SlotState::Allocated => Ok(pos),
            SlotState::Free => Err(ChainError::SlotNotAllocated(index)),
        }
    }

    #[inline]
    fn free_position(&mut self, pos: usize) {
        self.unlink(pos);
        self.link_after(FREE_HEAD, pos);
        self.cells[pos].state = SlotState::Free;
        self.allocated -= 1;
    }

    #[inline]
    fn unlink(&mut self, pos: usize) {
        let Cell { prev, next, .. } = self.cells[pos];
        self.cells[prev].next = next;
        self.cells[next].prev = prev;
    }

    /// Links `pos` right after `anchor` (head side of the anchor's list).
    #[inline]
    fn link_after(&mut self, anchor: usize, pos: usize) {
        let next = self.cells[anchor].next;
        self.cells[pos].prev = anchor;
        self.cells[pos].next = next;
        self.cells[next].prev = pos;
        self.cells[anchor].next = pos;
    }

    /// Links `pos` right before `anchor` (tail side of the anchor's list).
    #[inline]
    fn link_before(&mut self, anchor: usize, pos: usize) {
        let prev = self.cells[anchor].prev;
        self.cells[pos].prev = prev;
        self.cells[pos].next = anchor;
        self.cells[prev].next = pos;
        self.cells[anchor].prev = pos;
    }
}

/// Iterator over allocated slot indices, from oldest to freshest.
pub struct AllocatedIter<'a> {
    chain: &'a IndexChain,
    pos: usize,
}

impl Iterator for AllocatedIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.pos == ALLOC_HEAD {
            return None;
        }
        let index = self.pos - RESERVED;
        self.pos = self.chain.cells[self.pos].next;
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    const SECOND: TimeNs = 1_000_000_000;

    /// Walks both lists and checks that every slot sits in exactly one of
    /// them, with consistent back links and matching occupancy tags.
    fn assert_well_formed(chain: &IndexChain) {
        let capacity = chain.capacity();
        let mut seen = vec![false; capacity];

        for (head, state) in [
            (ALLOC_HEAD, SlotState::Allocated),
            (FREE_HEAD, SlotState::Free),
        ] {
            let mut prev = head;
            let mut pos = chain.cells[head].next;
            let mut count = 0;
            while pos != head {
                assert!(pos >= RESERVED, "sentinel {pos} linked into a list");
                assert_eq!(chain.cells[pos].prev, prev);
                assert_eq!(chain.cells[pos].state, state);
                assert!(!seen[pos - RESERVED], "slot {} linked twice", pos - RESERVED);
                seen[pos - RESERVED] = true;
                prev = pos;
                pos = chain.cells[pos].next;
                count += 1;
                assert!(count <= capacity);
            }
            assert_eq!(chain.cells[head].prev, prev);
            if state == SlotState::Allocated {
                assert_eq!(count, chain.len());
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn test_new_chain_is_empty() {
        let chain = IndexChain::with_capacity(4).unwrap();
        assert_eq!(chain.capacity(), 4);
        assert!(chain.is_empty());
        assert_eq!(chain.oldest(), None);
        assert!((0..4).all(|i| !chain.is_allocated(i)));
        assert_well_formed(&chain);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert_eq!(
            IndexChain::with_capacity(0).unwrap_err(),
            ChainError::InvalidCapacity
        );
    }

    #[test]
    fn test_allocate_until_exhausted() {
        let mut chain = IndexChain::with_capacity(3).unwrap();
        let mut indices: Vec<_> = (0..3).map(|t| chain.allocate(t).unwrap()).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(chain.is_full());

        assert_eq!(
            chain.allocate(3),
            Err(ChainError::CapacityExhausted { capacity: 3 })
        );
        assert_well_formed(&chain);
    }

    #[test]
    fn test_released_slot_is_reused() {
        let mut chain = IndexChain::with_capacity(2).unwrap();
        let a = chain.allocate(0).unwrap();
        let _b = chain.allocate(1).unwrap();
        chain.release(a).unwrap();
        assert!(!chain.is_allocated(a));
        assert_eq!(chain.allocate(2), Ok(a));
        assert_eq!(chain.timestamp(a), Some(2));
    }

    #[test]
    fn test_double_release_is_reported() {
        let mut chain = IndexChain::with_capacity(2).unwrap();
        let a = chain.allocate(0).unwrap();
        chain.release(a).unwrap();
        assert_eq!(chain.release(a), Err(ChainError::SlotNotAllocated(a)));
        assert_eq!(chain.len(), 0);
        assert_well_formed(&chain);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut chain = IndexChain::with_capacity(2).unwrap();
        assert!(!chain.is_allocated(7));
        assert_eq!(
            chain.release(7),
            Err(ChainError::IndexOutOfRange {
                index: 7,
                capacity: 2
            })
        );
        assert!(chain.rejuvenate(2, 0).is_err());
    }

    #[test]
    fn test_rejuvenate_moves_slot_to_fresh_end() {
        let mut chain = IndexChain::with_capacity(3).unwrap();
        let a = chain.allocate(0).unwrap();
        let b = chain.allocate(1).unwrap();
        let c = chain.allocate(2).unwrap();

        chain.rejuvenate(a, 3).unwrap();
        assert_eq!(chain.oldest(), Some(b));
        assert_eq!(chain.iter_allocated().collect::<Vec<_>>(), vec![b, c, a]);
        assert_eq!(chain.timestamp(a), Some(3));
        assert_well_formed(&chain);
    }

    #[test]
    fn test_rejuvenate_lone_slot() {
        let mut chain = IndexChain::with_capacity(3).unwrap();
        let a = chain.allocate(0).unwrap();
        assert_eq!(chain.rejuvenate(a, 10), Ok(()));
        assert_eq!(chain.oldest(), Some(a));
        assert_eq!(chain.timestamp(a), Some(10));
        assert_well_formed(&chain);
    }

    #[test]
    fn test_rejuvenate_free_slot_fails() {
        let mut chain = IndexChain::with_capacity(3).unwrap();
        let a = chain.allocate(0).unwrap();
        chain.release(a).unwrap();
        assert_eq!(chain.rejuvenate(a, 5), Err(ChainError::SlotNotAllocated(a)));
        assert_eq!(chain.rejuvenate(1, 5), Err(ChainError::SlotNotAllocated(1)));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_lone_allocated_slot_is_not_mistaken_for_free() {
        // With one allocated slot its links both point at the alloc head;
        // the occupancy tag must still report it correctly.
        let mut chain = IndexChain::with_capacity(1).unwrap();
        let a = chain.allocate(0).unwrap();
        assert!(chain.is_allocated(a));
        chain.release(a).unwrap();
        assert!(!chain.is_allocated(a));
        assert_eq!(chain.release(a), Err(ChainError::SlotNotAllocated(a)));
    }

    #[test]
    fn test_expire_one_respects_ttl() {
        let mut chain = IndexChain::with_capacity(2).unwrap();
        let a = chain.allocate(0).unwrap();

        // Stamp equal to `now - ttl` is not stale yet.
        assert_eq!(chain.expire_one(SECOND, SECOND), None);
        assert!(chain.is_allocated(a));
        assert_eq!(chain.timestamp(a), Some(0));

        assert_eq!(chain.expire_one(SECOND + 1, SECOND), Some(a));
        assert!(chain.is_empty());
        assert_eq!(chain.expire_one(10 * SECOND, SECOND), None);
    }

    #[test]
    fn test_expire_one_evicts_a_single_slot_per_call() {
        let mut chain = IndexChain::with_capacity(3).unwrap();
        for t in 0..3 {
            chain.allocate(t).unwrap();
        }
        let now = 10 * SECOND;
        let mut evicted = Vec::new();
        while let Some(index) = chain.expire_one(now, SECOND) {
            evicted.push(index);
            assert_eq!(chain.len(), 3 - evicted.len());
        }
        assert_eq!(evicted, vec![0, 1, 2]);
    }

    #[test]
    fn test_expire_then_reuse_scenario() {
        let mut chain = IndexChain::with_capacity(3).unwrap();
        let a = chain.allocate(0).unwrap();
        let b = chain.allocate(1).unwrap();
        let _c = chain.allocate(2).unwrap();
        assert_eq!(chain.oldest(), Some(a));

        assert_eq!(chain.expire_one(1_000_000_001, 1_000_000_000), Some(a));
        assert_eq!(chain.oldest(), Some(b));

        let d = chain.allocate(1_000_000_002).unwrap();
        assert_eq!(d, a);
        assert!(chain.is_allocated(d));
        assert_eq!(chain.timestamp(d), Some(1_000_000_002));
        assert_eq!(chain.iter_allocated().last(), Some(d));
        assert_well_formed(&chain);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Allocate,
        Release(usize),
        Rejuvenate(usize),
        ExpireOne(TimeNs),
    }

    fn op_strategy(capacity: usize) -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Allocate),
            1 => (0..capacity).prop_map(Op::Release),
            2 => (0..capacity).prop_map(Op::Rejuvenate),
            2 => (0 as TimeNs..40).prop_map(Op::ExpireOne),
        ]
    }

    proptest! {
        #[test]
        fn chain_matches_reference_model(
            capacity in 1usize..12,
            ops in prop::collection::vec(op_strategy(12), 1..300),
        ) {
            let mut chain = IndexChain::with_capacity(capacity).unwrap();
            // Free slots in pop order, allocated slots oldest first.
            let mut free: VecDeque<usize> = (0..capacity).collect();
            let mut active: VecDeque<(usize, TimeNs)> = VecDeque::new();

            for (step, op) in ops.into_iter().enumerate() {
                let now = step as TimeNs;
                match op {
                    Op::Allocate => match free.pop_front() {
                        Some(index) => {
                            prop_assert_eq!(chain.allocate(now), Ok(index));
                            active.push_back((index, now));
                        }
                        None => prop_assert_eq!(
                            chain.allocate(now),
                            Err(ChainError::CapacityExhausted { capacity })
                        ),
                    },
                    Op::Release(index) => {
                        match active.iter().position(|&(i, _)| i == index) {
                            Some(at) => {
                                active.remove(at);
                                free.push_front(index);
                                prop_assert_eq!(chain.release(index), Ok(()));
                            }
                            None => prop_assert!(chain.release(index).is_err()),
                        }
                    }
                    Op::Rejuvenate(index) => {
                        match active.iter().position(|&(i, _)| i == index) {
                            Some(at) => {
                                active.remove(at);
                                active.push_back((index, now));
                                prop_assert_eq!(chain.rejuvenate(index, now), Ok(()));
                            }
                            None => prop_assert!(chain.rejuvenate(index, now).is_err()),
                        }
                    }
                    Op::ExpireOne(ttl) => {
                        let expected = match active.front() {
                            Some(&(index, stamp)) if stamp < now - ttl => {
                                active.pop_front();
                                free.push_front(index);
                                Some(index)
                            }
                            _ => None,
                        };
                        prop_assert_eq!(chain.expire_one(now, ttl), expected);
                    }
                }

                prop_assert_eq!(chain.len(), active.len());
                prop_assert!(chain.len() <= capacity);
                prop_assert_eq!(chain.oldest(), active.front().map(|&(i, _)| i));
                let min_stamp = active.iter().map(|&(_, t)| t).min();
                prop_assert_eq!(chain.oldest().and_then(|i| chain.timestamp(i)), min_stamp);
                for index in 0..capacity {
                    let expected = active.iter().any(|&(i, _)| i == index);
                    prop_assert_eq!(chain.is_allocated(index), expected);
                }
                assert_well_formed(&chain);
            }
        }
    }
}
