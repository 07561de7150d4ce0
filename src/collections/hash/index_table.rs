use std::cmp;
use std::fmt::{self, Debug, Formatter};
use std::mem;

use crate::util::error::CapacityOverflow;
use crate::util::fmt::{DebugRaw, Slot as DisplaySlot};
use crate::util::option::OptionExtension;
use crate::util::result::ResultExtension;

const MIN_ALLOCATED_CAP: usize = 2;

const GROWTH_FACTOR: usize = 2;

const LOAD_FACTOR_NUMERATOR: usize = 4;
const LOAD_FACTOR_DENOMINATOR: usize = 5;

/// An open-addressing hash table of positions into some external, ordered storage.
///
/// The table never holds keys itself. Each occupied slot holds an index into the owner's entries,
/// and every operation that needs a key or a hash asks the owner through a closure. This keeps the
/// table ignorant of the key type and makes it cheap to shift positions around when entries move.
///
/// Collisions are resolved with linear probing and removals use backward-shift deletion, so there
/// are no tombstones: a slot is either empty or holds a live position.
///
/// The load factor is fixed at 4/5, which also guarantees that any table with a non-zero capacity
/// has at least one empty slot, so probing always terminates.
#[derive(Clone)]
pub(crate) struct IndexTable {
    pub(crate) slots: Box<[Slot]>,
    pub(crate) len: usize,
}

pub(crate) type Slot = Option<usize>;

/// The outcome of probing the table for a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// A slot holding a matching position was found.
    Found { slot: usize, index: usize },
    /// Probing reached an empty slot, which is where the key would be placed.
    Vacant { slot: usize },
}

impl IndexTable {
    /// Creates a new IndexTable with capacity 0. Memory will be allocated on the first insertion.
    pub fn new() -> IndexTable {
        IndexTable {
            slots: Box::new([]),
            len: 0,
        }
    }

    /// Creates a new IndexTable which can hold `cap` positions without reallocating.
    pub fn try_with_cap(cap: usize) -> Result<IndexTable, CapacityOverflow> {
        let slot_count = Self::slots_for(cap)?;
        Ok(IndexTable {
            slots: Self::allocate(slot_count)?,
            len: 0,
        })
    }

    /// Returns the number of occupied slots.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the total number of slots, occupied or not.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of positions the table can hold before it needs to grow.
    pub fn cap(&self) -> usize {
        self.slots.len() * LOAD_FACTOR_NUMERATOR / LOAD_FACTOR_DENOMINATOR
    }

    /// Probes for a position matching `hash` for which `is_match` returns true. Returns None only
    /// if the table has no slots at all.
    pub fn probe(&self, hash: u64, mut is_match: impl FnMut(usize) -> bool) -> Option<Probe> {
        let mut slot = self.ideal_slot(hash)?;

        // This is where equality comes in: while there is a position in the current slot that
        // doesn't match, move on to the next slot (wrapping at the end) and check again. Can't
        // loop forever because the load factor keeps at least one slot empty.
        loop {
            match self.slots[slot] {
                Some(index) if is_match(index) => return Some(Probe::Found { slot, index }),
                Some(_) => slot = (slot + 1) % self.slot_count(),
                None => return Some(Probe::Vacant { slot }),
            }
        }
    }

    /// Returns the position matching `hash` and `is_match`, if there is one.
    pub fn find(&self, hash: u64, is_match: impl FnMut(usize) -> bool) -> Option<usize> {
        match self.probe(hash, is_match)? {
            Probe::Found { index, .. } => Some(index),
            Probe::Vacant { .. } => None,
        }
    }

    /// Returns the slot holding exactly `index`, which was stored with `hash`.
    pub fn slot_of(&self, hash: u64, index: usize) -> Option<usize> {
        match self.probe(hash, |i| i == index)? {
            Probe::Found { slot, .. } => Some(slot),
            Probe::Vacant { .. } => None,
        }
    }

    /// Stores `index` under `hash`, growing first if required. The caller is responsible for
    /// ensuring that no equal key is already present. `hashes` must return the hash of the entry at
    /// any position currently stored in the table.
    pub fn insert_unique(&mut self, hash: u64, index: usize, hashes: impl Fn(usize) -> u64) {
        if self.should_grow() {
            self.grow(hashes);
        }

        self.place(hash, index);
    }

    /// Empties `slot`, then shifts any following entries of the same cluster back so that every
    /// remaining position is still reachable from its ideal slot.
    pub fn erase(&mut self, slot: usize, hashes: impl Fn(usize) -> u64) {
        if self.slots[slot].take().is_none() {
            return;
        }
        self.len -= 1;

        let slot_count = self.slot_count();
        let mut gap = slot;
        let mut next = (gap + 1) % slot_count;

        // Walk the rest of the cluster. An entry may only move back into the gap if its ideal slot
        // doesn't lie cyclically within (gap, next], otherwise moving it would put it before the
        // start of its own probe sequence.
        while let Some(index) = self.slots[next] {
            let ideal = (hashes(index) % slot_count as u64) as usize;

            if !Self::cyclic_between(ideal, gap, next) {
                self.slots[gap] = self.slots[next].take();
                gap = next;
            }

            next = (next + 1) % slot_count;
        }
    }

    /// Overwrites the position stored in an occupied `slot`.
    pub fn replace(&mut self, slot: usize, index: usize) {
        debug_assert!(self.slots[slot].is_some());
        self.slots[slot] = Some(index);
    }

    /// Rewrites every stored position through `f`. Used to keep positions in step with entries
    /// that have been shifted, rotated or reversed.
    pub fn remap(&mut self, f: impl Fn(usize) -> usize) {
        for index in self.slots.iter_mut().flatten() {
            *index = f(*index);
        }
    }

    /// Discards every position and re-inserts positions `0..len`. Used after reorderings that
    /// would be more work to track slot by slot, like sorting.
    pub fn rebuild(&mut self, len: usize, hashes: impl Fn(usize) -> u64) {
        self.clear();
        if len > self.cap() {
            self.realloc_with_cap(Self::slots_for(len).throw(), &hashes);
        }

        for index in 0..len {
            self.place(hashes(index), index);
        }
    }

    /// Removes all positions, keeping the allocated slots.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.len = 0;
    }

    /// Ensures that len + `extra` positions will fit without exceeding the load factor.
    pub fn try_reserve(
        &mut self,
        extra: usize,
        hashes: impl Fn(usize) -> u64,
    ) -> Result<(), CapacityOverflow> {
        let needed = self.len.checked_add(extra).ok_or(CapacityOverflow)?;
        if needed <= self.cap() { return Ok(()); }

        let new_slot_count = Self::slots_for(needed)?;
        self.try_realloc_with_cap(new_slot_count, &hashes)
    }

    /// Shrinks the table as far as possible while still holding every position.
    pub fn shrink_to_fit(&mut self, hashes: impl Fn(usize) -> u64) {
        let new_slot_count = match self.len {
            0 => 0,
            len => Self::slots_for(len).throw(),
        };

        if new_slot_count < self.slot_count() {
            self.realloc_with_cap(new_slot_count, &hashes);
        }
    }
}

impl IndexTable {
    /// Determines whether the table's length has reached the load capacity, suggesting that it
    /// should grow before inserting new positions.
    pub(crate) fn should_grow(&self) -> bool {
        self.len >= self.cap()
    }

    /// Grows the table by the growth factor, ensuring that it can hold additional positions.
    pub(crate) fn grow(&mut self, hashes: impl Fn(usize) -> u64) {
        let new_slot_count = cmp::max(self.slot_count() * GROWTH_FACTOR, MIN_ALLOCATED_CAP);

        self.realloc_with_cap(new_slot_count, &hashes)
    }

    /// Reallocates the table to have `new_slot_count` slots, panicking if that isn't possible.
    pub(crate) fn realloc_with_cap(
        &mut self,
        new_slot_count: usize,
        hashes: &impl Fn(usize) -> u64,
    ) {
        self.try_realloc_with_cap(new_slot_count, hashes).throw()
    }

    /// Reallocates the table to have `new_slot_count` slots, if doing so wouldn't cause the table
    /// to overload. (There isn't a logical way for the table to shrink and drop positions, so this
    /// is ignored.)
    pub(crate) fn try_realloc_with_cap(
        &mut self,
        new_slot_count: usize,
        hashes: &impl Fn(usize) -> u64,
    ) -> Result<(), CapacityOverflow> {
        let usable = new_slot_count.saturating_mul(LOAD_FACTOR_NUMERATOR) / LOAD_FACTOR_DENOMINATOR;
        if usable < self.len {
            return Ok(());
        }

        log::trace!(
            "reallocating index table from {} to {} slots ({} positions)",
            self.slot_count(),
            new_slot_count,
            self.len,
        );

        // Replace the slots first so that we can consume the old ones.
        let old_slots = mem::replace(&mut self.slots, Self::allocate(new_slot_count)?);
        self.len = 0;

        for index in old_slots.iter().flatten() {
            self.place(hashes(*index), *index);
        }

        Ok(())
    }

    /// Writes `index` into the first empty slot of the probe sequence for `hash`, assuming that the
    /// table has room for it.
    pub(crate) fn place(&mut self, hash: u64, index: usize) {
        // UNREACHABLE: Callers only place after ensuring capacity, so there is at least one slot.
        let mut slot = self.ideal_slot(hash).unreachable();

        while self.slots[slot].is_some() {
            slot = (slot + 1) % self.slot_count();
        }

        self.slots[slot] = Some(index);
        self.len += 1;
    }

    /// Calculates the ideal slot for `hash` (or None if the table has no slots). This method
    /// doesn't consider collisions, see [`IndexTable::probe`] for that functionality.
    pub(crate) fn ideal_slot(&self, hash: u64) -> Option<usize> {
        hash.checked_rem(self.slot_count() as u64).map(|i| i as usize)
    }

    /// Returns true if `slot` lies within the cyclic range (start, end].
    pub(crate) const fn cyclic_between(slot: usize, start: usize, end: usize) -> bool {
        if start <= end {
            start < slot && slot <= end
        } else {
            start < slot || slot <= end
        }
    }

    /// Calculates how many slots are needed to hold `positions` without exceeding the load factor.
    pub(crate) fn slots_for(positions: usize) -> Result<usize, CapacityOverflow> {
        positions
            .checked_mul(LOAD_FACTOR_DENOMINATOR)
            .map(|n| n / LOAD_FACTOR_NUMERATOR + 1)
            .ok_or(CapacityOverflow)
    }

    /// Allocates `count` empty slots, reporting allocation failure rather than aborting.
    pub(crate) fn allocate(count: usize) -> Result<Box<[Slot]>, CapacityOverflow> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(count).map_err(|_| CapacityOverflow)?;
        slots.resize(count, None);
        Ok(slots.into_boxed_slice())
    }
}

impl Default for IndexTable {
    fn default() -> Self {
        IndexTable::new()
    }
}

impl Debug for IndexTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let slots = self.slots.iter().map(|s| DebugRaw(DisplaySlot(*s)));

        f.debug_struct("IndexTable")
            .field("slots", &DebugList(slots))
            .field("len", &self.len())
            .field("cap", &self.cap())
            .finish()
    }
}

struct DebugList<I>(I);

impl<I: Iterator<Item = DebugRaw<DisplaySlot>> + Clone> Debug for DebugList<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.clone()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(index: usize) -> u64 {
        index as u64
    }

    #[test]
    fn test_cyclic_between() {
        assert!(IndexTable::cyclic_between(3, 1, 4), "3 should lie within (1, 4].");
        assert!(IndexTable::cyclic_between(4, 1, 4), "The end of the range is inclusive.");
        assert!(!IndexTable::cyclic_between(1, 1, 4), "The start of the range is exclusive.");
        assert!(IndexTable::cyclic_between(0, 6, 1), "Ranges should wrap around the table.");
        assert!(IndexTable::cyclic_between(7, 6, 1), "Ranges should wrap around the table.");
        assert!(!IndexTable::cyclic_between(3, 6, 1), "3 is outside of the wrapped range (6, 1].");
    }

    #[test]
    fn test_grows_with_load_factor() {
        let mut table = IndexTable::new();
        assert_eq!(table.slot_count(), 0, "A new table shouldn't allocate.");
        assert_eq!(table.find(0, |_| true), None, "Finding in an empty table should fail.");

        for index in 0..20 {
            table.insert_unique(identity(index), index, identity);
            assert!(
                table.len() < table.slot_count(),
                "There should always be an empty slot after an insertion."
            );
        }

        for index in 0..20 {
            assert_eq!(
                table.find(identity(index), |i| i == index),
                Some(index),
                "Every inserted position should still be found after growing."
            );
        }
    }

    #[test]
    fn test_erase_wraps_around() {
        let mut table = IndexTable::try_with_cap(6).expect("small capacities are valid");
        assert_eq!(table.slot_count(), 8);

        // Positions 0, 1 and 3 all want the last slot, so the cluster wraps to the start.
        let hashes = |index: usize| [7_u64, 7, 1, 7][index];
        for index in 0..4 {
            table.insert_unique(hashes(index), index, hashes);
        }

        let slot = table.slot_of(7, 0).expect("position 0 was inserted");
        assert_eq!(slot, 7);
        table.erase(slot, hashes);

        assert_eq!(table.len(), 3);
        for index in 1..4 {
            assert_eq!(
                table.find(hashes(index), |i| i == index),
                Some(index),
                "Erasing should keep wrapped entries reachable from their ideal slot."
            );
        }
        assert_eq!(table.slots[7], Some(1), "The wrapped entry should move back across the end.");
        assert_eq!(table.slots[1], Some(2), "An entry in its ideal slot shouldn't move.");
    }

    #[test]
    fn test_remap_and_rebuild() {
        let mut table = IndexTable::new();
        for index in 0..5 {
            table.insert_unique(identity(index), index, identity);
        }

        table.remap(|i| 4 - i);
        assert_eq!(
            table.find(0, |i| i == 4),
            Some(4),
            "Remapping should rewrite positions in place."
        );

        table.rebuild(3, identity);
        assert_eq!(table.len(), 3, "Rebuilding should only keep the requested positions.");
        assert_eq!(table.find(4, |i| i == 4), None);
        assert_eq!(table.find(2, |i| i == 2), Some(2));
    }

    #[test]
    fn test_reserve_overflow() {
        let mut table = IndexTable::new();
        assert_eq!(
            table.try_reserve(usize::MAX, identity),
            Err(CapacityOverflow),
            "Reserving more slots than can be counted should fail."
        );
        assert_eq!(
            IndexTable::try_with_cap(usize::MAX).map(|t| t.slot_count()),
            Err(CapacityOverflow),
        );
    }
}
