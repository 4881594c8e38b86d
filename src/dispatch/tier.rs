//! Priority tiers and their lock-free slot tables
//!
//! Producer threads scan these tables on every continuous input event to find
//! which tier (if any) owns a key, while the work queue claims and releases
//! slots during builds. Each slot is a single `AtomicU32` holding a packed
//! [`LogicalKey`], so both sides run without a lock.

use std::sync::atomic::{AtomicU32, Ordering};

use enum_map::{Enum, EnumMap};

use crate::input::LogicalKey;

/// Concurrent continuous bindings per tier
pub const TIER_CAPACITY: usize = 8;

const EMPTY: u32 = 0;

/// Continuous handler priority, scanned in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum PriorityTier {
    /// Transient drag handlers (draggable buttons, fake mouse)
    Draggable,
    /// Analog joysticks
    Default,
    /// Camera look, pinch and scroll-drag gestures
    Camera,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 3] = [
        PriorityTier::Draggable,
        PriorityTier::Default,
        PriorityTier::Camera,
    ];
}

/// Fixed-size table of key slots for one tier
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: [AtomicU32; TIER_CAPACITY],
}

impl SlotTable {
    /// Finds the slot bound to `key`
    pub fn find(&self, key: LogicalKey) -> Option<usize> {
        let bits = key.to_bits();
        self.slots
            .iter()
            .position(|slot| slot.load(Ordering::Acquire) == bits)
    }

    /// Binds `key` to a slot, reusing an existing binding of the same key
    ///
    /// Returns `None` when every slot is held by another key.
    pub fn claim(&self, key: LogicalKey) -> Option<usize> {
        if let Some(index) = self.find(key) {
            return Some(index);
        }

        let bits = key.to_bits();
        for (index, slot) in self.slots.iter().enumerate() {
            match slot.compare_exchange(EMPTY, bits, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Some(self.dedupe(index, bits)),
                Err(current) if current == bits => return Some(index),
                Err(_) => continue,
            }
        }
        None
    }

    /// Two racing claims of the same key may land in different slots; the
    /// lowest index wins and the other is handed back.
    fn dedupe(&self, claimed: usize, bits: u32) -> usize {
        let earlier = self.slots[..claimed]
            .iter()
            .position(|slot| slot.load(Ordering::Acquire) == bits);
        match earlier {
            Some(index) => {
                self.slots[claimed].store(EMPTY, Ordering::Release);
                index
            }
            None => claimed,
        }
    }

    /// Releases the slot bound to `key`, returning its index
    pub fn release(&self, key: LogicalKey) -> Option<usize> {
        let bits = key.to_bits();
        self.slots.iter().enumerate().find_map(|(index, slot)| {
            slot.compare_exchange(bits, EMPTY, Ordering::AcqRel, Ordering::Acquire)
                .ok()
                .map(|_| index)
        })
    }

    /// Key currently held by slot `index`
    pub fn key_at(&self, index: usize) -> Option<u32> {
        self.slots
            .get(index)
            .map(|slot| slot.load(Ordering::Acquire))
            .filter(|bits| *bits != EMPTY)
    }

    /// Empties every slot
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(EMPTY, Ordering::Release);
        }
    }

    /// Number of occupied slots
    pub fn occupancy(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.load(Ordering::Acquire) != EMPTY)
            .count()
    }
}

/// Slot tables for every tier
#[derive(Debug, Default)]
pub struct TierTables {
    tables: EnumMap<PriorityTier, SlotTable>,
}

impl TierTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, tier: PriorityTier, key: LogicalKey) -> Option<usize> {
        self.tables[tier].claim(key)
    }

    pub fn release(&self, tier: PriorityTier, key: LogicalKey) -> Option<usize> {
        self.tables[tier].release(key)
    }

    /// Highest-priority tier and slot bound to `key`
    pub fn lookup(&self, key: LogicalKey) -> Option<(PriorityTier, usize)> {
        PriorityTier::ALL
            .into_iter()
            .find_map(|tier| self.tables[tier].find(key).map(|index| (tier, index)))
    }

    /// Highest-priority tier bound to `key`
    pub fn priority(&self, key: LogicalKey) -> Option<PriorityTier> {
        self.lookup(key).map(|(tier, _)| tier)
    }

    /// Returns true if slot `index` of `tier` is bound to `key`
    pub fn holds(&self, tier: PriorityTier, index: usize, key: LogicalKey) -> bool {
        self.tables[tier].key_at(index) == Some(key.to_bits())
    }

    pub fn clear(&self) {
        for table in self.tables.values() {
            table.clear();
        }
    }

    pub fn occupancy(&self, tier: PriorityTier) -> usize {
        self.tables[tier].occupancy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ControllerElement, KeyCode, MouseKey};
    use std::sync::Arc;

    fn letter(index: usize) -> LogicalKey {
        LogicalKey::Key(KeyCode::ALL[index])
    }

    #[test]
    fn test_claim_is_idempotent() {
        let table = SlotTable::default();
        let first = table.claim(LogicalKey::POINTER);
        let second = table.claim(LogicalKey::POINTER);
        assert_eq!(first, Some(0));
        assert_eq!(second, Some(0));
        assert_eq!(table.occupancy(), 1);
    }

    #[test]
    fn test_claim_fails_when_full() {
        let table = SlotTable::default();
        for i in 0..TIER_CAPACITY {
            assert_eq!(table.claim(letter(i)), Some(i));
        }
        assert_eq!(table.claim(letter(TIER_CAPACITY)), None);
        // Existing bindings still resolve
        assert_eq!(table.claim(letter(3)), Some(3));
    }

    #[test]
    fn test_release_frees_slot_for_reuse() {
        let table = SlotTable::default();
        table.claim(letter(0));
        table.claim(letter(1));
        assert_eq!(table.release(letter(0)), Some(0));
        assert_eq!(table.release(letter(0)), None);
        assert_eq!(table.claim(letter(2)), Some(0));
    }

    #[test]
    fn test_lookup_scans_tiers_in_priority_order() {
        let tables = TierTables::new();
        let stick = LogicalKey::Controller(ControllerElement::LeftThumbstick);
        tables.claim(PriorityTier::Camera, LogicalKey::POINTER);
        tables.claim(PriorityTier::Default, stick);
        assert_eq!(tables.priority(LogicalKey::POINTER), Some(PriorityTier::Camera));

        tables.claim(PriorityTier::Draggable, LogicalKey::POINTER);
        assert_eq!(tables.lookup(LogicalKey::POINTER), Some((PriorityTier::Draggable, 0)));

        tables.release(PriorityTier::Draggable, LogicalKey::POINTER);
        assert_eq!(tables.priority(LogicalKey::POINTER), Some(PriorityTier::Camera));
        assert_eq!(tables.priority(LogicalKey::Mouse(MouseKey::Left)), None);
    }

    #[test]
    fn test_holds_checks_slot_key() {
        let tables = TierTables::new();
        let index = tables.claim(PriorityTier::Default, letter(0)).unwrap();
        assert!(tables.holds(PriorityTier::Default, index, letter(0)));
        assert!(!tables.holds(PriorityTier::Default, index, letter(1)));
        tables.clear();
        assert!(!tables.holds(PriorityTier::Default, index, letter(0)));
    }

    #[test]
    fn test_concurrent_claims_leave_one_slot_per_key() {
        for _ in 0..50 {
            let table = Arc::new(SlotTable::default());
            let handles: Vec<_> = (0..8)
                .map(|thread| {
                    let table = Arc::clone(&table);
                    std::thread::spawn(move || {
                        for i in 0..4 {
                            table.claim(letter((thread + i) % 4));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            for i in 0..4 {
                let bits = letter(i).to_bits();
                let count = (0..TIER_CAPACITY)
                    .filter(|index| table.key_at(*index) == Some(bits))
                    .count();
                assert_eq!(count, 1, "key {i} bound {count} times");
            }
        }
    }
}
