//! Binary min-heap with decrease/increase-key support.
//!
//! Each entry is a `(key, priority)` pair. A side table maps every key to its slot in the backing
//! array so membership checks are O(1) and priority changes re-sift from the stored slot instead
//! of scanning. The root is always the entry with the *lowest* priority.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Clone, Debug)]
pub struct IndexedHeap<K, P> {
    entries: Vec<(K, P)>,
    slots: HashMap<K, usize>,
}

impl<K, P> Default for IndexedHeap<K, P> {
    fn default() -> Self {
        Self { entries: Vec::new(), slots: HashMap::new() }
    }
}

impl<K, P> IndexedHeap<K, P>
where
    K: Copy + Eq + Hash,
    P: Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity), slots: HashMap::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.slots
            .get(key)
            .is_some_and(|&slot| slot < self.entries.len() && self.entries[slot].0 == *key)
    }

    pub fn priority(&self, key: &K) -> Option<&P> {
        let &slot = self.slots.get(key)?;
        self.entries.get(slot).map(|(_, priority)| priority)
    }

    pub fn peek(&self) -> Option<(&K, &P)> {
        self.entries.first().map(|(key, priority)| (key, priority))
    }

    /// Inserts `key`, or re-prioritises it when it is already queued.
    pub fn push(&mut self, key: K, priority: P) {
        if self.contains(&key) {
            self.update(key, priority);
            return;
        }
        let slot = self.entries.len();
        self.entries.push((key, priority));
        self.slots.insert(key, slot);
        self.sift_up(slot);
    }

    /// Removes and returns the lowest-priority entry.
    pub fn pop(&mut self) -> Option<(K, P)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let (key, priority) = self.entries.pop()?;
        self.slots.remove(&key);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((key, priority))
    }

    /// Changes the priority of a queued key. Returns `false` if the key is not queued.
    pub fn update(&mut self, key: K, priority: P) -> bool {
        let Some(&slot) = self.slots.get(&key) else {
            return false;
        };
        let raised = priority > self.entries[slot].1;
        self.entries[slot].1 = priority;
        if raised {
            self.sift_down(slot);
        } else {
            self.sift_up(slot);
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.entries[slot].1 >= self.entries[parent].1 {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.entries[left].1 < self.entries[smallest].1 {
                smallest = left;
            }
            if right < len && self.entries[right].1 < self.entries[smallest].1 {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.slots.insert(self.entries[a].0, a);
        self.slots.insert(self.entries[b].0, b);
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let slots_match = self.slots.len() == self.entries.len()
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(slot, (key, _))| self.slots.get(key) == Some(&slot));
        let ordered = (1..self.entries.len())
            .all(|slot| self.entries[(slot - 1) / 2].1 <= self.entries[slot].1);
        slots_match && ordered
    }
}

#[cfg(test)]
mod tests {
    use std::iter;

    use proptest::collection;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pops_lowest_f_then_lowest_h() {
        let mut heap = IndexedHeap::new();
        heap.push('a', (30_u32, 10_u32));
        heap.push('b', (20, 15));
        heap.push('c', (20, 5));
        heap.push('d', (40, 0));

        let order: Vec<char> = iter::from_fn(|| heap.pop().map(|(key, _)| key)).collect();
        assert_eq!(order, vec!['c', 'b', 'a', 'd']);
    }

    #[test]
    fn update_moves_entry_both_ways() {
        let mut heap = IndexedHeap::new();
        for (key, priority) in [(1_u8, 50_u32), (2, 40), (3, 30), (4, 20)] {
            heap.push(key, priority);
        }
        assert!(heap.update(1, 5));
        assert_eq!(heap.peek(), Some((&1, &5)));
        assert!(heap.update(1, 100));
        assert_eq!(heap.peek(), Some((&4, &20)));
        assert!(heap.is_consistent());
        assert!(!heap.update(9, 1));
    }

    #[test]
    fn contains_tracks_membership_through_pops() {
        let mut heap = IndexedHeap::new();
        heap.push(10_i32, 3_i32);
        heap.push(11, 1);
        assert!(heap.contains(&10) && heap.contains(&11));
        assert_eq!(heap.pop(), Some((11, 1)));
        assert!(!heap.contains(&11));
        assert!(heap.contains(&10));
        assert_eq!(heap.priority(&10), Some(&3));
    }

    #[test]
    fn pushing_present_key_reprioritises_instead_of_duplicating() {
        let mut heap = IndexedHeap::new();
        heap.push("x", 9);
        heap.push("y", 4);
        heap.push("x", 1);
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.pop(), Some(("x", 1)));
    }

    proptest! {
        #[test]
        fn heap_drains_in_sorted_order_with_consistent_slots(
            priorities in collection::vec(0_u32..1_000, 0..200),
            updates in collection::vec((0_usize..200, 0_u32..1_000), 0..50),
        ) {
            let mut heap = IndexedHeap::new();
            let mut expected = priorities.clone();
            for (key, &priority) in priorities.iter().enumerate() {
                heap.push(key, priority);
            }
            for &(key, priority) in &updates {
                if key < expected.len() {
                    heap.update(key, priority);
                    expected[key] = priority;
                }
            }
            prop_assert!(heap.is_consistent());

            expected.sort_unstable();
            let mut drained = Vec::new();
            while let Some((_, priority)) = heap.pop() {
                drained.push(priority);
                prop_assert!(heap.is_consistent());
            }
            prop_assert_eq!(drained, expected);
        }
    }
}
