//! Indexed binary min-heap
//!
//! Entries live in a slot arena and are addressed by [`HeapHandle`]s that stay
//! valid while the entry moves around the heap, so the priority of any queued
//! entry can be changed or the entry removed in logarithmic time. Popping only
//! detaches an entry from the heap; its slot and value survive until
//! [`IndexedHeap::release`], which lets the caller inspect the value and
//! decide whether to requeue it.

use std::cmp::Ordering;

/// Stable reference to an entry of an [`IndexedHeap`].
///
/// A handle is invalidated by [`IndexedHeap::release`]; its slot may then be
/// reused by a later push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapHandle(usize);

#[derive(Debug, Clone)]
struct Slot<T> {
    cost: f64,
    /// Index into `heap`, `None` while detached
    position: Option<usize>,
    value: T,
}

/// Min-heap keyed by `f64` cost with handle-based updates
#[derive(Debug, Clone)]
pub struct IndexedHeap<T> {
    slots: Vec<Option<Slot<T>>>,
    heap: Vec<usize>,
    free: Vec<usize>,
}

impl<T> Default for IndexedHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexedHeap<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            heap: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Insert `value` with `cost` and return its handle
    pub fn push(&mut self, value: T, cost: f64) -> HeapHandle {
        let slot = Slot {
            cost,
            position: None,
            value,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.attach(index);
        HeapHandle(index)
    }

    /// Handle of the cheapest queued entry
    pub fn peek(&self) -> Option<HeapHandle> {
        self.heap.first().map(|&index| HeapHandle(index))
    }

    /// Detach the cheapest entry and return its handle; the value stays accessible
    pub fn pop(&mut self) -> Option<HeapHandle> {
        let top = *self.heap.first()?;
        self.detach(0);
        Some(HeapHandle(top))
    }

    /// Queue a detached entry again with a new cost, or reprioritize a queued one
    pub fn reinsert(&mut self, handle: HeapHandle, cost: f64) {
        let Some(slot) = self.slot_mut(handle) else {
            return;
        };
        slot.cost = cost;
        match slot.position {
            Some(position) => self.restore(position),
            None => self.attach(handle.0),
        }
    }

    /// Change the cost of a queued entry. Returns the previous cost, or `None`
    /// if the handle is not queued.
    pub fn change_priority(&mut self, handle: HeapHandle, cost: f64) -> Option<f64> {
        let slot = self.slot_mut(handle)?;
        let position = slot.position?;
        let previous = slot.cost;
        if previous.total_cmp(&cost) != Ordering::Equal {
            slot.cost = cost;
            self.restore(position);
        }
        Some(previous)
    }

    /// Take an entry out of the heap without freeing its slot. No-op when detached.
    pub fn remove(&mut self, handle: HeapHandle) {
        if let Some(position) = self.position(handle) {
            self.detach(position);
        }
    }

    /// Free an entry, detaching it first if needed, and hand back its value
    pub fn release(&mut self, handle: HeapHandle) -> Option<T> {
        self.remove(handle);
        let slot = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle.0);
        Some(slot.value)
    }

    pub fn get(&self, handle: HeapHandle) -> Option<&T> {
        self.slot(handle).map(|slot| &slot.value)
    }

    pub fn cost(&self, handle: HeapHandle) -> Option<f64> {
        self.slot(handle).map(|slot| slot.cost)
    }

    /// Current heap position of a queued entry
    pub fn position(&self, handle: HeapHandle) -> Option<usize> {
        self.slot(handle)?.position
    }

    pub fn is_queued(&self, handle: HeapHandle) -> bool {
        self.position(handle).is_some()
    }

    /// Verify the heap order and that every slot's position points back at it
    pub fn check_invariant(&self) -> bool {
        let ordered = (1..self.heap.len()).all(|i| {
            let parent = (i - 1) / 2;
            self.cost_at(parent).total_cmp(&self.cost_at(i)) != Ordering::Greater
        });
        let linked = self.heap.iter().enumerate().all(|(i, &index)| {
            matches!(&self.slots[index], Some(slot) if slot.position == Some(i))
        });
        let queued = self
            .slots
            .iter()
            .flatten()
            .filter(|slot| slot.position.is_some())
            .count();
        ordered && linked && queued == self.heap.len()
    }

    fn slot(&self, handle: HeapHandle) -> Option<&Slot<T>> {
        self.slots.get(handle.0)?.as_ref()
    }

    fn slot_mut(&mut self, handle: HeapHandle) -> Option<&mut Slot<T>> {
        self.slots.get_mut(handle.0)?.as_mut()
    }

    fn cost_at(&self, position: usize) -> f64 {
        self.slots[self.heap[position]]
            .as_ref()
            .map_or(f64::INFINITY, |slot| slot.cost)
    }

    fn set_position(&mut self, position: usize) {
        let index = self.heap[position];
        if let Some(slot) = self.slots[index].as_mut() {
            slot.position = Some(position);
        }
    }

    fn attach(&mut self, index: usize) {
        self.heap.push(index);
        let position = self.heap.len() - 1;
        self.set_position(position);
        self.sift_up(position);
    }

    fn detach(&mut self, position: usize) {
        let index = self.heap.swap_remove(position);
        if let Some(slot) = self.slots[index].as_mut() {
            slot.position = None;
        }
        if position < self.heap.len() {
            self.set_position(position);
            self.restore(position);
        }
    }

    fn restore(&mut self, position: usize) {
        let position = self.sift_up(position);
        self.sift_down(position);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.set_position(a);
        self.set_position(b);
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.cost_at(a).total_cmp(&self.cost_at(b)) == Ordering::Less
    }

    fn sift_up(&mut self, mut position: usize) -> usize {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.less(position, parent) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
        position
    }

    fn sift_down(&mut self, mut position: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut smallest = position;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == position {
                break;
            }
            self.swap(position, smallest);
            position = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn drain<T: Clone>(heap: &mut IndexedHeap<T>) -> Vec<(f64, T)> {
        let mut out = Vec::new();
        while let Some(handle) = heap.pop() {
            let cost = heap.cost(handle).unwrap();
            out.push((cost, heap.release(handle).unwrap()));
        }
        out
    }

    #[test]
    fn test_empty() {
        let mut heap: IndexedHeap<u32> = IndexedHeap::new();
        assert!(heap.is_empty());
        assert!(heap.pop().is_none());
        assert!(heap.peek().is_none());
        assert!(heap.check_invariant());
    }

    #[test]
    fn test_pop_order() {
        let mut heap = IndexedHeap::new();
        for (value, cost) in [('c', 3.0), ('a', 1.0), ('e', 5.0), ('b', 2.0), ('d', 4.0)] {
            heap.push(value, cost);
        }
        let order: Vec<char> = drain(&mut heap).into_iter().map(|(_, v)| v).collect();
        assert_eq!(order, vec!['a', 'b', 'c', 'd', 'e']);
    }

    #[test]
    fn test_pop_keeps_value() {
        let mut heap = IndexedHeap::new();
        let a = heap.push("a", 1.0);
        heap.push("b", 2.0);

        assert_eq!(heap.pop(), Some(a));
        assert!(!heap.is_queued(a));
        assert_eq!(heap.get(a), Some(&"a"));
        assert_eq!(heap.len(), 1);

        heap.reinsert(a, 3.0);
        assert!(heap.is_queued(a));
        let order: Vec<&str> = drain(&mut heap).into_iter().map(|(_, v)| v).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_change_priority() {
        let mut heap = IndexedHeap::new();
        let handles: Vec<_> = (0..10).map(|i| heap.push(i, i as f64)).collect();

        assert_eq!(heap.change_priority(handles[7], -1.0), Some(7.0));
        assert_eq!(heap.peek(), Some(handles[7]));
        assert_eq!(heap.change_priority(handles[0], 100.0), Some(0.0));
        assert!(heap.check_invariant());

        let popped = heap.pop().unwrap();
        assert_eq!(heap.change_priority(popped, 5.0), None);

        let order: Vec<i32> = drain(&mut heap).into_iter().map(|(_, v)| v).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 8, 9, 0]);
    }

    #[test]
    fn test_remove_and_release() {
        let mut heap = IndexedHeap::new();
        let handles: Vec<_> = (0..6).map(|i| heap.push(i, (6 - i) as f64)).collect();

        heap.remove(handles[5]);
        heap.remove(handles[5]);
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.get(handles[5]), Some(&5));
        assert!(heap.check_invariant());

        assert_eq!(heap.release(handles[2]), Some(2));
        assert_eq!(heap.get(handles[2]), None);
        assert_eq!(heap.release(handles[2]), None);
        assert_eq!(heap.len(), 4);

        // Released slot is reused
        let reused = heap.push(42, 0.5);
        assert_eq!(reused, handles[2]);
        assert_eq!(heap.peek(), Some(reused));
        assert!(heap.check_invariant());
    }

    #[test]
    fn test_infinite_costs_sink() {
        let mut heap = IndexedHeap::new();
        heap.push("inf", f64::INFINITY);
        heap.push("one", 1.0);
        heap.push("neg", f64::NEG_INFINITY);
        let order: Vec<&str> = drain(&mut heap).into_iter().map(|(_, v)| v).collect();
        assert_eq!(order, vec!["neg", "one", "inf"]);
    }

    #[test]
    fn test_randomized_against_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut heap = IndexedHeap::new();
        let mut handles = Vec::new();
        for i in 0..500 {
            handles.push(heap.push(i, rng.gen_range(0.0..1000.0)));
        }
        for _ in 0..300 {
            let handle = handles[rng.gen_range(0..handles.len())];
            heap.change_priority(handle, rng.gen_range(-10.0..1010.0));
        }
        for handle in handles.iter().step_by(3) {
            heap.remove(*handle);
        }
        assert!(heap.check_invariant());

        let costs: Vec<f64> = drain(&mut heap).into_iter().map(|(c, _)| c).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(costs.len(), 500 - 167);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(f64),
        Pop,
        Change(usize, f64),
        Remove(usize),
        Release(usize),
        Reinsert(usize, f64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-100.0f64..100.0).prop_map(Op::Push),
            Just(Op::Pop),
            (any::<usize>(), -100.0f64..100.0).prop_map(|(i, c)| Op::Change(i, c)),
            any::<usize>().prop_map(Op::Remove),
            any::<usize>().prop_map(Op::Release),
            (any::<usize>(), -100.0f64..100.0).prop_map(|(i, c)| Op::Reinsert(i, c)),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariant_holds(ops in prop::collection::vec(op(), 1..200)) {
            let mut heap = IndexedHeap::new();
            let mut live: Vec<HeapHandle> = Vec::new();
            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Push(cost) => live.push(heap.push(n, cost)),
                    Op::Pop => {
                        if let Some(top) = heap.pop() {
                            let cost = heap.cost(top).unwrap();
                            prop_assert!(heap.peek().map_or(true, |h| heap.cost(h).unwrap() >= cost));
                        }
                    }
                    Op::Change(i, cost) if !live.is_empty() => {
                        heap.change_priority(live[i % live.len()], cost);
                    }
                    Op::Remove(i) if !live.is_empty() => heap.remove(live[i % live.len()]),
                    Op::Release(i) if !live.is_empty() => {
                        let handle = live.swap_remove(i % live.len());
                        prop_assert!(heap.release(handle).is_some());
                    }
                    Op::Reinsert(i, cost) if !live.is_empty() => {
                        let handle = live[i % live.len()];
                        heap.reinsert(handle, cost);
                        prop_assert!(heap.is_queued(handle));
                    }
                    _ => {}
                }
                prop_assert!(heap.check_invariant());
            }
        }
    }
}
